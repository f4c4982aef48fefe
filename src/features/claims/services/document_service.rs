use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use zip::write::{FileOptions, ZipWriter};
use zip::{CompressionMethod, ZipArchive};

use crate::core::error::{AppError, Result};
use crate::features::claims::models::claim_date::claim_period;
use crate::features::claims::models::Submission;
use crate::features::claims::services::naming;

/// Replaced with the requester's name
pub const NAME_PLACEHOLDER: &str = "placeholder_name";

/// Replaced with the claim period, e.g. `April/2023`
pub const CLAIM_DATE_PLACEHOLDER: &str = "placeholder_claim_date";

const FALLBACK_TEMPLATE_NAME: &str = "reimbursement_form.docx";

/// Appended to the document name when the evidence already took it
const GENERATED_SUFFIX: &str = "generated";

/// Service that fills the reimbursement form template for a submission
pub struct DocumentService {
    template_path: PathBuf,
}

impl DocumentService {
    pub fn new(template_path: PathBuf) -> Self {
        Self { template_path }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// Fill the template and write the result into `directory`.
    ///
    /// The template file is only ever read; edits happen on an in-memory copy.
    /// An unparseable claim date renders as an empty string instead of failing.
    pub async fn generate(&self, directory: &Path, submission: &Submission) -> Result<PathBuf> {
        let template = tokio::fs::read(&self.template_path)
            .await
            .map_err(|e| AppError::Template(format!("Failed to open document template: {}", e)))?;

        let period = claim_period(&submission.claim_date).unwrap_or_else(|| {
            warn!(
                "Claim date '{}' could not be parsed, leaving the period blank",
                submission.claim_date
            );
            String::new()
        });

        // Claim date first so a name containing the other token is left alone
        let replacements = vec![
            (CLAIM_DATE_PLACEHOLDER, xml_escape(&period)),
            (NAME_PLACEHOLDER, xml_escape(&submission.name)),
        ];

        let rendered =
            tokio::task::spawn_blocking(move || render_docx(&template, &replacements))
                .await
                .map_err(|e| AppError::Internal(format!("Document rendering task failed: {}", e)))??;

        let base_name = self
            .template_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(FALLBACK_TEMPLATE_NAME);
        let mut file_name = naming::file_name(&submission.name, &submission.claim_date, base_name);
        // Evidence uploaded under the template's own name already holds this path
        let taken = tokio::fs::try_exists(directory.join(&file_name))
            .await
            .map_err(|e| {
                AppError::Filesystem(format!("Failed to inspect submission directory: {}", e))
            })?;
        if taken {
            file_name = naming::with_suffix(&file_name, GENERATED_SUFFIX);
        }
        let document_path = directory.join(file_name);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&document_path)
            .await
            .map_err(|e| {
                AppError::Filesystem(format!("Failed to create generated document: {}", e))
            })?;
        file.write_all(&rendered).await.map_err(|e| {
            AppError::Template(format!("Failed to write generated document: {}", e))
        })?;
        file.flush().await.map_err(|e| {
            AppError::Template(format!("Failed to write generated document: {}", e))
        })?;

        debug!("Generated document at {}", document_path.display());

        Ok(document_path)
    }
}

/// Parts of a .docx package that carry visible text
fn is_text_part(name: &str) -> bool {
    name == "word/document.xml"
        || ((name.starts_with("word/header") || name.starts_with("word/footer"))
            && name.ends_with(".xml"))
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn template_error(context: &str) -> impl Fn(zip::result::ZipError) -> AppError + '_ {
    move |e| AppError::Template(format!("{}: {}", context, e))
}

/// Copy the archive, substituting placeholders in every text part.
fn render_docx(template: &[u8], replacements: &[(&str, String)]) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(template))
        .map_err(template_error("Invalid document template"))?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(template_error("Failed to read template entry"))?;
        let name = entry.name().to_string();

        if entry.is_dir() {
            writer
                .add_directory(name, options)
                .map_err(template_error("Failed to copy template directory"))?;
            continue;
        }

        let mut content = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut content)
            .map_err(|e| AppError::Template(format!("Failed to read '{}': {}", name, e)))?;

        if is_text_part(&name) {
            let mut xml = String::from_utf8(content)
                .map_err(|e| AppError::Template(format!("'{}' is not UTF-8: {}", name, e)))?;
            for (placeholder, value) in replacements {
                xml = xml.replace(placeholder, value);
            }
            content = xml.into_bytes();
        }

        writer
            .start_file(name.as_str(), options)
            .map_err(template_error("Failed to write document entry"))?;
        writer
            .write_all(&content)
            .map_err(|e| AppError::Template(format!("Failed to write '{}': {}", name, e)))?;
    }

    let cursor = writer
        .finish()
        .map_err(template_error("Failed to finalize document"))?;

    Ok(cursor.into_inner())
}
