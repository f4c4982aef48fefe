use axum::{
    extract::{multipart::Field, Multipart, State},
    http::StatusCode,
    response::Html,
};
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::claims::dtos::{ClaimFormDto, DEFAULT_EVIDENCE_NAME, FILE_FIELD};
use crate::features::claims::models::EvidenceUpload;
use crate::features::claims::services::SubmissionService;
use crate::shared::pages::{render_form_page, PageRenderer};

/// Shared state of the claim routes
#[derive(Clone)]
pub struct ClaimsState {
    pub submissions: Arc<SubmissionService>,
    pub pages: Arc<PageRenderer>,
    /// Largest evidence file accepted, in bytes
    pub max_upload_size: usize,
}

/// Render the empty claim form
pub async fn show_form(State(state): State<ClaimsState>) -> Result<Html<String>> {
    Ok(Html(render_form_page(&state.pages, false)?))
}

/// Submit a claim
///
/// Accepts multipart/form-data with:
/// - `claim_date`, `email`, `subject`, `name`, `message`: text fields
/// - `file`: the evidence file (required)
pub async fn submit_claim(
    State(state): State<ClaimsState>,
    mut multipart: Multipart,
) -> Result<Html<String>> {
    let (form, evidence) = read_claim_form(&mut multipart, state.max_upload_size).await?;

    form.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let receipt = state
        .submissions
        .process(form.into_submission(evidence))
        .await
        .map_err(|failure| {
            debug!("Responding with failure from stage {}", failure.stage);
            failure.error
        })?;

    info!(
        "Claim accepted: delivery_id={}, directory={}",
        receipt.delivery.id,
        receipt.directory.display()
    );
    debug!(
        "Claim artifacts: document={}, evidence={}",
        receipt.document_path.display(),
        receipt.evidence_path.display()
    );

    Ok(Html(render_form_page(&state.pages, true)?))
}

/// Read every multipart field before any filesystem work happens.
async fn read_claim_form(
    multipart: &mut Multipart,
    max_upload_size: usize,
) -> Result<(ClaimFormDto, EvidenceUpload)> {
    let mut form = ClaimFormDto::default();
    let mut evidence: Option<EvidenceUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_upload_size))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == FILE_FIELD {
            // Browsers send a part with a blank filename when no file was chosen
            if field.file_name().is_some_and(str::is_empty) {
                debug!("Skipping empty file field");
                continue;
            }
            evidence = Some(read_evidence(field, max_upload_size).await?);
            continue;
        }

        let text = field.text().await.map_err(|e| {
            AppError::Upload(format!("Failed to read field '{}': {}", field_name, e))
        })?;
        if !form.set_field(&field_name, text) {
            debug!("Ignoring unknown field: {}", field_name);
        }
    }

    let evidence = evidence.ok_or_else(|| {
        AppError::Upload(format!("The '{}' field with the evidence file is required", FILE_FIELD))
    })?;

    Ok((form, evidence))
}

async fn read_evidence(mut field: Field<'_>, max_upload_size: usize) -> Result<EvidenceUpload> {
    let file_name = field
        .file_name()
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_EVIDENCE_NAME)
        .to_string();
    let content_type = field
        .content_type()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, max_upload_size))?
    {
        if data.len() + chunk.len() > max_upload_size {
            return Err(AppError::PayloadTooLarge(max_upload_size));
        }
        data.extend_from_slice(&chunk);
    }

    Ok(EvidenceUpload {
        file_name,
        content_type,
        data,
    })
}

fn multipart_error(err: axum::extract::multipart::MultipartError, max_upload_size: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(max_upload_size)
    } else {
        AppError::Upload(format!("Failed to read multipart data: {}", err.body_text()))
    }
}
