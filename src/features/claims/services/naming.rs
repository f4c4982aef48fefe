//! Deterministic names for submission folders and artifacts.
//!
//! Names are lower-cased with spaces turned into underscores. Path separators
//! are replaced as well so a user-supplied value can never escape the
//! submission directory. Uniqueness is not provided here; the upload service
//! appends a random suffix to folder names.
//!
//! Every component is capped in bytes so a generated name stays well under
//! the 255-byte limit most filesystems place on a single path segment.

const MAX_REQUESTER_BYTES: usize = 64;
const MAX_DATE_BYTES: usize = 40;
const MAX_STEM_BYTES: usize = 100;
const MAX_EXTENSION_BYTES: usize = 16;

fn normalize(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

/// Longest prefix of `value` within `max` bytes that ends on a char boundary.
fn truncate_bytes(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

/// Cap a file name while keeping a short extension intact.
fn bounded_base(base: &str) -> String {
    match base.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() && extension.len() <= MAX_EXTENSION_BYTES => {
            format!("{}.{}", truncate_bytes(stem, MAX_STEM_BYTES), extension)
        }
        _ => truncate_bytes(base, MAX_STEM_BYTES).to_string(),
    }
}

/// `<name>_<date>_<base>` in normalized form.
pub fn file_name(requester: &str, date: &str, base: &str) -> String {
    format!(
        "{}_{}_{}",
        truncate_bytes(&normalize(requester), MAX_REQUESTER_BYTES),
        truncate_bytes(&normalize(date), MAX_DATE_BYTES),
        bounded_base(&normalize(base))
    )
}

/// Folder stem for a requester; the caller adds the uniqueness suffix.
pub fn folder_name(requester: &str) -> String {
    truncate_bytes(&normalize(requester), MAX_REQUESTER_BYTES).to_string()
}

/// Insert `_<suffix>` before the extension of an already generated name.
pub fn with_suffix(file_name: &str, suffix: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => {
            format!("{}_{}.{}", stem, suffix, extension)
        }
        _ => format!("{}_{}", file_name, suffix),
    }
}
