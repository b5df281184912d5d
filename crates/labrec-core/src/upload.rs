//! Upload policy for literature attachments.
//!
//! Decides which files are accepted and how stored objects are named:
//! - MIME allowlist (documents, slides, common images)
//! - fixed 10 MiB size ceiling
//! - collision-resistant `literature-<epoch_ms>-<random>.<ext>` names

use chrono::Utc;
use rand::Rng;

/// Multipart field carrying the attachment.
pub const UPLOAD_FIELD: &str = "literatureFile";

/// Largest accepted attachment, in bytes (inclusive).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Prefix of every generated stored name.
pub const STORED_NAME_PREFIX: &str = "literature";

/// MIME types accepted when type filtering is enabled.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "image/jpeg",
    "image/png",
    "image/gif",
];

/// Human-readable rejection for disallowed types.
pub const UNSUPPORTED_TYPE_MESSAGE: &str =
    "unsupported file type, please upload a PDF, Word, TXT, PPT or image file";

/// Human-readable rejection for oversized files.
pub const FILE_TOO_LARGE_MESSAGE: &str = "file too large, please upload a file smaller than 10MB";

/// Check a claimed content type against [`ALLOWED_MIME_TYPES`].
///
/// Parameters such as `; charset=utf-8` are ignored and the comparison is
/// case-insensitive.
pub fn is_allowed_mime(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_MIME_TYPES.contains(&essence.as_str())
}

/// Whether `size` bytes fits under the ceiling.
pub fn within_size_limit(size: u64) -> bool {
    size <= MAX_UPLOAD_BYTES
}

/// Extension of the uploaded name, lowercased.
///
/// Returns `None` when there is no extension or when it contains anything
/// other than ASCII alphanumerics, so client names never leak path syntax
/// into stored keys.
pub fn file_extension(original_name: &str) -> Option<String> {
    let base = original_name.rsplit(['/', '\\']).next()?;
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Build a stored name from explicit parts.
pub fn stored_name_from_parts(original_name: &str, epoch_ms: i64, suffix: u32) -> String {
    match file_extension(original_name) {
        Some(ext) => format!("{STORED_NAME_PREFIX}-{epoch_ms}-{suffix}.{ext}"),
        None => format!("{STORED_NAME_PREFIX}-{epoch_ms}-{suffix}"),
    }
}

/// Generate a fresh stored name for an upload.
pub fn generate_stored_name(original_name: &str) -> String {
    let suffix = rand::thread_rng().gen_range(0..1_000_000_000u32);
    stored_name_from_parts(original_name, Utc::now().timestamp_millis(), suffix)
}
