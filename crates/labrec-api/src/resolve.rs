//! Input checks and username resolution shared by the record handlers.

use labrec_core::UserRepository;
use tracing::debug;

use crate::error::{ApiError, ErrorStyle};

/// Return a required field unchanged, or a 400 naming it.
///
/// Blank and whitespace-only values count as missing.
pub fn require<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!("{} is required", field))),
    }
}

/// Resolve a username to its user id.
///
/// Unknown users and store failures produce different errors, shaped by
/// `style` for the calling endpoint.
pub async fn resolve_user(
    users: &dyn UserRepository,
    username: &str,
    style: ErrorStyle,
) -> Result<i64, ApiError> {
    match users.resolve_id(username).await {
        Ok(Some(id)) => Ok(id),
        Ok(None) => {
            debug!(subsystem = "api", username, "Username did not resolve");
            Err(style.user_missing())
        }
        Err(e) => Err(style.store("resolve_user", e)),
    }
}
