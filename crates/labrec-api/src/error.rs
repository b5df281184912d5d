//! HTTP error mapping.
//!
//! Every failure leaves the API as `{"success": false, <field>: <message>}`.
//! The field is `error` except for unknown users on the experiment and
//! progress endpoints, which answer with `reason: "no_user"`.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

use labrec_core::upload::FILE_TOO_LARGE_MESSAGE;

/// Code returned by coded endpoints on store failure.
pub const DB_ERROR: &str = "db_error";

/// Reason returned for unknown usernames on coded endpoints and `/login`.
pub const NO_USER: &str = "no_user";

/// Message returned for unknown usernames on descriptive endpoints.
pub const USER_NOT_FOUND: &str = "user not found";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    BadRequest(String),

    /// Attachment refused by the upload policy.
    #[error("{0}")]
    UploadRejected(String),

    /// Attachment above the size ceiling.
    #[error("{}", FILE_TOO_LARGE_MESSAGE)]
    FileTooLarge,

    /// Unknown username, answered as `reason: "no_user"`.
    #[error("{}", NO_USER)]
    NoUser,

    /// Unknown username, answered as `error: "user not found"`.
    #[error("{}", USER_NOT_FOUND)]
    UserNotFound,

    /// Store failure; the message is already shaped for the endpoint.
    #[error("{0}")]
    Database(String),

    /// Attachment could not be persisted.
    #[error("file upload failed")]
    Upload,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::UploadRejected(_) | ApiError::FileTooLarge => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NoUser | ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Upload => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn field(&self) -> &'static str {
        match self {
            ApiError::NoUser => "reason",
            _ => "error",
        }
    }
}

/// How an endpoint family reports unknown users and store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStyle {
    /// `404 {reason: "no_user"}` and `500 {error: "db_error"}`.
    Coded,
    /// `404 {error: "user not found"}` and `500 {error: <store message>}`.
    Descriptive,
}

impl ErrorStyle {
    pub fn user_missing(self) -> ApiError {
        match self {
            ErrorStyle::Coded => ApiError::NoUser,
            ErrorStyle::Descriptive => ApiError::UserNotFound,
        }
    }

    /// Log a store failure and convert it for the response.
    pub fn store(self, op: &'static str, err: labrec_core::Error) -> ApiError {
        error!(subsystem = "api", op, error = %err, "Store operation failed");
        match self {
            ErrorStyle::Coded => ApiError::Database(DB_ERROR.to_string()),
            ErrorStyle::Descriptive => ApiError::Database(err.store_message()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(subsystem = "api", error = %rejection.body_text(), "Rejected JSON body");
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        // Bodies past the request limit surface here; they are size
        // violations, not malformed uploads.
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::FileTooLarge
        } else {
            ApiError::BadRequest(format!("invalid multipart body: {}", err.body_text()))
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = serde_json::Map::new();
        body.insert("success".to_string(), serde_json::Value::Bool(false));
        body.insert(
            self.field().to_string(),
            serde_json::Value::String(self.to_string()),
        );

        (self.status(), Json(serde_json::Value::Object(body))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::UploadRejected("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::FileTooLarge.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NoUser.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::UserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Database(DB_ERROR.into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Upload.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_no_user_uses_reason_field() {
        assert_eq!(ApiError::NoUser.field(), "reason");
        assert_eq!(ApiError::NoUser.to_string(), "no_user");
        assert_eq!(ApiError::UserNotFound.field(), "error");
    }

    #[test]
    fn test_error_style_store_messages() {
        let coded = ErrorStyle::Coded.store("test", labrec_core::Error::Internal("boom".into()));
        assert_eq!(coded.to_string(), "db_error");

        let descriptive =
            ErrorStyle::Descriptive.store("test", labrec_core::Error::Internal("boom".into()));
        assert_eq!(descriptive.to_string(), "Internal error: boom");
    }

    #[test]
    fn test_file_too_large_message_mentions_limit() {
        assert!(ApiError::FileTooLarge.to_string().contains("10MB"));
    }
}
