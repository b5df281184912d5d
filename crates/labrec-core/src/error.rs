//! Error types for labrec.

use thiserror::Error;

/// Result type alias using labrec's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for labrec operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Attachment storage backend failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

impl Error {
    /// Message suitable for passing through to API clients.
    ///
    /// Database errors surface the driver's own message without the
    /// `Database error:` prefix, mirroring what the store reported.
    pub fn store_message(&self) -> String {
        match self {
            Error::Database(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("year must be an integer".to_string());
        assert_eq!(err.to_string(), "Invalid input: year must be an integer");
    }

    #[test]
    fn test_error_display_storage() {
        let err = Error::Storage("bucket unreachable".to_string());
        assert_eq!(err.to_string(), "Storage error: bucket unreachable");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("OBJECT_STORE_ENDPOINT missing".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: OBJECT_STORE_ENDPOINT missing"
        );
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_store_message_strips_prefix_for_database() {
        let err = Error::Database(sqlx::Error::RowNotFound);
        assert!(!err.store_message().starts_with("Database error"));
        assert!(err.to_string().starts_with("Database error"));
    }

    #[test]
    fn test_store_message_keeps_other_variants() {
        let err = Error::Internal("boom".to_string());
        assert_eq!(err.store_message(), "Internal error: boom");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }
}
