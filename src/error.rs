//! Error handling for the outlay client.
//!
//! Two layers are distinguished. Faults (broken config files, unusable home directories,
//! programming errors) travel as `anyhow` errors with context. Expected failures of remote
//! operations travel as [`ApiError`] values so that callers can branch on the failure class
//! without string matching.

use std::collections::BTreeMap;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Field name mapped to a human-readable message, produced by local draft validation.
pub type FieldErrors = BTreeMap<String, String>;

/// The result type for operations against the remote store.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// The expected failure modes of the client. Public operations return these instead of
/// panicking; anything not covered here is a fault and propagates as `anyhow::Error`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The payload failed local validation; nothing was sent to the remote store.
    #[error("validation failed: {}", join_fields(.0))]
    Validation(FieldErrors),

    /// The remote store rejected the credential (401/403), or no session is present.
    #[error("authentication required: {0}")]
    Auth(String),

    /// The requested entity does not exist on the remote store (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote store reported a failure (any other non-success status).
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The request never completed: connection failure, DNS failure, or timeout.
    #[error("network error: {0}")]
    Network(String),
}

impl ApiError {
    /// Create a validation error for a single field.
    pub fn field(name: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(name.into(), message.into());
        ApiError::Validation(errors)
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        ApiError::Server {
            status,
            message: message.into(),
        }
    }

    /// True for failures that must tear down the session.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

fn join_fields(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_lists_fields() {
        let mut errors = FieldErrors::new();
        errors.insert("title".to_string(), "Title is required".to_string());
        errors.insert(
            "amount".to_string(),
            "Amount must be greater than 0".to_string(),
        );
        let e = ApiError::Validation(errors);
        let message = e.to_string();
        // BTreeMap iteration is alphabetical, so amount comes first.
        assert_eq!(
            message,
            "validation failed: amount: Amount must be greater than 0, title: Title is required"
        );
    }

    #[test]
    fn test_is_auth() {
        assert!(ApiError::Auth("no session".to_string()).is_auth());
        assert!(!ApiError::NotFound("tx1".to_string()).is_auth());
        assert!(!ApiError::server(500, "boom").is_auth());
    }
}
