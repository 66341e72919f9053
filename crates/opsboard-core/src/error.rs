use std::collections::BTreeMap;
use thiserror::Error;

/// Field name → messages, the shape returned with validation failures.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        fields: FieldErrors,
    },

    #[error("{0}")]
    BusinessRule(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {message}")]
    Forbidden { message: String, force_logout: bool },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BoardError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        BoardError::NotFound(what.to_string())
    }

    /// Validation failure pinned to a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.clone()]);
        BoardError::Validation { message, fields }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        BoardError::Forbidden {
            message: message.into(),
            force_logout: false,
        }
    }

    /// Errors the caller caused, as opposed to failures on our side.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BoardError::NotFound(_)
                | BoardError::Validation { .. }
                | BoardError::BusinessRule(_)
                | BoardError::Unauthorized(_)
                | BoardError::Forbidden { .. }
        )
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        BoardError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_field_carries_field_map() {
        let err = BoardError::invalid_field("invoice", "The invoice has already been taken.");
        match err {
            BoardError::Validation { message, fields } => {
                assert_eq!(message, "The invoice has already been taken.");
                assert_eq!(fields["invoice"].len(), 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_client_error_classification() {
        assert!(BoardError::not_found("Card 1").is_client_error());
        assert!(BoardError::forbidden("nope").is_client_error());
        assert!(!BoardError::Database("locked".into()).is_client_error());
        assert!(!BoardError::Internal("boom".into()).is_client_error());
    }
}
