use std::fmt;

/// Error taxonomy shared by every domain crate.
///
/// Validation errors are rejected before any state change; conflict and
/// invalid-transition errors carry the current-state context so a caller can
/// refresh and retry; nothing here is retried internally.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    #[error("validation failed for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    Conflict(String),

    #[error("version conflict: expected {expected}, found {found}")]
    VersionConflict { expected: i64, found: i64 },

    #[error("invalid {entity} transition from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("{0}")]
    Authorization(String),

    #[error("{0} not found")]
    NotFound(String),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        DomainError::Conflict(message.into())
    }

    pub fn invalid_transition(
        entity: &'static str,
        from: impl fmt::Display,
        to: impl fmt::Display,
    ) -> Self {
        DomainError::InvalidTransition {
            entity,
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        DomainError::Authorization(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        DomainError::NotFound(what.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message_carries_context() {
        let err = DomainError::invalid_transition("rfq", "DRAFT", "AWARDED");
        assert_eq!(err.to_string(), "invalid rfq transition from DRAFT to AWARDED");
    }

    #[test]
    fn test_version_conflict_message() {
        let err = DomainError::VersionConflict { expected: 3, found: 4 };
        assert_eq!(err.to_string(), "version conflict: expected 3, found 4");
    }
}
