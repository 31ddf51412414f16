//! Error types for SkillSwap Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Invalid {entity} transition from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("Unknown {kind} value: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

impl CoreError {
    /// Shorthand for a validation failure on a named field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = CoreError::validation("email", "must contain '@'");
        assert_eq!(
            err.to_string(),
            "Validation failed for 'email': must contain '@'"
        );
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = CoreError::InvalidTransition {
            entity: "booking",
            from: "CANCELLED".to_string(),
            to: "CANCELLED".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid booking transition from CANCELLED to CANCELLED"
        );
    }
}
