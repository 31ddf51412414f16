//! Service error types

use skillswap_core::CoreError;
use skillswap_repository::RepositoryError;
use thiserror::Error;

/// Service error type
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Bad credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Account state or ownership forbids the action
    #[error("Access denied: {0}")]
    Authorization(String),

    /// Bearer token missing, malformed or expired
    #[error("Invalid token: {0}")]
    Token(String),

    /// Malformed input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Booking or session state does not allow the action
    #[error("{0}")]
    InvalidState(String),

    #[error("Insufficient credits: balance {balance}, required {required}")]
    InsufficientCredits { balance: i64, required: i64 },

    /// Unique constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource existed but is no longer usable
    #[error("Gone: {0}")]
    Gone(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("{} {}", entity, id))
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        ServiceError::InvalidState(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Authorization(message.into())
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidTransition { .. } => ServiceError::InvalidState(err.to_string()),
            CoreError::Validation { .. } | CoreError::UnknownVariant { .. } => {
                ServiceError::Validation(err.to_string())
            }
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ServiceError::NotFound(format!("{} {}", entity, id))
            }
            RepositoryError::Conflict(message) => ServiceError::Conflict(message),
            RepositoryError::InsufficientCredits {
                balance, requested, ..
            } => ServiceError::InsufficientCredits {
                balance,
                required: requested,
            },
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;
