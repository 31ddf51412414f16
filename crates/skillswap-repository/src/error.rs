//! Error types for the repository layer

use skillswap_core::CoreError;
use thiserror::Error;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur during repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Record with the given key does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Unique constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Balance update would go below zero
    #[error("Insufficient credits for person {person_id}: balance {balance}, requested {requested}")]
    InsufficientCredits {
        person_id: i64,
        balance: i64,
        requested: i64,
    },

    /// Database error (when database feature is enabled)
    #[cfg(feature = "postgres")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON column could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored value does not map onto an entity type
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Generic error
    #[error("Repository error: {0}")]
    Other(String),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<CoreError> for RepositoryError {
    fn from(err: CoreError) -> Self {
        RepositoryError::Corrupt(err.to_string())
    }
}
