//! Store configuration types
//!
//! Selects which backend holds SkillSwap state and opens it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::{MemoryStore, RepositoryError, RepositoryResult, Store};

/// Default connection pool size for the PostgreSQL backend
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreSource {
    /// Process-local tables, lost on restart
    #[default]
    Memory,
    /// PostgreSQL database (requires the `postgres` feature)
    Postgres,
}

/// Store configuration
///
/// # Examples
///
/// ```rust
/// use skillswap_repository::StoreConfig;
///
/// let config = StoreConfig::memory();
///
/// let config = StoreConfig::postgres("postgresql://localhost/skillswap")
///     .with_max_connections(20);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub source: StoreSource,

    /// Connection URL (required for the postgres source)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Apply pending migrations when the store is opened
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_run_migrations() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::memory()
    }
}

impl StoreConfig {
    pub fn memory() -> Self {
        Self {
            source: StoreSource::Memory,
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            run_migrations: true,
        }
    }

    pub fn postgres(url: impl Into<String>) -> Self {
        Self {
            source: StoreSource::Postgres,
            database_url: Some(url.into()),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            run_migrations: true,
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Returns an error if required fields are missing for the selected source.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.source {
            StoreSource::Postgres => {
                if self.database_url.as_deref().map_or(true, str::is_empty) {
                    return Err(ConfigError::MissingField {
                        source: "postgres",
                        field: "database_url",
                    });
                }
                if self.max_connections == 0 {
                    return Err(ConfigError::Invalid {
                        field: "max_connections",
                        message: "must be at least 1".to_string(),
                    });
                }
            }
            StoreSource::Memory => {}
        }
        Ok(())
    }

    /// Open the configured backend
    pub async fn open(&self) -> RepositoryResult<Arc<dyn Store>> {
        self.validate()
            .map_err(|e| RepositoryError::Other(e.to_string()))?;

        match self.source {
            StoreSource::Memory => {
                info!("Using in-memory store");
                Ok(Arc::new(MemoryStore::new()))
            }
            StoreSource::Postgres => self.open_postgres().await,
        }
    }

    #[cfg(feature = "postgres")]
    async fn open_postgres(&self) -> RepositoryResult<Arc<dyn Store>> {
        let url = self.database_url.as_deref().unwrap_or_default();
        let store = crate::PostgresStore::connect(url, self.max_connections).await?;
        if self.run_migrations {
            store.migrate().await?;
            info!("Database migrations applied");
        }
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "postgres"))]
    async fn open_postgres(&self) -> RepositoryResult<Arc<dyn Store>> {
        Err(RepositoryError::Other(
            "postgres storage requires the `postgres` feature".to_string(),
        ))
    }
}

/// Configuration error
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// A required field is missing for the selected source
    MissingField {
        source: &'static str,
        field: &'static str,
    },
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingField { source, field } => {
                write!(f, "{} source requires {} to be set", source, field)
            }
            ConfigError::Invalid { field, message } => write!(f, "{}: {}", field, message),
        }
    }
}

impl std::error::Error for ConfigError {}
