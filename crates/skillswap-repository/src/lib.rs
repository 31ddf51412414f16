//! Persistence layer for SkillSwap
//!
//! This crate defines one repository trait per aggregate and two backends
//! that implement all of them.
//!
//! # Features
//!
//! - **Memory Store**: process-local tables, the default backend
//! - **PostgreSQL Store**: `sqlx`-backed storage with embedded migrations
//!   (enable the `postgres` feature)
//! - **Async API**: every operation is an `async fn` behind `async_trait`
//!
//! # Quick Start
//!
//! ```no_run
//! use skillswap_repository::{PersonRepository, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = StoreConfig::memory().open().await?;
//!     println!("Using {} store", store.backend_name());
//!
//!     if store.find_person_by_email("ada@example.com").await?.is_none() {
//!         println!("no such person");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │        Service Layer                   │
//! │  (booking, verification, suggestions)  │
//! └──────────────┬─────────────────────────┘
//!                │ Arc<dyn Store>
//!                ↓
//! ┌────────────────────────────────────────┐
//! │    Repository Traits                   │
//! │  Person / Catalog / Session / Booking  │
//! │  Ledger / Community / Verification     │
//! │  Suggestion                            │
//! └──────────────┬─────────────────────────┘
//!                │
//!       ┌────────┴────────┐
//!       ↓                 ↓
//! ┌──────────────┐  ┌──────────────────┐
//! │ MemoryStore  │  │  PostgresStore   │
//! │ - RwLock     │  │  - unique indexes│
//! │ - BTreeMaps  │  │  - migrations    │
//! └──────────────┘  └──────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod memory;
pub mod traits;

#[cfg(feature = "postgres")]
pub mod postgres;

// Re-exports - Configuration
pub use config::{ConfigError, StoreConfig, StoreSource};

// Re-exports - Error
pub use error::{RepositoryError, RepositoryResult};

// Re-exports - Stores
pub use memory::MemoryStore;
pub use traits::*;

#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;
