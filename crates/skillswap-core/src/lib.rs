//! SkillSwap Core - entity types and domain rules
//!
//! This crate provides the plain data records shared by every layer:
//! - Entity types (people, catalog, sessions, bookings, ledger, communities)
//! - State-transition rules for sessions, bookings and verification tokens
//! - Input validation functions
//! - Error types

pub mod error;
pub mod model;
pub mod validation;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use model::*;
