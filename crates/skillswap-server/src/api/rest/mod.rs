//! REST API implementation
//!
//! - types: request/response envelopes and shared state
//! - extractors: JSON body and bearer identity extractors
//! - handlers: one handler per endpoint
//! - router: route table and middleware

mod extractors;
mod handlers;
mod router;
mod tests;
pub mod types;

// Re-export public API
pub use extractors::{AuthUser, JsonExtractor};
pub use router::create_router;
pub use types::{AppState, HealthResponse};
