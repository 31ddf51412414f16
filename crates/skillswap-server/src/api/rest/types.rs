//! REST API type definitions
//!
//! Request and response types for the REST API endpoints. Domain payloads
//! (sessions, quizzes, packages) deserialize straight into the service
//! types; only the small envelopes live here.

use serde::{Deserialize, Serialize};
use skillswap_core::SessionId;
use skillswap_service::SkillSwap;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub app: SkillSwap,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub session_id: SessionId,
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct MailTestRequest {
    pub to: String,
}

/// Body for actions that return nothing else
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
