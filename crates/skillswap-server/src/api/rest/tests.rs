//! Tests for REST API components

#![cfg(test)]

use super::handlers::verification_status_code;
use super::types::*;
use axum::http::StatusCode;
use skillswap_service::VerificationStatus;

#[test]
fn test_verification_status_codes() {
    assert_eq!(verification_status_code(VerificationStatus::Verified), StatusCode::OK);
    assert_eq!(verification_status_code(VerificationStatus::TokenSent), StatusCode::OK);
    assert_eq!(
        verification_status_code(VerificationStatus::AlreadyVerified),
        StatusCode::CONFLICT
    );
    assert_eq!(
        verification_status_code(VerificationStatus::ExpiredToken),
        StatusCode::GONE
    );
    assert_eq!(verification_status_code(VerificationStatus::TokenUsed), StatusCode::GONE);
    assert_eq!(
        verification_status_code(VerificationStatus::InvalidToken),
        StatusCode::NOT_FOUND
    );
}

#[test]
fn test_booking_request_uses_camel_case() {
    let request: BookingRequest = serde_json::from_str(r#"{"sessionId": 7}"#).unwrap();
    assert_eq!(request.session_id, 7);

    assert!(serde_json::from_str::<BookingRequest>(r#"{"session_id": 7}"#).is_err());
}

#[test]
fn test_login_request_deserialization() {
    let request: LoginRequest =
        serde_json::from_str(r#"{"email": "a@b.io", "password": "pw"}"#).unwrap();
    assert_eq!(request.email, "a@b.io");
    assert_eq!(request.password, "pw");
}

#[test]
fn test_health_response_serialization() {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: "0.1.0".to_string(),
    };
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], "0.1.0");
}

#[test]
fn test_message_response() {
    let json = serde_json::to_value(MessageResponse::new("done")).unwrap();
    assert_eq!(json, serde_json::json!({"message": "done"}));
}
