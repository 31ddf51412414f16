//! Server error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use skillswap_service::ServiceError;
use std::fmt;
use tracing::error;

/// Server error type
#[derive(Debug)]
pub enum ServerError {
    /// Failure reported by a service call
    Service(ServiceError),

    /// Malformed request outside the service layer
    InvalidRequest(String),

    /// Not found
    NotFound(String),

    /// Internal server error
    InternalError(String),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Service(err) => write!(f, "{}", err),
            ServerError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ServerError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ServerError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

impl ServerError {
    /// HTTP status and optional machine-readable code
    pub fn status_and_code(&self) -> (StatusCode, Option<&'static str>) {
        match self {
            ServerError::Service(err) => match err {
                ServiceError::Authentication(_) | ServiceError::Token(_) => {
                    (StatusCode::UNAUTHORIZED, None)
                }
                ServiceError::Authorization(_) => (StatusCode::FORBIDDEN, None),
                ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, None),
                ServiceError::InvalidState(_) => (StatusCode::BAD_REQUEST, Some("INVALID_STATE")),
                ServiceError::InsufficientCredits { .. } => {
                    (StatusCode::BAD_REQUEST, Some("INSUFFICIENT_CREDITS"))
                }
                ServiceError::Conflict(_) => (StatusCode::CONFLICT, None),
                ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, None),
                ServiceError::Gone(_) => (StatusCode::GONE, None),
                ServiceError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
            },
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, None),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, None),
            ServerError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        }
    }

    fn description(&self) -> String {
        match self {
            ServerError::Service(err) => err.to_string(),
            ServerError::InvalidRequest(msg)
            | ServerError::NotFound(msg)
            | ServerError::InternalError(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let description = self.description();

        if status.is_server_error() {
            error!("Request failed: {}", description);
        }

        let mut body = json!({
            "status": status.as_u16(),
            "description": description,
        });
        if let Some(code) = code {
            body["code"] = json!(code);
        }

        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ServerError {
    fn from(err: ServiceError) -> Self {
        ServerError::Service(err)
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_display() {
        let err = ServerError::InvalidRequest("missing field".to_string());
        assert_eq!(err.to_string(), "Invalid request: missing field");
    }

    #[test]
    fn test_service_error_display_passes_through() {
        let err: ServerError = ServiceError::invalid_state("no available capacity").into();
        assert_eq!(err.to_string(), "no available capacity");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ServiceError::Authentication("x".into()), StatusCode::UNAUTHORIZED),
            (ServiceError::Token("x".into()), StatusCode::UNAUTHORIZED),
            (ServiceError::Authorization("x".into()), StatusCode::FORBIDDEN),
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Conflict("x".into()), StatusCode::CONFLICT),
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::Gone("x".into()), StatusCode::GONE),
            (ServiceError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            let (status, code) = ServerError::from(err).status_and_code();
            assert_eq!(status, expected);
            assert!(code.is_none());
        }
    }

    #[test]
    fn test_domain_failures_carry_codes() {
        let err: ServerError = ServiceError::InsufficientCredits {
            balance: 1,
            required: 3,
        }
        .into();
        assert_eq!(
            err.status_and_code(),
            (StatusCode::BAD_REQUEST, Some("INSUFFICIENT_CREDITS"))
        );

        let err: ServerError = ServiceError::invalid_state("closed").into();
        assert_eq!(
            err.status_and_code(),
            (StatusCode::BAD_REQUEST, Some("INVALID_STATE"))
        );
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let server_err: ServerError = anyhow_err.into();
        assert!(server_err.to_string().contains("Internal error"));
        assert!(server_err.to_string().contains("something went wrong"));
    }

    #[test]
    fn test_into_response_status() {
        let response = ServerError::InvalidRequest("bad body".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ServerError::NotFound("resource missing".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ServerError>();
    }
}
