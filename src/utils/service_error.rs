// Service error type shared by the content, resume, billing and
// entitlement flows. Every variant renders as a user-facing JSON message;
// none is fatal to the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::content::RequestStatus;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Record store error: {0}")]
    Store(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found")]
    NotFound,

    #[error("Insufficient tokens: {required} required, {available} available")]
    InsufficientTokens { required: i64, available: i64 },

    #[error("Cannot {action} a request in status {}", from.as_str())]
    InvalidTransition {
        from: RequestStatus,
        action: &'static str,
    },

    #[error("Payment gateway error: {0}")]
    Payment(String),

    #[error("Failed to request content generation")]
    DispatchFailed,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ServiceError::Store(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ServiceError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServiceError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            ServiceError::InsufficientTokens { .. } => {
                (StatusCode::PAYMENT_REQUIRED, self.to_string())
            },
            ServiceError::InvalidTransition { .. } => (StatusCode::CONFLICT, self.to_string()),
            // Gateway errors are surfaced verbatim
            ServiceError::Payment(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ServiceError::DispatchFailed => (StatusCode::BAD_GATEWAY, self.to_string()),
            ServiceError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ServiceError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

// Conversion from various error types
impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => ServiceError::NotFound,
            other => ServiceError::Store(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(error: validator::ValidationErrors) -> Self {
        ServiceError::Validation(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_tokens_reports_amounts() {
        let error = ServiceError::InsufficientTokens {
            required: 5,
            available: 2,
        };
        let message = error.to_string();
        assert!(message.contains("5 required"));
        assert!(message.contains("2 available"));
    }

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let error: ServiceError = StoreError::NotFound.into();
        assert!(matches!(error, ServiceError::NotFound));
    }

    #[test]
    fn test_invalid_transition_names_state() {
        let error = ServiceError::InvalidTransition {
            from: RequestStatus::Completed,
            action: "cancel",
        };
        assert!(error.to_string().contains("Completed"));
    }
}
