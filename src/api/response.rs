//! Response types for the Liquidation Engine API.
//!
//! This module defines the success and error response structures and the
//! mapping from [`EngineError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::calculation::SigningKind;
use crate::error::EngineError;
use crate::models::Event;
use crate::service::SigningOutcome;

/// Response body for a recorded signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningResponse {
    /// The event after the update.
    pub event_updated: Event,
    /// `"Entrada"` or `"Salida"`.
    pub signing_result: SigningKind,
    /// The period owning the event.
    pub period_id: String,
}

impl From<SigningOutcome> for SigningResponse {
    fn from(outcome: SigningOutcome) -> Self {
        Self {
            event_updated: outcome.event,
            signing_result: outcome.kind,
            period_id: outcome.period_id,
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::NotFound { .. } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new("NOT_FOUND", message),
            },
            EngineError::NoScheduleFound { .. } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::with_details(
                    "NO_SCHEDULE_FOUND",
                    message,
                    "No scheduled event near the signal could be matched",
                ),
            },
            EngineError::ValidationFailed { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::validation_error(message),
            },
            EngineError::Conflict { .. } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::new("CONFLICT", message),
            },
            EngineError::StaleSignal { .. } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "STALE_SIGNAL",
                    message,
                    "The event already has a later checkout",
                ),
            },
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::TaskFailed { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::new("INTERNAL_ERROR", message),
            },
            EngineError::Store(_) => ApiErrorResponse {
                status: StatusCode::SERVICE_UNAVAILABLE,
                error: ApiError::new("STORE_ERROR", message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use chrono::NaiveDateTime;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_engine_errors_map_to_status_codes() {
        let timestamp =
            NaiveDateTime::parse_from_str("2024-03-04 06:10:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let cases: Vec<(EngineError, StatusCode, &str)> = vec![
            (
                EngineError::not_found("badge", "b-1"),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                EngineError::NoScheduleFound {
                    employee_id: "emp_001".to_string(),
                    timestamp,
                },
                StatusCode::NOT_FOUND,
                "NO_SCHEDULE_FOUND",
            ),
            (
                EngineError::validation("employee_ids", "empty"),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                EngineError::Conflict {
                    resource: "liquidation".to_string(),
                    id: "run-1".to_string(),
                },
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                EngineError::StaleSignal {
                    event_id: "ev_1".to_string(),
                    timestamp,
                },
                StatusCode::CONFLICT,
                "STALE_SIGNAL",
            ),
            (
                EngineError::Store(StoreError::Backend("down".to_string())),
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_ERROR",
            ),
        ];

        for (error, status, code) in cases {
            let response: ApiErrorResponse = error.into();
            assert_eq!(response.status, status);
            assert_eq!(response.error.code, code);
        }
    }

    #[test]
    fn test_signing_kind_serializes_as_spanish_label() {
        let json = serde_json::to_string(&SigningKind::CheckOut).unwrap();
        assert_eq!(json, "\"Salida\"");
    }
}
