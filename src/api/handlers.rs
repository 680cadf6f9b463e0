//! HTTP request handlers for the Liquidation Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{post, put},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::service::{LiquidationRequest, SigningSignal};

use super::request::{LiquidationRunRequest, SigningRequest};
use super::response::{ApiError, ApiErrorResponse, SigningResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/signings", post(signing_handler))
        .route("/liquidations", post(liquidation_handler))
        .route("/liquidations/:id", put(recompute_handler))
        .with_state(state)
}

/// Handler for POST /signings.
///
/// Records a clock signal and returns the updated event with
/// `"Entrada"` or `"Salida"`.
async fn signing_handler(
    State(state): State<AppState>,
    payload: Result<Json<SigningRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing signing request");

    let signal: SigningSignal = match payload {
        Ok(Json(req)) => req.into(),
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match state.signing().sign(&signal).await {
        Ok(outcome) => json_response(StatusCode::OK, &SigningResponse::from(outcome)),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /liquidations.
async fn liquidation_handler(
    State(state): State<AppState>,
    payload: Result<Json<LiquidationRunRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing liquidation request");

    let request: LiquidationRequest = match payload {
        Ok(Json(req)) => req.into(),
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match state.liquidations().liquidate(request).await {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                liquidation_id = %outcome.liquidation.id,
                duration_us = start_time.elapsed().as_micros(),
                "Liquidation request completed"
            );
            json_response(StatusCode::CREATED, &outcome)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for PUT /liquidations/:id.
async fn recompute_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<LiquidationRunRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing recompute request");

    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => {
            warn!(correlation_id = %correlation_id, error = %rejection, "Invalid liquidation id");
            return json_response(
                StatusCode::BAD_REQUEST,
                &ApiError::validation_error(format!("Invalid liquidation id: {}", rejection)),
            );
        }
    };
    let request: LiquidationRequest = match payload {
        Ok(Json(req)) => req.into(),
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match state.liquidations().recompute(id, request).await {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                liquidation_id = %id,
                duration_us = start_time.elapsed().as_micros(),
                "Recompute request completed"
            );
            json_response(StatusCode::OK, &outcome)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(correlation_id = %correlation_id, error = %err, "Request failed");
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, &api_error.error)
}

/// Maps a JSON body rejection to a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, &error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::ConfigLoader;
    use crate::models::{Employee, EmployeeProfile, EmployeeStatus, Event, Period, Shift};
    use crate::service::LiquidationPorts;
    use crate::store::{
        InMemoryAuditLog, InMemoryEmployeeDirectory, InMemoryLiquidationStore, InMemoryNewsStore,
        InMemoryPeriodStore, RecordingNotifier,
    };
    use axum::{body::Body, http::Request};
    use chrono::{NaiveDate, NaiveDateTime};
    use tower::ServiceExt;

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn create_test_state() -> AppState {
        let config = ConfigLoader::load("./config/default").expect("Failed to load config");
        let period = Period {
            id: "per_mar".to_string(),
            objective_id: "obj_1".to_string(),
            from_date: make_date("2024-03-01"),
            to_date: make_date("2024-03-31"),
            shifts: vec![Shift {
                employee_id: "emp_001".to_string(),
                events: vec![Event::scheduled(
                    "ev_1",
                    make_datetime("2024-03-04 08:00:00"),
                    make_datetime("2024-03-04 20:00:00"),
                )],
                signed_dates: vec![],
            }],
        };
        let employee = Employee {
            id: "emp_001".to_string(),
            enrollment: "1001".to_string(),
            badge_id: "badge_001".to_string(),
            profile: EmployeeProfile::default(),
            status: EmployeeStatus::Activo,
        };
        let ports = LiquidationPorts {
            periods: Arc::new(InMemoryPeriodStore::with_periods(vec![period])),
            news: Arc::new(InMemoryNewsStore::default()),
            employees: Arc::new(InMemoryEmployeeDirectory::with_employees(vec![employee])),
            liquidations: Arc::new(InMemoryLiquidationStore::default()),
            audit: Arc::new(InMemoryAuditLog::default()),
        };
        AppState::new(config, ports, Arc::new(RecordingNotifier::default()))
    }

    async fn send(
        router: Router,
        method: &str,
        uri: &str,
        body: &str,
    ) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_signing_returns_entrada() {
        let router = create_router(create_test_state());
        let body = r#"{"objective_id":"obj_1","badge_id":"badge_001","timestamp":"2024-03-04T07:58:00"}"#;

        let (status, json) = send(router, "POST", "/signings", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["signing_result"], "Entrada");
        assert_eq!(json["event_updated"]["id"], "ev_1");
    }

    #[tokio::test]
    async fn test_signing_unknown_badge_returns_404() {
        let router = create_router(create_test_state());
        let body = r#"{"objective_id":"obj_1","badge_id":"nope","timestamp":"2024-03-04T07:58:00"}"#;

        let (status, json) = send(router, "POST", "/signings", body).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let error: ApiError = serde_json::from_value(json).unwrap();
        assert_eq!(error.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let router = create_router(create_test_state());
        let (status, json) = send(router, "POST", "/liquidations", "{invalid json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_field_returns_validation_error() {
        let router = create_router(create_test_state());
        let body = r#"{"date_from":"2024-03-01","employee_ids":["emp_001"],"actor_user_id":"u"}"#;

        let (status, json) = send(router, "POST", "/liquidations", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_liquidation_returns_201() {
        let router = create_router(create_test_state());
        let body = r#"{"date_from":"2024-03-01","date_to":"2024-03-31","employee_ids":["emp_001"],"actor_user_id":"u"}"#;

        let (status, json) = send(router, "POST", "/liquidations", body).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["settlements"].as_array().unwrap().len(), 1);
        assert_eq!(json["settlements"][0]["scheduled"]["total"], "12");
    }

    #[tokio::test]
    async fn test_recompute_with_invalid_id_returns_400() {
        let router = create_router(create_test_state());
        let body = r#"{"date_from":"2024-03-01","date_to":"2024-03-31","employee_ids":["emp_001"],"actor_user_id":"u"}"#;

        let (status, json) = send(router, "PUT", "/liquidations/not-a-uuid", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_recompute_unknown_run_returns_404() {
        let router = create_router(create_test_state());
        let body = r#"{"date_from":"2024-03-01","date_to":"2024-03-31","employee_ids":["emp_001"],"actor_user_id":"u"}"#;
        let uri = format!("/liquidations/{}", Uuid::new_v4());

        let (status, json) = send(router, "PUT", &uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "NOT_FOUND");
    }
}
