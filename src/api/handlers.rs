//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::request::{actor_from_headers, CreatePeriodRequest};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/periods", post(create_period_handler))
        .route("/periods/:period_id", get(get_period_handler))
        .route("/periods/:period_id/run", post(run_payroll_handler))
        .route(
            "/periods/:period_id/payslips/:employee_id",
            get(get_payslip_handler),
        )
        .route("/periods/:period_id/summary", get(get_summary_handler))
        .with_state(state)
}

/// Liveness check.
async fn health_handler() -> &'static str {
    "ok"
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn rejection_to_error(rejection: JsonRejection, correlation_id: Uuid) -> ApiError {
    match rejection {
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
    }
}

/// Handler for `POST /periods`.
async fn create_period_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreatePeriodRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let actor = actor_from_headers(&headers);
    info!(correlation_id = %correlation_id, actor = %actor, "Processing create period request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = rejection_to_error(rejection, correlation_id);
            return json_response(StatusCode::BAD_REQUEST, error);
        }
    };

    match state
        .engine()
        .create_period(request.start_date, request.end_date, &actor)
        .await
    {
        Ok(period) => json_response(StatusCode::CREATED, period),
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Create period failed");
            ApiErrorResponse::from(err).into_response()
        }
    }
}

/// Handler for `GET /periods/:period_id`.
async fn get_period_handler(
    State(state): State<AppState>,
    Path(period_id): Path<String>,
) -> Response {
    match state.engine().get_period(&period_id).await {
        Ok(period) => json_response(StatusCode::OK, period),
        Err(err) => ApiErrorResponse::from(err).into_response(),
    }
}

/// Handler for `POST /periods/:period_id/run`.
///
/// The run executes on its own task. Dropping this handler, for instance when
/// the client disconnects, cancels the run; so does the configured deadline.
async fn run_payroll_handler(
    State(state): State<AppState>,
    Path(period_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let actor = actor_from_headers(&headers);
    info!(
        correlation_id = %correlation_id,
        period_id = %period_id,
        actor = %actor,
        "Processing payroll run request"
    );

    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    let start_time = Instant::now();
    let mut task = {
        let engine = state.engine().clone();
        let token = cancel.clone();
        let period_id = period_id.clone();
        tokio::spawn(async move { engine.run_payroll(&period_id, &actor, &token).await })
    };

    let joined = match state.config().run_timeout() {
        Some(limit) => match timeout(limit, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(
                    correlation_id = %correlation_id,
                    period_id = %period_id,
                    timeout_secs = limit.as_secs(),
                    "Payroll run deadline exceeded; cancelling"
                );
                cancel.cancel();
                task.await
            }
        },
        None => task.await,
    };
    guard.disarm();

    match joined {
        Ok(Ok(report)) => {
            info!(
                correlation_id = %correlation_id,
                period_id = %period_id,
                payslips_created = report.payslips_created,
                failures = report.failures.len(),
                duration_us = start_time.elapsed().as_micros() as u64,
                "Payroll run request completed"
            );
            json_response(StatusCode::OK, report)
        }
        Ok(Err(err)) => {
            warn!(
                correlation_id = %correlation_id,
                period_id = %period_id,
                error = %err,
                "Payroll run failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
        Err(join_error) => {
            error!(
                correlation_id = %correlation_id,
                period_id = %period_id,
                error = %join_error,
                "Payroll run task aborted"
            );
            ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal("Payroll run task aborted"),
            )
            .into_response()
        }
    }
}

/// Handler for `GET /periods/:period_id/payslips/:employee_id`.
async fn get_payslip_handler(
    State(state): State<AppState>,
    Path((period_id, employee_id)): Path<(String, String)>,
) -> Response {
    match state.engine().get_payslip(&employee_id, &period_id).await {
        Ok(payslip) => json_response(StatusCode::OK, payslip),
        Err(err) => ApiErrorResponse::from(err).into_response(),
    }
}

/// Handler for `GET /periods/:period_id/summary`.
async fn get_summary_handler(
    State(state): State<AppState>,
    Path(period_id): Path<String>,
) -> Response {
    match state.engine().get_payroll_summary(&period_id).await {
        Ok(summary) => json_response(StatusCode::OK, summary),
        Err(err) => ApiErrorResponse::from(err).into_response(),
    }
}
