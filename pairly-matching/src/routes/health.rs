use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pairly_shared::errors::{AppError, AppResult};
use pairly_shared::{HealthCheck, HealthResponse};

use crate::AppState;

/// Probes the database and reports which transport carries notifications.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let started = Instant::now();
    let database = match state.matchmaker.check_database() {
        Ok(()) => HealthCheck::healthy("database"),
        Err(e) => HealthCheck::unhealthy("database", e.to_string()),
    }
    .timed(started.elapsed());

    let transport = if state.config.telegram_bot_token.is_some() {
        HealthCheck::healthy("transport")
    } else {
        HealthCheck::degraded("transport", "no bot token, notifications are only logged")
    };

    let response = HealthResponse::from_checks(
        "pairly-matching",
        env!("CARGO_PKG_VERSION"),
        vec![database, transport],
    );
    (response.status.http_status(), Json(response)).into_response()
}

/// Returns Prometheus metrics.
pub async fn metrics(State(state): State<Arc<AppState>>) -> AppResult<String> {
    state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .ok_or_else(|| AppError::not_found("metrics exporter is not installed"))
}
