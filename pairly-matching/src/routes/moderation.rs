use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use pairly_shared::errors::AppResult;
use pairly_shared::types::ApiResponse;

use crate::models::UserId;
use crate::services::ReportOutcome;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ModerationRequest {
    pub user_id: UserId,
    pub target_id: UserId,
    #[serde(default)]
    pub reason: Option<String>,
}

// --- POST /reports ---

pub async fn report(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ModerationRequest>,
) -> AppResult<Json<ApiResponse<ReportOutcome>>> {
    let outcome = state.matchmaker.report(req.user_id, req.target_id, req.reason).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

// --- POST /blocks ---

pub async fn block(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ModerationRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.matchmaker.block(req.user_id, req.target_id, req.reason).await?;
    Ok(Json(ApiResponse::ok_with_message((), "user blocked")))
}
