use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use pairly_shared::errors::AppResult;
use pairly_shared::types::ApiResponse;

use crate::models::{Broadcast, InterestId, UserId};
use crate::services::BroadcastReport;
use crate::AppState;

// --- POST /broadcasts ---

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub sender_id: UserId,
    pub text: String,
    pub interest_ids: Vec<InterestId>,
}

pub async fn request_broadcast(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BroadcastRequest>,
) -> AppResult<Json<ApiResponse<Broadcast>>> {
    let broadcast = state
        .matchmaker
        .request_broadcast(req.sender_id, req.text, req.interest_ids)
        .await?;
    Ok(Json(ApiResponse::ok_with_message(broadcast, "sent for review")))
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub admin_id: UserId,
}

// --- POST /broadcasts/:id/approve ---

pub async fn approve_broadcast(
    Path(id): Path<i32>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReviewRequest>,
) -> AppResult<Json<ApiResponse<BroadcastReport>>> {
    let report = state.matchmaker.approve_broadcast(req.admin_id, id).await?;
    Ok(Json(ApiResponse::ok(report)))
}

// --- POST /broadcasts/:id/decline ---

pub async fn decline_broadcast(
    Path(id): Path<i32>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReviewRequest>,
) -> AppResult<Json<ApiResponse<Broadcast>>> {
    let broadcast = state.matchmaker.decline_broadcast(req.admin_id, id).await?;
    Ok(Json(ApiResponse::ok(broadcast)))
}
