use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use pairly_shared::errors::AppResult;
use pairly_shared::types::ApiResponse;

use crate::matching::session::{BrowseStart, NextCandidate};
use crate::models::UserId;
use crate::services::{Reaction, ReactionOutcome};
use crate::AppState;

// --- POST /browse/:user_id ---

pub async fn start_browsing(
    Path(user_id): Path<UserId>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<BrowseStart>>> {
    let start = state.matchmaker.start_browsing(user_id).await?;
    Ok(Json(ApiResponse::ok(start)))
}

// --- POST /browse/:user_id/next ---

pub async fn next_candidate(
    Path(user_id): Path<UserId>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<NextCandidate>>> {
    let next = state.matchmaker.next_candidate(user_id).await?;
    Ok(Json(ApiResponse::ok(next)))
}

// --- POST /browse/:user_id/react ---

#[derive(Debug, Deserialize)]
pub struct ReactRequest {
    pub reaction: Reaction,
}

pub async fn react(
    Path(user_id): Path<UserId>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReactRequest>,
) -> AppResult<Json<ApiResponse<ReactionOutcome>>> {
    let outcome = state.matchmaker.react(user_id, req.reaction).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}
