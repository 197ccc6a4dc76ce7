use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use pairly_shared::errors::AppResult;
use pairly_shared::types::ApiResponse;

use crate::models::{LikerSummary, UserId};
use crate::services::LikeOutcome;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PairRequest {
    pub user_id: UserId,
    pub target_id: UserId,
}

// --- POST /likes ---

pub async fn like(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PairRequest>,
) -> AppResult<Json<ApiResponse<LikeOutcome>>> {
    let outcome = state.matchmaker.like(req.user_id, req.target_id).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

// --- POST /dislikes ---

pub async fn dislike(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PairRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.matchmaker.dislike(req.user_id, req.target_id).await?;
    Ok(Json(ApiResponse::ok(())))
}

// --- GET /likes/pending/:user_id ---

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    pub limit: Option<i64>,
}

pub async fn pending_likers(
    Path(user_id): Path<UserId>,
    Query(query): Query<PendingQuery>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<LikerSummary>>>> {
    let likers = state.matchmaker.pending_likers(user_id, query.limit).await?;
    Ok(Json(ApiResponse::ok(likers)))
}

// --- POST /likes/pending/:user_id/next ---

pub async fn next_pending_liker(
    Path(user_id): Path<UserId>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Option<LikerSummary>>>> {
    let liker = state.matchmaker.next_pending_liker(user_id).await?;
    Ok(Json(ApiResponse::ok(liker)))
}
