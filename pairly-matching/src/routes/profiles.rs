use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use pairly_shared::errors::AppResult;
use pairly_shared::types::ApiResponse;

use crate::models::{Interest, InterestId, Profile, ProfileCard, ProfileChanges, UserId};
use crate::profile::ProfileSubmission;
use crate::AppState;

// --- GET /interests ---

pub async fn list_interests(State(state): State<Arc<AppState>>) -> AppResult<Json<ApiResponse<Vec<Interest>>>> {
    let interests = state.matchmaker.list_interests().await?;
    Ok(Json(ApiResponse::ok(interests)))
}

// --- PUT /profiles/:user_id ---

pub async fn submit_profile(
    Path(user_id): Path<UserId>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProfileSubmission>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let profile = state.matchmaker.submit_profile(user_id, payload).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- GET /profiles/:user_id ---

pub async fn get_profile(
    Path(user_id): Path<UserId>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<ProfileCard>>> {
    let card = state.matchmaker.get_profile(user_id).await?;
    Ok(Json(ApiResponse::ok(card)))
}

// --- PATCH /profiles/:user_id ---

pub async fn update_profile(
    Path(user_id): Path<UserId>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProfileChanges>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let profile = state.matchmaker.update_profile(user_id, payload).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- POST /profiles/:user_id/touch ---

#[derive(Debug, Deserialize)]
pub struct TouchRequest {
    #[serde(default)]
    pub alias: Option<String>,
}

pub async fn touch(
    Path(user_id): Path<UserId>,
    State(state): State<Arc<AppState>>,
    payload: Option<Json<TouchRequest>>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let alias = payload.and_then(|Json(req)| req.alias);
    let profile = state.matchmaker.touch(user_id, alias).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- PUT /profiles/:user_id/interests ---

#[derive(Debug, Deserialize)]
pub struct SetInterestsRequest {
    pub interest_ids: Vec<InterestId>,
}

pub async fn set_interests(
    Path(user_id): Path<UserId>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetInterestsRequest>,
) -> AppResult<Json<ApiResponse<Vec<Interest>>>> {
    let interests = state.matchmaker.set_interests(user_id, req.interest_ids).await?;
    Ok(Json(ApiResponse::ok(interests)))
}
