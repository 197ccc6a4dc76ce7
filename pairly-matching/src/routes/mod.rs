pub mod broadcasts;
pub mod browse;
pub mod health;
pub mod likes;
pub mod moderation;
pub mod profiles;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        // Profiles and interests
        .route("/interests", get(profiles::list_interests))
        .route(
            "/profiles/:user_id",
            put(profiles::submit_profile)
                .get(profiles::get_profile)
                .patch(profiles::update_profile),
        )
        .route("/profiles/:user_id/touch", post(profiles::touch))
        .route("/profiles/:user_id/interests", put(profiles::set_interests))
        // Browsing
        .route("/browse/:user_id", post(browse::start_browsing))
        .route("/browse/:user_id/next", post(browse::next_candidate))
        .route("/browse/:user_id/react", post(browse::react))
        // Likes
        .route("/likes", post(likes::like))
        .route("/dislikes", post(likes::dislike))
        .route("/likes/pending/:user_id", get(likes::pending_likers))
        .route("/likes/pending/:user_id/next", post(likes::next_pending_liker))
        // Moderation
        .route("/reports", post(moderation::report))
        .route("/blocks", post(moderation::block))
        // Broadcasts
        .route("/broadcasts", post(broadcasts::request_broadcast))
        .route("/broadcasts/:id/approve", post(broadcasts::approve_broadcast))
        .route("/broadcasts/:id/decline", post(broadcasts::decline_broadcast))
        .layer(middleware::from_fn(pairly_shared::middleware::metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
