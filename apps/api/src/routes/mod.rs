pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::training::handlers;
use crate::voice;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Progress API
        .route(
            "/api/v1/progress",
            get(handlers::handle_get_progress).post(handlers::handle_update_progress),
        )
        .route(
            "/api/v1/progress/answer",
            post(handlers::handle_select_answer),
        )
        // Transcript analysis (module generation)
        .route(
            "/api/v1/transcript/analyze",
            post(handlers::handle_analyze_transcript),
        )
        // Coaching chat + post-completion analysis
        .route("/api/v1/coach/chat", post(handlers::handle_coach_chat))
        .route(
            "/api/v1/coach/analysis",
            post(handlers::handle_coach_analysis),
        )
        // Voice agent signed URLs
        .route("/api/v1/signed-url", get(voice::handle_signed_url))
        .with_state(state)
}
