use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/stats/reload", post(handlers::reload_stats))
        .route("/api/backend", post(handlers::switch_backend))
        .route("/api/track/language", post(handlers::track_language))
        .route("/api/track/discord", post(handlers::track_discord))
        .with_state(state)
}
