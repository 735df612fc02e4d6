use crate::backend::BackendKind;
use crate::errors::AppError;
use crate::models::{DisplaySnapshot, LanguageRequest, SwitchBackendRequest};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{extract::State, http::StatusCode, response::Html, Json};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.display.snapshot()))
}

pub async fn get_stats(State(state): State<AppState>) -> Json<DisplaySnapshot> {
    Json(state.display.snapshot())
}

pub async fn reload_stats(State(state): State<AppState>) -> Json<DisplaySnapshot> {
    state.tracker.load_all_stats().await;
    Json(state.display.snapshot())
}

pub async fn switch_backend(
    State(state): State<AppState>,
    Json(payload): Json<SwitchBackendRequest>,
) -> Result<Json<DisplaySnapshot>, AppError> {
    let kind = BackendKind::parse(&payload.backend)
        .ok_or_else(|| AppError::unknown_backend(payload.backend.trim()))?;

    state.tracker.switch_backend(kind).await;
    Ok(Json(state.display.snapshot()))
}

pub async fn track_language(
    State(state): State<AppState>,
    Json(payload): Json<LanguageRequest>,
) -> StatusCode {
    state.tracker.track_language_change(&payload.lang).await;
    StatusCode::NO_CONTENT
}

pub async fn track_discord(State(state): State<AppState>) -> StatusCode {
    state.tracker.track_discord_click().await;
    StatusCode::NO_CONTENT
}
