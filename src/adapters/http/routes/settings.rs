use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};

use crate::{adapters::http::app_state::AppState, application::use_cases::settings::SettingsHandle};

pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(current_settings))
}

/// GET /api/settings
async fn current_settings(State(settings): State<SettingsHandle>) -> impl IntoResponse {
    Json(settings.current())
}
