pub mod settings;
pub mod verification;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(verification::router())
        .merge(settings::router())
}
