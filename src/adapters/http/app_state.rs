use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    application::use_cases::{settings::SettingsHandle, verification::VerificationUseCases},
    infra::{config::AppConfig, rate_limit::RateLimiterTrait},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub verification_use_cases: Arc<VerificationUseCases>,
    pub settings: SettingsHandle,
    pub rate_limiter: Arc<dyn RateLimiterTrait>,
}

impl FromRef<AppState> for Arc<VerificationUseCases> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.verification_use_cases.clone()
    }
}

impl FromRef<AppState> for SettingsHandle {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.settings.clone()
    }
}
