use async_trait::async_trait;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::app_settings::AppSettings,
    use_cases::settings::SettingsRepo,
};

#[async_trait]
impl SettingsRepo for PostgresPersistence {
    async fn load(&self) -> AppResult<Option<AppSettings>> {
        let rec = sqlx::query_as::<_, AppSettings>(
            "SELECT site_name, registration_open, email_verification_required FROM app_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rec)
    }
}
