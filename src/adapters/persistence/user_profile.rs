use async_trait::async_trait;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    use_cases::verification::UserProfileRepo,
};

#[async_trait]
impl UserProfileRepo for PostgresPersistence {
    async fn mark_email_verified(&self, user_id: &str, email: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"UPDATE user_profiles
               SET email_verified = TRUE, updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND email = $2"#,
        )
        .bind(user_id)
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
