use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::audit_entry::AuditEntry,
    use_cases::audit::AuditLogRepo,
};

#[async_trait]
impl AuditLogRepo for PostgresPersistence {
    async fn record(&self, entry: &AuditEntry) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO audit_logs (id, action, subject, detail, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(entry.id)
        .bind(entry.action.as_str())
        .bind(entry.subject.as_deref())
        .bind(&entry.detail)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    async fn delete_older_than(&self, cutoff: NaiveDateTime) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM audit_logs WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected())
    }
}
