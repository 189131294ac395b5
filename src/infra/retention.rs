use std::{sync::Arc, time::Duration};

use chrono::{NaiveDateTime, Utc};
use tracing::{info, warn};

use crate::{
    app_error::AppResult,
    use_cases::{audit::AuditLogRepo, verification::VerificationTokenStore},
};

pub const RETENTION_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub audit_log_days: i64,
    /// `None` leaves verification tokens alone.
    pub token_hours: Option<i64>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RetentionReport {
    pub audit_entries_deleted: u64,
    pub tokens_deleted: u64,
}

pub struct RetentionJob {
    audit: Arc<dyn AuditLogRepo>,
    tokens: Arc<dyn VerificationTokenStore>,
    policy: RetentionPolicy,
}

impl RetentionJob {
    pub fn new(
        audit: Arc<dyn AuditLogRepo>,
        tokens: Arc<dyn VerificationTokenStore>,
        policy: RetentionPolicy,
    ) -> Self {
        Self {
            audit,
            tokens,
            policy,
        }
    }

    pub async fn sweep(&self, now: NaiveDateTime) -> AppResult<RetentionReport> {
        let mut report = RetentionReport::default();

        let audit_cutoff = now - chrono::Duration::days(self.policy.audit_log_days);
        report.audit_entries_deleted = self.audit.delete_older_than(audit_cutoff).await?;

        if let Some(hours) = self.policy.token_hours {
            let token_cutoff = now - chrono::Duration::hours(hours);
            report.tokens_deleted = self.tokens.delete_expired_before(token_cutoff).await?;
        }

        Ok(report)
    }

    pub async fn run(self, period: Duration) {
        info!(policy = ?self.policy, "Retention loop started");
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            match self.sweep(Utc::now().naive_utc()).await {
                Ok(report) => info!(
                    audit_entries_deleted = report.audit_entries_deleted,
                    tokens_deleted = report.tokens_deleted,
                    "Retention sweep done"
                ),
                Err(e) => warn!(error = %e, "Retention sweep failed"),
            }
        }
    }
}
