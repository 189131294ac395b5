use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::{
    app_error::AppResult,
    domain::entities::audit_entry::{AuditAction, AuditEntry},
    infra::background_writes::BackgroundWriter,
};

#[async_trait]
pub trait AuditLogRepo: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> AppResult<()>;
    async fn delete_older_than(&self, cutoff: NaiveDateTime) -> AppResult<u64>;
}

/// Audit entries are non-critical: they go through the background queue and
/// their failures surface on the writer's failure channel, not to the caller.
#[derive(Clone)]
pub struct AuditTrail {
    repo: Arc<dyn AuditLogRepo>,
    writer: BackgroundWriter,
}

impl AuditTrail {
    pub fn new(repo: Arc<dyn AuditLogRepo>, writer: BackgroundWriter) -> Self {
        Self { repo, writer }
    }

    pub fn record(&self, action: AuditAction, subject: Option<&str>, detail: serde_json::Value) {
        let entry = AuditEntry::new(action, subject, detail);
        let repo = self.repo.clone();
        self.writer
            .dispatch(action.as_str(), async move { repo.record(&entry).await });
    }
}
