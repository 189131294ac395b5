use std::{sync::Arc, time::Duration};

use url::Url;

use crate::{
    domain::entities::{app_settings::AppSettings, audit_entry::AuditAction},
    infra::background_writes::BackgroundWriter,
    test_utils::{
        InMemoryAuditLogRepo, InMemoryEmailSender, InMemoryUserProfileRepo,
        InMemoryVerificationTokenStore,
    },
    use_cases::{
        audit::AuditTrail, settings::SettingsHandle, verification::VerificationUseCases,
    },
};

pub const TEST_APP_ORIGIN: &str = "http://localhost:3000";

/// `VerificationUseCases` wired to in-memory collaborators that stay reachable
/// for assertions. Profile `u1` / `a@b.com` exists. Must be built inside a tokio runtime (the audit writer spawns).
pub struct VerificationFixture {
    pub use_cases: VerificationUseCases,
    pub store: Arc<InMemoryVerificationTokenStore>,
    pub profiles: Arc<InMemoryUserProfileRepo>,
    pub email: Arc<InMemoryEmailSender>,
    pub settings: SettingsHandle,
    pub audit_repo: Arc<InMemoryAuditLogRepo>,
    pub writer: BackgroundWriter,
}

impl VerificationFixture {
    pub fn new() -> Self {
        Self::with_store(InMemoryVerificationTokenStore::new())
    }

    pub fn with_store(store: InMemoryVerificationTokenStore) -> Self {
        let store = Arc::new(store);
        let profiles = Arc::new(InMemoryUserProfileRepo::new());
        profiles.insert("u1", "a@b.com");
        let email = Arc::new(InMemoryEmailSender::new());
        let audit_repo = Arc::new(InMemoryAuditLogRepo::new());
        let settings = SettingsHandle::new(AppSettings::default());
        let (writer, _worker) = BackgroundWriter::spawn(64);

        let use_cases = VerificationUseCases::new(
            store.clone(),
            profiles.clone(),
            email.clone(),
            AuditTrail::new(audit_repo.clone(), writer.clone()),
            settings.clone(),
            Url::parse(TEST_APP_ORIGIN).unwrap(),
        );

        Self {
            use_cases,
            store,
            profiles,
            email,
            settings,
            audit_repo,
            writer,
        }
    }

    /// Polls the audit repo until `count` entries landed, in write order.
    pub async fn wait_for_audit(&self, count: usize) -> Vec<AuditAction> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let entries = self.audit_repo.entries();
            if entries.len() >= count || tokio::time::Instant::now() >= deadline {
                return entries.into_iter().map(|e| e.action).collect();
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl Default for VerificationFixture {
    fn default() -> Self {
        Self::new()
    }
}
