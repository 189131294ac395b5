//! Test app state builder for HTTP-level testing.
//!
//! `TestAppStateBuilder` creates an `AppState` backed by in-memory mocks and
//! hands the mocks back alongside it for assertions.

use std::{net::SocketAddr, sync::Arc};

use axum::http::HeaderValue;
use secrecy::SecretString;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    domain::entities::{app_settings::AppSettings, verification_token::VerificationToken},
    infra::{background_writes::BackgroundWriter, config::AppConfig, rate_limit::RateLimiterTrait},
    test_utils::{
        InMemoryAuditLogRepo, InMemoryEmailSender, InMemoryRateLimiter, InMemoryUserProfileRepo,
        InMemoryVerificationTokenStore, TEST_APP_ORIGIN,
    },
    use_cases::{
        audit::AuditTrail, settings::SettingsHandle, verification::VerificationUseCases,
    },
};

/// A built `AppState` plus handles to the mocks behind it.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<InMemoryVerificationTokenStore>,
    pub email: Arc<InMemoryEmailSender>,
    pub profiles: Arc<InMemoryUserProfileRepo>,
    pub audit_repo: Arc<InMemoryAuditLogRepo>,
}

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let record = create_test_token(|t| t.user_id = "u7".into());
/// let app = TestAppStateBuilder::new().with_token(record).build();
/// let server = TestServer::new(router().with_state(app.state)).unwrap();
/// ```
pub struct TestAppStateBuilder {
    tokens: Vec<VerificationToken>,
    profiles: Vec<(String, String)>,
    settings: AppSettings,
    rate_limits: Option<(u64, u64)>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            tokens: vec![],
            profiles: vec![("u1".to_string(), "a@b.com".to_string())],
            settings: AppSettings::default(),
            rate_limits: None,
        }
    }

    /// Seed the token store.
    pub fn with_token(mut self, token: VerificationToken) -> Self {
        self.tokens.push(token);
        self
    }

    /// Add a user profile. `u1` / `a@b.com` is always present.
    pub fn with_profile(mut self, user_id: &str, email: &str) -> Self {
        self.profiles.push((user_id.to_string(), email.to_string()));
        self
    }

    pub fn with_site_name(mut self, site_name: &str) -> Self {
        self.settings.site_name = site_name.to_string();
        self
    }

    pub fn with_settings(mut self, settings: AppSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Same cap per IP and per email. Unlimited when unset.
    pub fn with_rate_limit(self, max_requests: u64) -> Self {
        self.with_rate_limits(max_requests, max_requests)
    }

    pub fn with_rate_limits(mut self, per_ip: u64, per_email: u64) -> Self {
        self.rate_limits = Some((per_ip, per_email));
        self
    }

    /// Build the state. Must run inside a tokio runtime.
    pub fn build(self) -> TestApp {
        let store = Arc::new(InMemoryVerificationTokenStore::with_tokens(self.tokens));
        let email = Arc::new(InMemoryEmailSender::new());
        let profiles = Arc::new(InMemoryUserProfileRepo::new());
        for (user_id, email) in &self.profiles {
            profiles.insert(user_id, email);
        }
        let audit_repo = Arc::new(InMemoryAuditLogRepo::new());
        let settings = SettingsHandle::new(self.settings);
        let (writer, _worker) = BackgroundWriter::spawn(64);

        // Create minimal config for testing
        let config = Arc::new(AppConfig {
            app_origin: Url::parse(TEST_APP_ORIGIN).unwrap(),
            cors_origin: HeaderValue::from_static(TEST_APP_ORIGIN),
            bind_addr: "127.0.0.1:3001".parse::<SocketAddr>().unwrap(),
            database_url: String::new(),
            redis_url: String::new(),
            rate_limit_window_secs: 60,
            rate_limit_per_ip: 60,
            rate_limit_per_email: 30,
            trust_proxy: false,
            resend_api_key: SecretString::new("test_resend_key".into()),
            email_from: "noreply@tourney.test".to_string(),
            settings_refresh_secs: 30,
            audit_log_retention_days: 90,
            token_retention_hours: None,
            background_queue_capacity: 64,
        });

        let verification_use_cases = VerificationUseCases::new(
            store.clone(),
            profiles.clone(),
            email.clone(),
            AuditTrail::new(audit_repo.clone(), writer),
            settings.clone(),
            config.app_origin.clone(),
        );

        let rate_limiter: Arc<dyn RateLimiterTrait> = match self.rate_limits {
            Some((per_ip, per_email)) => Arc::new(InMemoryRateLimiter::new(per_ip, per_email)),
            None => Arc::new(InMemoryRateLimiter::permissive()),
        };

        let state = AppState {
            config,
            verification_use_cases: Arc::new(verification_use_cases),
            settings,
            rate_limiter,
        };

        TestApp {
            state,
            store,
            email,
            profiles,
            audit_repo,
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
