use std::{fs::File, sync::Arc, time::Duration};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{
        email::resend::ResendEmailSender, http::app_state::AppState,
        persistence::PostgresPersistence,
    },
    infra::{
        background_writes::BackgroundWriter,
        config::AppConfig,
        postgres_persistence,
        rate_limit::{RateLimitPolicy, RedisRateLimiter},
        retention::{RETENTION_INTERVAL, RetentionJob, RetentionPolicy},
        settings_refresher::run_settings_refresh_loop,
    },
    use_cases::{
        audit::{AuditLogRepo, AuditTrail},
        settings::{SettingsHandle, SettingsRepo},
        verification::{UserProfileRepo, VerificationTokenStore, VerificationUseCases},
    },
};

/// Everything `main` needs: the router state plus the handles behind the
/// background loops.
pub struct AppRuntime {
    pub state: AppState,
    pub persistence: Arc<PostgresPersistence>,
}

pub async fn init_app_state() -> anyhow::Result<AppRuntime> {
    let config = AppConfig::from_env();

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);

    let rate_limiter = Arc::new(
        RedisRateLimiter::connect(&config.redis_url, RateLimitPolicy::from_config(&config))
            .await?,
    );

    let email = Arc::new(ResendEmailSender::new(
        config.resend_api_key.clone(),
        config.email_from.clone(),
    ));

    // The worker handle is detached; the task lives as long as any writer clone.
    let (writer, _worker) = BackgroundWriter::spawn(config.background_queue_capacity);
    let audit = AuditTrail::new(postgres_arc.clone() as Arc<dyn AuditLogRepo>, writer);

    let settings = SettingsHandle::bootstrap(postgres_arc.as_ref()).await;

    let verification_use_cases = VerificationUseCases::new(
        postgres_arc.clone() as Arc<dyn VerificationTokenStore>,
        postgres_arc.clone() as Arc<dyn UserProfileRepo>,
        email,
        audit,
        settings.clone(),
        config.app_origin.clone(),
    );

    let state = AppState {
        config: Arc::new(config),
        verification_use_cases: Arc::new(verification_use_cases),
        settings,
        rate_limiter,
    };

    Ok(AppRuntime {
        state,
        persistence: postgres_arc,
    })
}

impl AppRuntime {
    pub fn spawn_background_loops(&self) {
        let config = &self.state.config;

        tokio::spawn(run_settings_refresh_loop(
            self.persistence.clone() as Arc<dyn SettingsRepo>,
            self.state.settings.clone(),
            Duration::from_secs(config.settings_refresh_secs.max(1)),
        ));

        let retention = RetentionJob::new(
            self.persistence.clone() as Arc<dyn AuditLogRepo>,
            self.persistence.clone() as Arc<dyn VerificationTokenStore>,
            RetentionPolicy {
                audit_log_days: config.audit_log_retention_days,
                token_hours: config.token_retention_hours,
            },
        );
        tokio::spawn(retention.run(RETENTION_INTERVAL));
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tourney_verify=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don't show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs); skipped if app.log can't be created
    let json_layer = File::create("app.log").ok().map(|file| {
        fmt::layer()
            .json()
            .with_writer(file)
            .with_current_span(true)
            .with_span_list(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
