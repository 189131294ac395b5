use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

pub struct AppConfig {
    /// Base URL of the web front end; verification links point at `<app_origin>/verify-email`.
    pub app_origin: Url,
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub redis_url: String,
    pub rate_limit_window_secs: u64,
    pub rate_limit_per_ip: u64,
    pub rate_limit_per_email: u64,
    /// Whether to trust X-Forwarded-For headers. Set to true when behind a reverse proxy.
    /// SECURITY: Only enable this when the API is not directly exposed to the internet.
    pub trust_proxy: bool,
    pub resend_api_key: SecretString,
    pub email_from: String,
    pub settings_refresh_secs: u64,
    pub audit_log_retention_days: i64,
    /// Unset means verification tokens are never swept.
    pub token_retention_hours: Option<i64>,
    pub background_queue_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let app_origin: Url = get_env("APP_ORIGIN");
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let bind_addr: SocketAddr = get_env_default(
            "BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 3001)),
        );
        let database_url: String = get_env("DATABASE_URL");
        let redis_url: String = get_env_default("REDIS_URL", "redis://127.0.0.1:6379".to_string());
        let rate_limit_window_secs: u64 = get_env_default("RATE_LIMIT_WINDOW_SECS", 60);
        let rate_limit_per_ip: u64 = get_env_default("RATE_LIMIT_PER_IP", 60);
        let rate_limit_per_email: u64 = get_env_default("RATE_LIMIT_PER_EMAIL", 30);
        // Default to false for security - must explicitly enable when behind a trusted proxy
        let trust_proxy: bool = get_env_default("TRUST_PROXY", false);

        let resend_api_key = SecretString::new(get_env::<String>("RESEND_API_KEY").into());
        let email_from: String = get_env("EMAIL_FROM");

        let settings_refresh_secs: u64 = get_env_default("SETTINGS_REFRESH_SECS", 30);
        let audit_log_retention_days: i64 = get_env_default("AUDIT_LOG_RETENTION_DAYS", 90);
        let audit_log_retention_days =
            require_positive("AUDIT_LOG_RETENTION_DAYS", audit_log_retention_days)
                .unwrap_or_else(|e| panic!("{e}"));
        let token_retention_hours = optional_retention(
            "TOKEN_RETENTION_HOURS",
            std::env::var("TOKEN_RETENTION_HOURS").ok().as_deref(),
        )
        .unwrap_or_else(|e| panic!("{e}"));
        let background_queue_capacity: usize = get_env_default("BACKGROUND_QUEUE_CAPACITY", 1024);

        Self {
            app_origin,
            cors_origin,
            bind_addr,
            database_url,
            redis_url,
            rate_limit_window_secs,
            rate_limit_per_ip,
            rate_limit_per_email,
            trust_proxy,
            resend_api_key,
            email_from,
            settings_refresh_secs,
            audit_log_retention_days,
            token_retention_hours,
            background_queue_capacity,
        }
    }
}

fn require_positive(name: &str, value: i64) -> Result<i64, String> {
    if value <= 0 {
        return Err(format!("{name} must be a positive number, got {value}"));
    }
    Ok(value)
}

/// Unset or blank means "disabled". Anything else must be a positive integer.
fn optional_retention(name: &str, raw: Option<&str>) -> Result<Option<i64>, String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let value: i64 = raw
        .parse()
        .map_err(|_| format!("{name} must be an integer, got {raw:?}"))?;
    require_positive(name, value).map(Some)
}
