use async_trait::async_trait;
use redis::{Script, aio::ConnectionManager};
use tracing::warn;

use super::{config::AppConfig, error::InfraError};
use crate::app_error::{AppError, AppResult};

/// Fixed-window limits per client IP and per `user_email` cookie.
#[async_trait]
pub trait RateLimiterTrait: Send + Sync {
    /// Ok(()) within limits, Err(AppError::RateLimited) once either bucket overflows.
    async fn check(&self, ip: &str, email: Option<&str>) -> AppResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub window_secs: u64,
    pub max_per_ip: u64,
    pub max_per_email: u64,
}

impl RateLimitPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            window_secs: config.rate_limit_window_secs,
            max_per_ip: config.rate_limit_per_ip,
            max_per_email: config.rate_limit_per_email,
        }
    }
}

pub fn ip_key(ip: &str) -> String {
    format!("verify:rate:ip:{ip}")
}

pub fn email_key(email: &str) -> String {
    format!("verify:rate:email:{}", email.to_lowercase())
}

/// INCR, and start the window on the first hit. A key that somehow lost its
/// TTL gets one again so it cannot pin a client forever.
const INCR_WITH_TTL_SCRIPT: &str = r#"
local current = redis.call('INCR', KEYS[1])
if current == 1 or redis.call('TTL', KEYS[1]) == -1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return current
"#;

#[derive(Clone)]
pub struct RedisRateLimiter {
    manager: ConnectionManager,
    policy: RateLimitPolicy,
    script: Script,
}

impl RedisRateLimiter {
    pub async fn connect(redis_url: &str, policy: RateLimitPolicy) -> Result<Self, InfraError> {
        let client = redis::Client::open(redis_url).map_err(InfraError::RedisConnection)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(InfraError::RedisConnection)?;
        Ok(Self {
            manager,
            policy,
            script: Script::new(INCR_WITH_TTL_SCRIPT),
        })
    }

    async fn hit(&self, conn: &mut ConnectionManager, key: &str, limit: u64) -> AppResult<()> {
        let count: u64 = self
            .script
            .key(key)
            .arg(self.policy.window_secs)
            .invoke_async(conn)
            .await
            .map_err(|e| AppError::Internal(format!("rate limiter: {e}")))?;

        if count > limit {
            warn!(key, count, limit, "Rate limit exceeded");
            return Err(AppError::RateLimited);
        }
        Ok(())
    }
}

#[async_trait]
impl RateLimiterTrait for RedisRateLimiter {
    async fn check(&self, ip: &str, email: Option<&str>) -> AppResult<()> {
        let mut conn = self.manager.clone();
        self.hit(&mut conn, &ip_key(ip), self.policy.max_per_ip)
            .await?;
        if let Some(email) = email {
            self.hit(&mut conn, &email_key(email), self.policy.max_per_email)
                .await?;
        }
        Ok(())
    }
}
