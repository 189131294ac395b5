use thiserror::Error;

/// Startup failures. Display text is safe to print; the `#[source]` chain can
/// carry connection strings, so log these with `%e`, never `?e`.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("could not connect to Postgres (check DATABASE_URL)")]
    DatabaseConnection(#[source] sqlx::Error),

    #[error("could not apply database migrations")]
    Migration(#[source] sqlx::migrate::MigrateError),

    #[error("could not connect to Redis (check REDIS_URL)")]
    RedisConnection(#[source] redis::RedisError),

    #[error("could not bind the listen address (check BIND_ADDR)")]
    TcpBind(#[source] std::io::Error),

    #[error("HTTP server stopped unexpectedly")]
    Server(#[source] std::io::Error),
}
