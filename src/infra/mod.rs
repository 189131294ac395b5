use crate::{adapters::persistence::PostgresPersistence, infra::db::init_db};

pub mod app;
pub mod background_writes;
pub mod config;
pub mod db;
pub mod error;
pub mod http_client;
pub mod rate_limit;
pub mod retention;
pub mod settings_refresher;
pub mod setup;

pub use error::InfraError;

pub async fn postgres_persistence(database_url: &str) -> anyhow::Result<PostgresPersistence> {
    let pool = init_db(database_url).await?;
    let persistence = PostgresPersistence::new(pool);
    Ok(persistence)
}
