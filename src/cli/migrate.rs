//! Migrate command - applies pending database migrations and exits

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::{AppConfig, StorageBackend};
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::storage::run_storage_migrations;

/// Apply pending migrations against the configured Postgres database
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    init_logging(&config.logging);

    if config.storage.backend != StorageBackend::Postgres {
        anyhow::bail!("migrate requires storage.backend = postgres");
    }

    let database_url = config
        .storage
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("storage.database_url is required for the postgres backend"))?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url)
        .await?;

    run_storage_migrations(&pool).await?;
    info!("Migrations applied");

    Ok(())
}
