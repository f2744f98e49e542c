use anyhow::Context;
use homedns_domain::config::DatabaseConfig;
use homedns_infrastructure::database::{create_pool, run_migrations};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{error, info};

/// Opens the record store and applies migrations. Any failure here aborts
/// start-up: the server must not answer authoritatively without its store.
pub async fn init_database(cfg: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
    let database_url = cfg.url();
    info!(url = %database_url, "Initializing database");

    if let Some(parent) = Path::new(cfg.path.trim_start_matches("sqlite:")).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
    }

    let pool = create_pool(&database_url).await.map_err(|e| {
        error!(error = %e, "Failed to open record store");
        anyhow::anyhow!(e)
    })?;

    run_migrations(&pool).await.map_err(|e| {
        error!(error = %e, "Failed to migrate record store");
        anyhow::anyhow!(e)
    })?;

    info!("Database initialized successfully");
    Ok(pool)
}
