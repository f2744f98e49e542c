use crate::bootstrap::{init_database, open_registry};
use homedns_domain::Config;
use homedns_infrastructure::registry::JsonCredentialRegistry;
use homedns_infrastructure::repositories::SqliteRecordRepository;
use std::sync::Arc;

pub struct Repositories {
    pub records: Arc<SqliteRecordRepository>,
    pub registry: Arc<JsonCredentialRegistry>,
}

impl Repositories {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let pool = init_database(&config.database).await?;
        let registry = open_registry(&config.jwt).await?;

        Ok(Self {
            records: Arc::new(SqliteRecordRepository::new(pool)),
            registry,
        })
    }
}
