use crate::ports::RecordRepository;
use homedns_domain::validators::normalize_name;
use homedns_domain::{DnsRecord, DomainError, RecordType};
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct GetRecordsUseCase {
    record_repo: Arc<dyn RecordRepository>,
}

impl GetRecordsUseCase {
    pub fn new(record_repo: Arc<dyn RecordRepository>) -> Self {
        Self { record_repo }
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<DnsRecord>, DomainError> {
        let name = normalize_name(name)?;
        self.record_repo.get(&name, record_type).await
    }

    #[instrument(skip(self))]
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<DnsRecord>, DomainError> {
        let search = search
            .map(|s| s.trim().trim_end_matches('.').to_lowercase())
            .filter(|s| !s.is_empty());
        let records = self.record_repo.list(search.as_deref()).await?;
        debug!(count = records.len(), "Records listed");
        Ok(records)
    }
}
