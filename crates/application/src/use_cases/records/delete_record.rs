use super::invalidate_for;
use crate::ports::{CacheInvalidator, RecordRepository};
use homedns_domain::validators::normalize_name;
use homedns_domain::{DomainError, RecordType};
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct DeleteRecordUseCase {
    record_repo: Arc<dyn RecordRepository>,
    cache: Arc<dyn CacheInvalidator>,
}

impl DeleteRecordUseCase {
    pub fn new(record_repo: Arc<dyn RecordRepository>, cache: Arc<dyn CacheInvalidator>) -> Self {
        Self { record_repo, cache }
    }

    /// Removes the record set; returns how many rows went away.
    #[instrument(skip(self))]
    pub async fn execute(&self, name: &str, record_type: RecordType) -> Result<u64, DomainError> {
        let name = normalize_name(name)?;
        let removed = self.record_repo.delete(&name, record_type).await?;

        if removed == 0 {
            debug!(name = %name, record_type = %record_type, "Nothing to delete");
            return Ok(0);
        }

        invalidate_for(self.cache.as_ref(), &name, record_type);
        info!(name = %name, record_type = %record_type, removed, "Record set deleted");

        Ok(removed)
    }
}
