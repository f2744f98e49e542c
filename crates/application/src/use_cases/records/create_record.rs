use super::{invalidate_record, RecordPolicy};
use crate::ports::{CacheInvalidator, RecordRepository};
use homedns_domain::{DnsRecord, DomainError, RecordType};
use std::sync::Arc;
use tracing::{info, instrument};

/// Adds a value to the record set for a name and type.
pub struct CreateRecordUseCase {
    record_repo: Arc<dyn RecordRepository>,
    cache: Arc<dyn CacheInvalidator>,
    policy: RecordPolicy,
}

impl CreateRecordUseCase {
    pub fn new(
        record_repo: Arc<dyn RecordRepository>,
        cache: Arc<dyn CacheInvalidator>,
        policy: RecordPolicy,
    ) -> Self {
        Self {
            record_repo,
            cache,
            policy,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self,
        name: &str,
        record_type: RecordType,
        value: &str,
        ttl: Option<u32>,
    ) -> Result<DnsRecord, DomainError> {
        let record = self.policy.prepare(name, record_type, value, ttl)?;
        let stored = self.record_repo.create(&record).await?;
        invalidate_record(self.cache.as_ref(), &stored);

        info!(
            name = %stored.name,
            record_type = %stored.record_type,
            value = %stored.value,
            ttl = stored.ttl,
            "Record created"
        );

        Ok(stored)
    }
}
