use super::{invalidate_record, RecordPolicy};
use crate::ports::{CacheInvalidator, RecordRepository};
use homedns_domain::{DnsRecord, DomainError, RecordType};
use std::sync::Arc;
use tracing::{info, instrument};

/// Makes the record set for a name and type exactly one record, creating it
/// if needed. Calling it twice with the same input is a no-op the second time.
pub struct UpsertRecordUseCase {
    record_repo: Arc<dyn RecordRepository>,
    cache: Arc<dyn CacheInvalidator>,
    policy: RecordPolicy,
}

impl UpsertRecordUseCase {
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
        let stored = self.record_repo.upsert(&record).await?;
        invalidate_record(self.cache.as_ref(), &stored);

        info!(
            name = %stored.name,
            record_type = %stored.record_type,
            value = %stored.value,
            ttl = stored.ttl,
            "Record upserted"
        );

        Ok(stored)
    }
}
