mod create_record;
mod delete_record;
mod get_records;
mod policy;
mod update_record;
mod upsert_record;

pub use create_record::CreateRecordUseCase;
pub use delete_record::DeleteRecordUseCase;
pub use get_records::GetRecordsUseCase;
pub use policy::RecordPolicy;
pub use update_record::UpdateRecordUseCase;
pub use upsert_record::UpsertRecordUseCase;

use crate::ports::CacheInvalidator;
use homedns_domain::{DnsQuery, DnsRecord, RecordType};

pub(crate) fn invalidate_for(cache: &dyn CacheInvalidator, name: &str, record_type: RecordType) {
    if record_type == RecordType::CNAME {
        cache.invalidate_name(name);
    } else {
        cache.invalidate(&DnsQuery::new(name, record_type));
    }
}

pub(crate) fn invalidate_record(cache: &dyn CacheInvalidator, record: &DnsRecord) {
    invalidate_for(cache, &record.name, record.record_type);
}
