pub mod cache;
pub mod credential;
pub mod record;

pub use cache::CacheStatsResponse;
pub use credential::{CredentialResponse, RemovedCredentialResponse};
pub use record::{DeletedRecordsResponse, RecordRequest, RecordResponse, RecordSearchQuery};
