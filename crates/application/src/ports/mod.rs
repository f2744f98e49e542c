mod cache_invalidator;
mod cache_maintenance;
mod credential_repository;
mod record_repository;

pub use cache_invalidator::{CacheInvalidator, NoopCacheInvalidator};
pub use cache_maintenance::CacheMaintenance;
pub use credential_repository::CredentialRepository;
pub use record_repository::RecordRepository;
