use async_trait::async_trait;
use homedns_domain::{DnsRecord, DomainError, RecordType};

/// Persistent store of authoritative records.
///
/// Names passed in are already normalised. Every multi-row change must be
/// applied atomically: a concurrent reader sees either the old record set
/// or the new one, never a mix.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Returns the record set for `(name, record_type)`.
    ///
    /// # Returns
    ///
    /// * `Ok(vec![])` - If nothing is stored for the key (absence is not an error)
    /// * `Err(DomainError::DatabaseError)` - If the store cannot be read
    async fn get(&self, name: &str, record_type: RecordType)
        -> Result<Vec<DnsRecord>, DomainError>;

    /// Returns every record owned by `name`, whatever its type.
    async fn get_by_name(&self, name: &str) -> Result<Vec<DnsRecord>, DomainError>;

    /// Lists records, optionally restricted to names containing `search`.
    async fn list(&self, search: Option<&str>) -> Result<Vec<DnsRecord>, DomainError>;

    /// Adds one record to the set for its key.
    ///
    /// # Errors
    ///
    /// * `DomainError::DuplicateRecord` - If the exact `(name, type, value)` row exists
    /// * `DomainError::DatabaseError` - If a database error occurs
    async fn create(&self, record: &DnsRecord) -> Result<DnsRecord, DomainError>;

    /// Replaces the whole set for the record's key with this single record.
    ///
    /// # Errors
    ///
    /// * `DomainError::RecordNotFound` - If nothing is stored for the key
    /// * `DomainError::DatabaseError` - If a database error occurs
    async fn update(&self, record: &DnsRecord) -> Result<DnsRecord, DomainError>;

    /// Like `update`, but creates the set when it does not exist.
    async fn upsert(&self, record: &DnsRecord) -> Result<DnsRecord, DomainError>;

    /// Removes the whole set for `(name, record_type)`; returns the row count.
    async fn delete(&self, name: &str, record_type: RecordType) -> Result<u64, DomainError>;
}
