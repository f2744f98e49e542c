use async_trait::async_trait;
use homedns_domain::{DomainError, JwtSubject};
use uuid::Uuid;

/// Registry of subjects allowed to call the control API.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Persists a new subject.
    ///
    /// # Errors
    ///
    /// * `DomainError::RegistryError` - If the id was ever used before
    /// * `DomainError::IoError` - If the registry file cannot be written
    async fn insert(&self, subject: JwtSubject) -> Result<(), DomainError>;

    async fn get(&self, subject_id: &Uuid) -> Result<Option<JwtSubject>, DomainError>;

    async fn list(&self) -> Result<Vec<JwtSubject>, DomainError>;

    /// Deletes a subject and retires its id.
    ///
    /// Returns `false` when the subject was not registered.
    async fn remove(&self, subject_id: &Uuid) -> Result<bool, DomainError>;

    /// True for live subjects and for ids that were removed earlier.
    async fn is_known(&self, subject_id: &Uuid) -> Result<bool, DomainError>;

    /// Re-reads the backing store if it changed outside this process.
    /// Returns whether a reload happened.
    async fn reload_if_changed(&self) -> Result<bool, DomainError>;
}
