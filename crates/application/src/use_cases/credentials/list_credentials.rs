use crate::ports::CredentialRepository;
use homedns_domain::{DomainError, JwtSubject};
use std::sync::Arc;

pub struct ListCredentialsUseCase {
    registry: Arc<dyn CredentialRepository>,
}

impl ListCredentialsUseCase {
    pub fn new(registry: Arc<dyn CredentialRepository>) -> Self {
        Self { registry }
    }

    /// Subjects ordered by creation time, oldest first.
    pub async fn execute(&self) -> Result<Vec<JwtSubject>, DomainError> {
        let mut subjects = self.registry.list().await?;
        subjects.sort_by_key(|s| s.created_at);
        Ok(subjects)
    }
}
