use crate::ports::CredentialRepository;
use homedns_domain::DomainError;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

pub struct RemoveCredentialUseCase {
    registry: Arc<dyn CredentialRepository>,
}

impl RemoveCredentialUseCase {
    pub fn new(registry: Arc<dyn CredentialRepository>) -> Self {
        Self { registry }
    }

    /// Idempotent: an unknown subject yields `Ok(false)`.
    #[instrument(skip(self))]
    pub async fn execute(&self, subject_id: &Uuid) -> Result<bool, DomainError> {
        let removed = self.registry.remove(subject_id).await?;
        if removed {
            info!(subject = %subject_id, "Credential removed");
        } else {
            debug!(subject = %subject_id, "Credential not registered");
        }
        Ok(removed)
    }
}
