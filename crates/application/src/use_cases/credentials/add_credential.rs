use crate::ports::CredentialRepository;
use crate::services::jwt::{encode_private_key_pem, KeyPairGenerator};
use chrono::Utc;
use homedns_domain::{
    DomainError, InvocationContext, IssuedCredential, JwtSubject, SigningAlgorithm,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

const MAX_ID_ATTEMPTS: usize = 8;

/// Registers a new subject and discloses its private key once.
///
/// Only local administration may call this; the control API always gets
/// `AccessDenied`.
pub struct AddCredentialUseCase {
    registry: Arc<dyn CredentialRepository>,
    generator: KeyPairGenerator,
}

impl AddCredentialUseCase {
    pub fn new(registry: Arc<dyn CredentialRepository>) -> Self {
        Self {
            registry,
            generator: KeyPairGenerator::new(),
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self,
        context: InvocationContext,
        algorithm: SigningAlgorithm,
    ) -> Result<IssuedCredential, DomainError> {
        if context != InvocationContext::Local {
            warn!("Rejected remote attempt to add a credential");
            return Err(DomainError::AccessDenied(
                "credentials can only be added by local administration".to_string(),
            ));
        }

        let subject_id = self.fresh_subject_id().await?;
        let pair = self.generator.generate(algorithm)?;
        let created_at = Utc::now();

        self.registry
            .insert(JwtSubject {
                subject_id,
                algorithm,
                public_key: pair.public_key.clone(),
                created_at,
            })
            .await?;

        info!(subject = %subject_id, algorithm = %algorithm, "Credential added");

        Ok(IssuedCredential {
            subject_id,
            algorithm,
            private_key_pem: encode_private_key_pem(&pair.pkcs8_der),
            created_at,
        })
    }

    async fn fresh_subject_id(&self) -> Result<Uuid, DomainError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = Uuid::new_v4();
            if !self.registry.is_known(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(DomainError::RegistryError(
            "could not allocate an unused subject id".to_string(),
        ))
    }
}
