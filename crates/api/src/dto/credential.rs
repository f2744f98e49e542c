use homedns_domain::{JwtSubject, SigningAlgorithm};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered subject as shown to API callers; the public key is left out.
#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialResponse {
    pub subject_id: Uuid,
    pub algorithm: SigningAlgorithm,
    pub created_at: String,
}

impl From<JwtSubject> for CredentialResponse {
    fn from(subject: JwtSubject) -> Self {
        Self {
            subject_id: subject.subject_id,
            algorithm: subject.algorithm,
            created_at: subject.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemovedCredentialResponse {
    pub removed: bool,
}
