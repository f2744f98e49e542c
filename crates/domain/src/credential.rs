use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use zeroize::Zeroize;

/// Asymmetric algorithms a subject key pair can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SigningAlgorithm {
    /// ECDSA P-256 with SHA-256
    #[default]
    #[serde(rename = "ES256")]
    Es256,
    /// Ed25519
    #[serde(rename = "EdDSA")]
    EdDsa,
}

impl SigningAlgorithm {
    /// JOSE `alg` header value.
    pub fn as_str(&self) -> &'static str {
        match self {
            SigningAlgorithm::Es256 => "ES256",
            SigningAlgorithm::EdDsa => "EdDSA",
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SigningAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ES256" | "es256" => Ok(SigningAlgorithm::Es256),
            "EdDSA" | "eddsa" | "EDDSA" => Ok(SigningAlgorithm::EdDsa),
            other => Err(format!("Unsupported signing algorithm: {}", other)),
        }
    }
}

/// A registered API client: subject id plus its public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtSubject {
    pub subject_id: Uuid,
    pub algorithm: SigningAlgorithm,
    /// Raw public key bytes (uncompressed SEC1 point for ES256, 32 bytes for EdDSA)
    pub public_key: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful `add`: the only moment the private key exists
/// outside the client.
pub struct IssuedCredential {
    pub subject_id: Uuid,
    pub algorithm: SigningAlgorithm,
    /// PKCS#8 document, PEM armoured
    pub private_key_pem: String,
    pub created_at: DateTime<Utc>,
}

impl Drop for IssuedCredential {
    fn drop(&mut self) {
        self.private_key_pem.zeroize();
    }
}

impl fmt::Debug for IssuedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedCredential")
            .field("subject_id", &self.subject_id)
            .field("algorithm", &self.algorithm)
            .field("private_key_pem", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Where an operation was invoked from.
///
/// Local administration (the CLI on the host) may manage credentials; calls
/// arriving over the control API are `Remote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationContext {
    Local,
    Remote,
}
