use super::claims::{Audience, Claims, Header};
use super::keys::decode_private_key_pem;
use super::b64url_encode;
use chrono::{DateTime, Duration, Utc};
use homedns_domain::{DomainError, SigningAlgorithm};
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, Ed25519KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING};
use uuid::Uuid;

enum SigningKey {
    Es256(EcdsaKeyPair),
    EdDsa(Ed25519KeyPair),
}

/// Client-side token minting with a subject's private key.
pub struct TokenSigner {
    key: SigningKey,
    rng: SystemRandom,
}

impl TokenSigner {
    /// Loads a PKCS#8 document; the algorithm is inferred from the key.
    pub fn from_pkcs8(pkcs8_der: &[u8]) -> Result<Self, DomainError> {
        let rng = SystemRandom::new();
        let key = if let Ok(pair) =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8_der, &rng)
        {
            SigningKey::Es256(pair)
        } else {
            let pair = Ed25519KeyPair::from_pkcs8(pkcs8_der).map_err(|e| {
                DomainError::CryptoError(format!("unsupported private key: {}", e))
            })?;
            SigningKey::EdDsa(pair)
        };
        Ok(Self { key, rng })
    }

    pub fn from_pem(pem: &str) -> Result<Self, DomainError> {
        Self::from_pkcs8(&decode_private_key_pem(pem)?)
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        match self.key {
            SigningKey::Es256(_) => SigningAlgorithm::Es256,
            SigningKey::EdDsa(_) => SigningAlgorithm::EdDsa,
        }
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, DomainError> {
        let header = Header {
            alg: self.algorithm().as_str().to_string(),
            typ: Some("JWT".to_string()),
        };
        let header_json = serde_json::to_vec(&header)
            .map_err(|e| DomainError::CryptoError(e.to_string()))?;
        let claims_json = serde_json::to_vec(claims)
            .map_err(|e| DomainError::CryptoError(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            b64url_encode(&header_json),
            b64url_encode(&claims_json)
        );

        let signature = match &self.key {
            SigningKey::Es256(pair) => pair
                .sign(&self.rng, signing_input.as_bytes())
                .map_err(|_| DomainError::CryptoError("ECDSA signing failed".into()))?
                .as_ref()
                .to_vec(),
            SigningKey::EdDsa(pair) => pair.sign(signing_input.as_bytes()).as_ref().to_vec(),
        };

        Ok(format!("{}.{}", signing_input, b64url_encode(&signature)))
    }

    /// Signs a token with the standard claim set, valid from `now` for
    /// `lifetime`.
    pub fn issue(
        &self,
        subject_id: Uuid,
        issuer: &str,
        audience: &[String],
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<String, DomainError> {
        let aud = match audience {
            [single] => Audience::One(single.clone()),
            many => Audience::Many(many.to_vec()),
        };
        let claims = Claims {
            sub: subject_id.to_string(),
            iss: Some(issuer.to_string()),
            aud: Some(aud),
            iat: Some(now.timestamp()),
            nbf: Some(now.timestamp()),
            exp: Some((now + lifetime).timestamp()),
        };
        self.sign(&claims)
    }
}
