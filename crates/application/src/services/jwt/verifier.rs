use super::b64url_decode;
use super::claims::{Claims, Header};
use crate::ports::CredentialRepository;
use chrono::{DateTime, Utc};
use homedns_domain::config::{JwtConfig, JwtVerifyOptions};
use homedns_domain::{AuthError, SigningAlgorithm};
use ring::signature::{UnparsedPublicKey, ECDSA_P256_SHA256_FIXED, ED25519};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Expected claim values and check switches.
#[derive(Debug, Clone)]
pub struct VerifierSettings {
    pub algorithms: Vec<SigningAlgorithm>,
    pub issuer: String,
    pub audience: Vec<String>,
    pub leeway_secs: i64,
    pub options: JwtVerifyOptions,
}

impl From<&JwtConfig> for VerifierSettings {
    fn from(config: &JwtConfig) -> Self {
        Self {
            algorithms: config.algorithms.clone(),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            leeway_secs: i64::try_from(config.leeway).unwrap_or(i64::MAX),
            options: config.options,
        }
    }
}

/// Identity established by a valid token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedSubject {
    pub subject_id: Uuid,
}

struct ParsedToken<'a> {
    header: Header,
    algorithm: SigningAlgorithm,
    claims: Claims,
    signing_input: &'a str,
    signature: Vec<u8>,
}

/// Checks bearer tokens against the credential registry.
///
/// The registry is consulted on every call, so removing a subject takes
/// effect for the next request even if the client still holds an
/// unexpired token.
pub struct TokenVerifier {
    registry: Arc<dyn CredentialRepository>,
    settings: VerifierSettings,
}

impl TokenVerifier {
    pub fn new(registry: Arc<dyn CredentialRepository>, settings: VerifierSettings) -> Self {
        Self { registry, settings }
    }

    pub fn settings(&self) -> &VerifierSettings {
        &self.settings
    }

    pub async fn verify(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedSubject, AuthError> {
        let parsed = self.parse(token)?;

        let subject_id =
            Uuid::parse_str(&parsed.claims.sub).map_err(|_| AuthError::UnknownSubject)?;
        let subject = match self.registry.get(&subject_id).await {
            Ok(Some(subject)) => subject,
            Ok(None) => return Err(AuthError::UnknownSubject),
            Err(e) => {
                warn!(error = %e, subject = %subject_id, "Credential registry lookup failed");
                return Err(AuthError::UnknownSubject);
            }
        };

        if subject.algorithm != parsed.algorithm {
            debug!(
                subject = %subject_id,
                registered = %subject.algorithm,
                presented = %parsed.header.alg,
                "Token algorithm differs from registered key"
            );
            return Err(AuthError::InvalidSignature);
        }
        let verified = match subject.algorithm {
            SigningAlgorithm::Es256 => {
                UnparsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, &subject.public_key)
                    .verify(parsed.signing_input.as_bytes(), &parsed.signature)
            }
            SigningAlgorithm::EdDsa => UnparsedPublicKey::new(&ED25519, &subject.public_key)
                .verify(parsed.signing_input.as_bytes(), &parsed.signature),
        };
        verified.map_err(|_| AuthError::InvalidSignature)?;

        self.check_time(&parsed.claims, now)?;
        self.check_audience_and_issuer(&parsed.claims)?;

        Ok(VerifiedSubject { subject_id })
    }

    fn parse<'a>(&self, token: &'a str) -> Result<ParsedToken<'a>, AuthError> {
        let malformed = |reason: &str| AuthError::MalformedToken(reason.to_string());

        let (signing_input, signature_b64) = token
            .rsplit_once('.')
            .ok_or_else(|| malformed("expected three segments"))?;
        let (header_b64, claims_b64) = signing_input
            .split_once('.')
            .ok_or_else(|| malformed("expected three segments"))?;
        if claims_b64.contains('.') {
            return Err(malformed("expected three segments"));
        }

        let header_bytes = b64url_decode(header_b64).map_err(|_| malformed("header encoding"))?;
        let claims_bytes = b64url_decode(claims_b64).map_err(|_| malformed("claims encoding"))?;
        let signature =
            b64url_decode(signature_b64).map_err(|_| malformed("signature encoding"))?;

        let header: Header =
            serde_json::from_slice(&header_bytes).map_err(|_| malformed("header json"))?;
        let claims: Claims =
            serde_json::from_slice(&claims_bytes).map_err(|_| malformed("claims json"))?;

        let algorithm = header
            .alg
            .parse::<SigningAlgorithm>()
            .ok()
            .filter(|alg| self.settings.algorithms.contains(alg))
            .ok_or_else(|| malformed("algorithm not allowed"))?;

        if self.settings.options.verify_exp && claims.exp.is_none() {
            return Err(malformed("missing exp claim"));
        }

        Ok(ParsedToken {
            header,
            algorithm,
            claims,
            signing_input,
            signature,
        })
    }

    fn check_time(&self, claims: &Claims, now: DateTime<Utc>) -> Result<(), AuthError> {
        let now = now.timestamp();
        let leeway = self.settings.leeway_secs;

        if self.settings.options.verify_exp {
            if let Some(exp) = claims.exp {
                if now.saturating_sub(leeway) >= exp {
                    return Err(AuthError::Expired);
                }
            }
        }
        if self.settings.options.verify_nbf {
            if let Some(nbf) = claims.nbf {
                if nbf > now.saturating_add(leeway) {
                    return Err(AuthError::NotYetValid);
                }
            }
        }
        Ok(())
    }

    fn check_audience_and_issuer(&self, claims: &Claims) -> Result<(), AuthError> {
        if self.settings.options.verify_aud {
            let matches = claims
                .aud
                .as_ref()
                .is_some_and(|aud| aud.contains_any(&self.settings.audience));
            if !matches {
                return Err(AuthError::AudienceMismatch);
            }
        }
        if self.settings.options.verify_iss
            && claims.iss.as_deref() != Some(self.settings.issuer.as_str())
        {
            return Err(AuthError::IssuerMismatch);
        }
        Ok(())
    }
}
