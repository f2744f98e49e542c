use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Malformed DNS message: {0}")]
    FormatError(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Record already exists: {0}")]
    DuplicateRecord(String),

    #[error("Forwarding failed: {reason}")]
    ForwardFailure { reason: String },

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Credential registry error: {0}")]
    RegistryError(String),

    #[error("Key generation failed: {0}")]
    CryptoError(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl DomainError {
    pub fn forward_exhausted() -> Self {
        DomainError::ForwardFailure {
            reason: "all upstreams exhausted".to_string(),
        }
    }
}

/// Reasons a bearer token is refused.
///
/// The display text is safe to return to API callers: it never carries key
/// material or the token itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("unknown subject")]
    UnknownSubject,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("audience mismatch")]
    AudienceMismatch,

    #[error("issuer mismatch")]
    IssuerMismatch,
}

impl AuthError {
    /// Stable machine-readable code for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MalformedToken(_) => "malformed_token",
            AuthError::UnknownSubject => "unknown_subject",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Expired => "expired",
            AuthError::NotYetValid => "not_yet_valid",
            AuthError::AudienceMismatch => "audience_mismatch",
            AuthError::IssuerMismatch => "issuer_mismatch",
        }
    }
}
