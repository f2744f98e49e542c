//! Compact JWS tokens signed with subject keys.
//!
//! Tokens are `base64url(header).base64url(claims).base64url(signature)`;
//! the signature covers the first two segments as ASCII.

mod claims;
mod keys;
mod signer;
mod verifier;

pub use claims::{Audience, Claims, Header};
pub use keys::{decode_private_key_pem, encode_private_key_pem, GeneratedKeyPair, KeyPairGenerator};
pub use signer::TokenSigner;
pub use verifier::{TokenVerifier, VerifiedSubject, VerifierSettings};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

pub(crate) fn b64url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub(crate) fn b64url_decode(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(segment)
}
