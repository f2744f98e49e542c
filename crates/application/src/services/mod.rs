pub mod jwt;

pub use jwt::{Claims, KeyPairGenerator, TokenSigner, TokenVerifier, VerifiedSubject};
