mod jwt;

pub use jwt::{bearer_token, require_bearer};
