//! homedns domain layer
pub mod config;
pub mod credential;
pub mod dns_query;
pub mod dns_record;
pub mod errors;
pub mod forward_target;
pub mod validators;

pub use config::{CliOverrides, Config, ConfigError, TtlFloorPolicy};
pub use credential::{InvocationContext, IssuedCredential, JwtSubject, SigningAlgorithm};
pub use dns_query::DnsQuery;
pub use dns_record::{DnsRecord, RecordType};
pub use errors::{AuthError, DomainError};
pub use forward_target::ForwardTarget;
