//! Configuration module for homedns
//!
//! Structures are organised by concern:
//! - `root`: main configuration and CLI overrides
//! - `server`: listen address, ports and TLS material
//! - `dns`: authority, TTL policy, cache and forwarding
//! - `database`: record store location
//! - `jwt`: control API token verification
//! - `logging`: log level and format
//! - `errors`: configuration errors

pub mod database;
pub mod dns;
pub mod errors;
pub mod jwt;
pub mod logging;
pub mod root;
pub mod server;

pub use database::DatabaseConfig;
pub use dns::{CacheConfig, DnsConfig, ForwardingConfig, TtlFloorPolicy};
pub use errors::ConfigError;
pub use jwt::{JwtConfig, JwtVerifyOptions};
pub use logging::{LogFormat, LoggingConfig};
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
