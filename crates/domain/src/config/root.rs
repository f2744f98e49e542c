use super::{
    ConfigError, DatabaseConfig, DnsConfig, JwtConfig, LoggingConfig, ServerConfig, TtlFloorPolicy,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Files probed, in order, when no `--config` is given
const DEFAULT_CONFIG_PATHS: &[&str] = &["homedns.toml", "/etc/homedns/homedns.toml"];

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub dns: DnsConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub jwt: JwtConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub api_port: Option<u16>,
    pub bind_address: Option<String>,
    pub database_path: Option<String>,
    pub log_level: Option<String>,
}

impl Config {
    /// Loads the file at `config_path` (or the first default path that
    /// exists), then applies `overrides`. With no file at all the built-in
    /// defaults are used.
    pub fn load(config_path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(p) => Some(PathBuf::from(p)),
            None => DEFAULT_CONFIG_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.exists()),
        };

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Config::default(),
        };

        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(port) = overrides.api_port {
            self.server.api_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(path) = overrides.database_path {
            self.database.path = path;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let forwarding = &self.dns.forwarding;
        if forwarding.enabled {
            if forwarding.servers.is_empty() {
                return Err(ConfigError::Validation(
                    "dns.forwarding.servers cannot be empty while forwarding is enabled".into(),
                ));
            }
            if forwarding.timeouts.is_empty() || forwarding.timeouts.contains(&0) {
                return Err(ConfigError::Validation(
                    "dns.forwarding.timeouts must be a non-empty list of positive seconds".into(),
                ));
            }
        }

        if self.dns.default_ttl == 0 {
            return Err(ConfigError::Validation(
                "dns.default_ttl must be positive".into(),
            ));
        }
        if self.dns.ttl_floor_policy == TtlFloorPolicy::Reject
            && self.dns.default_ttl < self.dns.ttl_floor
        {
            return Err(ConfigError::Validation(format!(
                "dns.default_ttl ({}) is below dns.ttl_floor ({}) with the reject policy",
                self.dns.default_ttl, self.dns.ttl_floor
            )));
        }

        for domain in &self.dns.authoritative_domains {
            crate::validators::normalize_name(domain).map_err(|e| {
                ConfigError::Validation(format!("dns.authoritative_domains: {}", e))
            })?;
        }

        if self.server.tls_cert.is_some() != self.server.tls_key.is_some() {
            return Err(ConfigError::Validation(
                "server.tls_cert and server.tls_key must be set together".into(),
            ));
        }

        if self.jwt.enabled {
            if self.jwt.algorithms.is_empty() {
                return Err(ConfigError::Validation(
                    "jwt.algorithms cannot be empty".into(),
                ));
            }
            if self.jwt.options.verify_aud && self.jwt.audience.is_empty() {
                return Err(ConfigError::Validation(
                    "jwt.audience cannot be empty while audience verification is on".into(),
                ));
            }
        }

        Ok(())
    }
}
