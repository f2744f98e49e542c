use homedns_domain::{CliOverrides, Config};
use tracing::info;

/// Reads and validates the configuration. Runs before logging is set up,
/// so failures surface through the returned error only.
pub fn load_config(config_path: Option<&str>, cli_overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;
    Ok(config)
}

pub fn log_config(config_path: Option<&str>, config: &Config) {
    info!(
        config_file = config_path.unwrap_or("default"),
        dns_port = config.server.dns_port,
        api_port = config.server.api_port,
        bind = %config.server.bind_address,
        tls = config.server.tls_enabled(),
        authoritative_domains = config.dns.authoritative_domains.len(),
        cache = config.dns.cache.enabled,
        forwarding = config.dns.forwarding.enabled,
        jwt = config.jwt.enabled,
        "Configuration loaded"
    );
}
