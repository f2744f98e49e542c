use anyhow::Context;
use homedns_domain::config::JwtConfig;
use homedns_infrastructure::registry::JsonCredentialRegistry;
use std::sync::Arc;

/// Loads the credential registry; an unreadable file is fatal.
pub async fn open_registry(cfg: &JwtConfig) -> anyhow::Result<Arc<JsonCredentialRegistry>> {
    let registry = JsonCredentialRegistry::open(&cfg.subjects_path)
        .await
        .with_context(|| format!("cannot load credential registry {}", cfg.subjects_path))?;
    Ok(Arc::new(registry))
}
