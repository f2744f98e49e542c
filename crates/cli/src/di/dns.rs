use super::Repositories;
use homedns_application::ports::{CacheInvalidator, NoopCacheInvalidator};
use homedns_domain::Config;
use homedns_infrastructure::dns::{DnsCache, Forwarder, QueryEngine};
use std::sync::Arc;
use tracing::info;

pub struct DnsServices {
    pub cache: Option<Arc<DnsCache>>,
    pub engine: Arc<QueryEngine>,
}

impl DnsServices {
    pub fn new(config: &Config, repos: &Repositories) -> Self {
        let dns = &config.dns;

        let cache = dns
            .cache
            .enabled
            .then(|| Arc::new(DnsCache::new(dns.cache.max_entries)));

        let forwarder = dns.forwarding.enabled.then(|| {
            Arc::new(Forwarder::new(
                &dns.forwarding.servers,
                dns.forwarding.timeout_ladder(),
            ))
        });

        let mut engine = QueryEngine::new(repos.records.clone(), dns.normalized_domains());
        if let Some(cache) = &cache {
            engine = engine.with_cache(cache.clone());
        }
        if let Some(forwarder) = &forwarder {
            engine = engine.with_forwarder(forwarder.clone());
        }

        info!(
            cache = cache.is_some(),
            max_cache_entries = dns.cache.max_entries,
            upstreams = if forwarder.is_some() { dns.forwarding.servers.len() } else { 0 },
            "DNS services ready"
        );

        Self {
            cache,
            engine: Arc::new(engine),
        }
    }

    /// What record mutations use to evict stale answers.
    pub fn cache_invalidator(&self) -> Arc<dyn CacheInvalidator> {
        match &self.cache {
            Some(cache) => cache.clone() as Arc<dyn CacheInvalidator>,
            None => Arc::new(NoopCacheInvalidator),
        }
    }
}
