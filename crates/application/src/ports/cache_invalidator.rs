use homedns_domain::DnsQuery;

/// Hook the record use cases call after every successful mutation so the
/// resolution cache never serves a stale answer for the changed key.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, query: &DnsQuery);

    /// Drops every cached type for `name` (a CNAME change affects them all).
    fn invalidate_name(&self, name: &str);
}

/// Used when the cache is disabled.
pub struct NoopCacheInvalidator;

impl CacheInvalidator for NoopCacheInvalidator {
    fn invalidate(&self, _query: &DnsQuery) {}

    fn invalidate_name(&self, _name: &str) {}
}
