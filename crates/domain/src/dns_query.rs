use super::RecordType;
use std::sync::Arc;

/// A `(name, type)` lookup key.
/// Uses `Arc<str>` so the name clones cheaply across engine, store and cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsQuery {
    pub name: Arc<str>,
    pub record_type: RecordType,
}

impl DnsQuery {
    pub fn new(name: impl Into<Arc<str>>, record_type: RecordType) -> Self {
        Self {
            name: name.into(),
            record_type,
        }
    }
}
