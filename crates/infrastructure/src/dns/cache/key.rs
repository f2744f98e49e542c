use hickory_proto::rr::RecordType;
use std::sync::Arc;

/// Cache key. The type is the wire type, so forwarded answers for types
/// the record store cannot hold (SRV, PTR, ...) are cached too.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub name: Arc<str>,
    pub record_type: RecordType,
}

impl CacheKey {
    #[inline]
    pub fn new(name: impl Into<Arc<str>>, record_type: RecordType) -> Self {
        Self {
            name: name.into(),
            record_type,
        }
    }
}
