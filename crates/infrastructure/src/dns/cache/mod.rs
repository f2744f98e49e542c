pub mod entry;
pub mod key;
pub mod metrics;
pub mod storage;

pub use entry::{CachedAnswer, CachedEntry};
pub use key::CacheKey;
pub use metrics::{CacheMetrics, CacheStats};
pub use storage::DnsCache;
