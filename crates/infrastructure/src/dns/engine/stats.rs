use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub(crate) struct EngineCounters {
    pub queries: AtomicU64,
    pub authoritative: AtomicU64,
    pub cache_hits: AtomicU64,
    pub forwarded: AtomicU64,
    pub forward_failures: AtomicU64,
    pub refused: AtomicU64,
    pub format_errors: AtomicU64,
    pub server_failures: AtomicU64,
}

impl EngineCounters {
    #[inline]
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> EngineStats {
        EngineStats {
            queries: self.queries.load(Ordering::Relaxed),
            authoritative: self.authoritative.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            forward_failures: self.forward_failures.load(Ordering::Relaxed),
            refused: self.refused.load(Ordering::Relaxed),
            format_errors: self.format_errors.load(Ordering::Relaxed),
            server_failures: self.server_failures.load(Ordering::Relaxed),
        }
    }
}

/// Query counters since start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub queries: u64,
    pub authoritative: u64,
    pub cache_hits: u64,
    pub forwarded: u64,
    pub forward_failures: u64,
    pub refused: u64,
    pub format_errors: u64,
    pub server_failures: u64,
}
