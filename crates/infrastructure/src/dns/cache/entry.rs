use hickory_proto::rr::Record;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct CachedEntry {
    pub records: Arc<Vec<Record>>,
    pub expires_at: Instant,
}

impl CachedEntry {
    pub fn new(records: Vec<Record>, ttl: u32, now: Instant) -> Self {
        Self {
            records: Arc::new(records),
            expires_at: now + Duration::from_secs(u64::from(ttl)),
        }
    }

    #[inline]
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    pub fn remaining_ttl(&self, now: Instant) -> u32 {
        let remaining = self.expires_at.saturating_duration_since(now);
        u32::try_from(remaining.as_secs()).unwrap_or(u32::MAX)
    }
}

/// A cache hit. Record TTLs are rewritten to the time left on the entry.
#[derive(Debug, Clone)]
pub struct CachedAnswer {
    pub records: Vec<Record>,
    pub remaining_ttl: u32,
}

impl CachedAnswer {
    pub(crate) fn from_entry(entry: &CachedEntry, now: Instant) -> Self {
        let remaining_ttl = entry.remaining_ttl(now);
        let records = entry
            .records
            .iter()
            .map(|record| {
                let mut record = record.clone();
                record.set_ttl(remaining_ttl);
                record
            })
            .collect();
        Self {
            records,
            remaining_ttl,
        }
    }
}
