/// Periodic housekeeping on the resolution cache.
pub trait CacheMaintenance: Send + Sync {
    /// Removes expired entries; returns how many were dropped.
    fn sweep_expired(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
