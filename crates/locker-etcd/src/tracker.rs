//! Per-key lease bookkeeping.

use std::collections::HashMap;
use std::sync::Mutex;

/// Tracks the most recent lease id bound to each lock key so superseded
/// leases can be revoked instead of lingering until their TTL lapses.
#[derive(Default)]
pub(crate) struct LeaseTracker {
    leases: Mutex<HashMap<String, i64>>,
}

impl LeaseTracker {
    /// Records `lease` as current for `key`, returning the lease it replaced.
    pub(crate) fn swap(&self, key: &str, lease: i64) -> Option<i64> {
        self.leases
            .lock()
            .unwrap()
            .insert(key.to_string(), lease)
            .filter(|&old| old != lease)
    }

    /// Removes and returns the lease tracked for `key`.
    pub(crate) fn take(&self, key: &str) -> Option<i64> {
        self.leases.lock().unwrap().remove(key)
    }
}
