//! Advisory peek cache.
//!
//! Serves `peek_current` reads only. Allocation never reads from here:
//! handing out a cached value is exactly the stale-read race the
//! allocator exists to prevent.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::record::CounterSet;

struct Entry {
    snapshot: CounterSet,
    fetched_at: Instant,
}

/// Instance-owned TTL cache of the last seen counter record.
pub struct PeekCache {
    ttl: Duration,
    entry: Mutex<Option<Entry>>,
}

impl PeekCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }

    /// The cached snapshot, if still within its TTL. A poisoned lock is
    /// treated as a miss; the cache is advisory.
    pub fn get(&self) -> Option<CounterSet> {
        let guard = self.entry.lock().ok()?;
        let entry = guard.as_ref()?;
        if entry.fetched_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.snapshot.clone())
    }

    /// Replace the cached snapshot with a freshly committed record.
    pub fn put(&self, snapshot: CounterSet) {
        if let Ok(mut guard) = self.entry.lock() {
            guard.replace(Entry {
                snapshot,
                fetched_at: Instant::now(),
            });
        }
    }

    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.entry.lock() {
            guard.take();
        }
    }
}
