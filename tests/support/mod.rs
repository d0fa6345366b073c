//! Shared test stores.
#![allow(dead_code)] // each test binary uses a different subset

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use docnum::{CounterSet, CounterStore, InMemoryCounterStore, StoreError, Versioned};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Store wrapper that fails commits with a conflict a fixed number of
/// times before letting them through. Reads are untouched.
#[derive(Clone)]
pub struct FlakyStore {
    inner: InMemoryCounterStore,
    failures_left: Arc<AtomicU32>,
    commit_attempts: Arc<AtomicU32>,
}

impl FlakyStore {
    pub fn failing(times: u32) -> Self {
        Self {
            inner: InMemoryCounterStore::new(),
            failures_left: Arc::new(AtomicU32::new(times)),
            commit_attempts: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn commit_attempts(&self) -> u32 {
        self.commit_attempts.load(Ordering::SeqCst)
    }

    fn maybe_fail(&self) -> Result<(), StoreError> {
        self.commit_attempts.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                left.checked_sub(1)
            })
            .is_ok();
        if failed {
            Err(StoreError::Conflict {
                expected: 0,
                actual: 0,
            })
        } else {
            Ok(())
        }
    }
}

impl CounterStore for FlakyStore {
    fn load(&self) -> Result<Option<Versioned<CounterSet>>, StoreError> {
        self.inner.load()
    }

    fn insert(&self, set: &CounterSet) -> Result<Versioned<CounterSet>, StoreError> {
        self.maybe_fail()?;
        self.inner.insert(set)
    }

    fn update(
        &self,
        set: &CounterSet,
        expected_version: u64,
    ) -> Result<Versioned<CounterSet>, StoreError> {
        self.maybe_fail()?;
        self.inner.update(set, expected_version)
    }

    fn save(&self, set: &CounterSet) -> Result<Versioned<CounterSet>, StoreError> {
        self.inner.save(set)
    }
}

/// Store whose every operation fails as unreachable.
pub struct OfflineStore;

impl CounterStore for OfflineStore {
    fn load(&self) -> Result<Option<Versioned<CounterSet>>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn insert(&self, _set: &CounterSet) -> Result<Versioned<CounterSet>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn update(
        &self,
        _set: &CounterSet,
        _expected_version: u64,
    ) -> Result<Versioned<CounterSet>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn save(&self, _set: &CounterSet) -> Result<Versioned<CounterSet>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}
