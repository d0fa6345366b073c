//! In-memory counter store for testing and development.

use std::sync::{Arc, RwLock};

use crate::record::CounterSet;

use super::{CounterStore, StoreError, Versioned};

/// Internal stored representation of the counter record.
struct StoredRecord {
    bytes: Vec<u8>,
    version: u64,
}

/// In-memory single-record store.
///
/// Holds the counter record JSON-encoded, the way a document store
/// would, so version bumps correspond to full-record replacements.
/// Clone-friendly via Arc: threads sharing one store contend on the
/// same record versions, which is exactly what the allocator's retry
/// path is built for.
#[derive(Clone)]
pub struct InMemoryCounterStore {
    record: Arc<RwLock<Option<StoredRecord>>>,
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self {
            record: Arc::new(RwLock::new(None)),
        }
    }

    fn encode(set: &CounterSet) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(set).map_err(|e| StoreError::Serde(e.to_string()))
    }

    fn decode(bytes: &[u8]) -> Result<CounterSet, StoreError> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Serde(e.to_string()))
    }
}

impl CounterStore for InMemoryCounterStore {
    fn load(&self) -> Result<Option<Versioned<CounterSet>>, StoreError> {
        let record = self
            .record
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;

        match record.as_ref() {
            Some(stored) => Ok(Some(Versioned {
                data: Self::decode(&stored.bytes)?,
                version: stored.version,
            })),
            None => Ok(None),
        }
    }

    fn insert(&self, set: &CounterSet) -> Result<Versioned<CounterSet>, StoreError> {
        let bytes = Self::encode(set)?;
        let mut record = self
            .record
            .write()
            .map_err(|_| StoreError::LockPoisoned("insert"))?;

        if let Some(existing) = record.as_ref() {
            // lost the creation race
            return Err(StoreError::Conflict {
                expected: 0,
                actual: existing.version,
            });
        }
        record.replace(StoredRecord { bytes, version: 1 });
        Ok(Versioned {
            data: set.clone(),
            version: 1,
        })
    }

    fn update(
        &self,
        set: &CounterSet,
        expected_version: u64,
    ) -> Result<Versioned<CounterSet>, StoreError> {
        let bytes = Self::encode(set)?;
        let mut record = self
            .record
            .write()
            .map_err(|_| StoreError::LockPoisoned("update"))?;

        let stored = record.as_mut().ok_or(StoreError::Conflict {
            expected: expected_version,
            actual: 0,
        })?;
        if stored.version != expected_version {
            return Err(StoreError::Conflict {
                expected: expected_version,
                actual: stored.version,
            });
        }
        stored.bytes = bytes;
        stored.version += 1;
        Ok(Versioned {
            data: set.clone(),
            version: stored.version,
        })
    }

    fn save(&self, set: &CounterSet) -> Result<Versioned<CounterSet>, StoreError> {
        let bytes = Self::encode(set)?;
        let mut record = self
            .record
            .write()
            .map_err(|_| StoreError::LockPoisoned("save"))?;

        let version = record.as_ref().map_or(1, |stored| stored.version + 1);
        record.replace(StoredRecord { bytes, version });
        Ok(Versioned {
            data: set.clone(),
            version,
        })
    }
}
