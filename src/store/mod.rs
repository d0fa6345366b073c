//! The durable-store seam.
//!
//! The allocator never mutates the counter record outside the versioned
//! compare-and-swap of [`CounterStore::update`]; administrative set and
//! reset are the only callers of the unconditional [`CounterStore::save`].

mod in_memory;

use std::fmt;

use crate::record::CounterSet;

pub use in_memory::InMemoryCounterStore;

/// A counter record paired with the store's record version, the unit of
/// optimistic concurrency control.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Optimistic concurrency conflict: a concurrent writer committed
    /// first. The caller re-reads and retries.
    Conflict { expected: u64, actual: u64 },
    /// The store is unreachable.
    Unavailable(String),
    /// Record encode/decode failure.
    Serde(String),
    LockPoisoned(&'static str),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict { expected, actual } => write!(
                f,
                "concurrent write to counter record (expected version {}, got {})",
                expected, actual
            ),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
            StoreError::Serde(msg) => write!(f, "counter record serialization error: {}", msg),
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Durable storage for the single counter record.
///
/// `update` must be an atomic compare-and-swap on the record version:
/// of two concurrent updates against the same version, exactly one
/// commits and the other observes [`StoreError::Conflict`]. `insert`
/// must likewise fail with a conflict when a record already exists, so
/// a lost creation race is retried rather than overwritten.
pub trait CounterStore: Send + Sync {
    /// Point read of the record, with its current version.
    fn load(&self) -> Result<Option<Versioned<CounterSet>>, StoreError>;

    /// Create the record. Fails with `Conflict` if one already exists.
    fn insert(&self, set: &CounterSet) -> Result<Versioned<CounterSet>, StoreError>;

    /// Compare-and-swap replace: commits only if the stored version
    /// still equals `expected_version`.
    fn update(
        &self,
        set: &CounterSet,
        expected_version: u64,
    ) -> Result<Versioned<CounterSet>, StoreError>;

    /// Unconditional upsert. Administrative set/reset only; never part
    /// of the allocation path.
    fn save(&self, set: &CounterSet) -> Result<Versioned<CounterSet>, StoreError>;
}
