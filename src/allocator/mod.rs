//! The sequence allocator.

mod cache;
mod retry;

use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::document_number::DocumentNumber;
use crate::error::AllocatorError;
use crate::key::{CounterKey, CounterSlot, CustomerId};
use crate::record::CounterSet;
use crate::store::{CounterStore, StoreError, Versioned};

use cache::PeekCache;
pub use retry::RetryPolicy;

/// Zero-pad width of formatted document numbers.
pub const DEFAULT_PAD_WIDTH: usize = 5;
/// How long a peek may serve from the advisory cache.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Allocates unique, monotonically increasing sequence values for named
/// counters and per-customer sub-sequences.
///
/// Every allocation is one optimistic read-modify-write round trip
/// against the store: read the record and its version, advance the slot
/// in memory, commit with a compare-and-swap on that version. A lost
/// race is retried with jittered backoff up to the retry budget. The
/// cache is instance-owned and serves `peek_current` only.
pub struct SequenceAllocator<S> {
    store: S,
    retry: RetryPolicy,
    pad_width: usize,
    cache: PeekCache,
}

impl<S> SequenceAllocator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
            pad_width: DEFAULT_PAD_WIDTH,
            cache: PeekCache::new(DEFAULT_CACHE_TTL),
        }
    }

    /// Set the retry policy for lost compare-and-swap races.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the TTL of the advisory peek cache.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache.set_ttl(ttl);
        self
    }

    /// Set the zero-pad width of formatted numbers.
    pub fn with_pad_width(mut self, width: usize) -> Self {
        self.pad_width = width;
        self
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: CounterStore> SequenceAllocator<S> {
    /// Allocate the next value for a counter and return it formatted.
    ///
    /// With no `customer_id` the key names a global counter; with one,
    /// the customer's sub-sequence advances and the key only supplies
    /// the display prefix. The first allocation against an empty store
    /// (or an unseen slot) returns 1.
    ///
    /// Two successful calls for the same slot never return the same
    /// value. The allocator introduces no gaps of its own; a caller that
    /// allocates a number and then discards it loses that number.
    pub fn allocate_next(
        &self,
        key: &str,
        customer_id: Option<&str>,
    ) -> Result<DocumentNumber, AllocatorError> {
        let slot = CounterSlot::resolve(key, customer_id)?;

        let mut attempt = 0u32;
        loop {
            match self.try_allocate(&slot) {
                Ok((value, committed)) => {
                    debug!(slot = %slot, value, version = committed.version, "allocated document number");
                    self.cache.put(committed.data);
                    return Ok(DocumentNumber::new(slot.prefix(), value, self.pad_width));
                }
                Err(StoreError::Conflict { expected, actual }) => {
                    attempt += 1;
                    if attempt >= self.retry.max_attempts {
                        self.cache.invalidate();
                        return Err(AllocatorError::Conflict {
                            key: slot.to_string(),
                            attempts: attempt,
                        });
                    }
                    let delay = self.retry.delay_for(attempt - 1);
                    warn!(
                        slot = %slot,
                        attempt,
                        expected,
                        actual,
                        retry_in = ?delay,
                        "allocation lost a concurrent write, retrying"
                    );
                    thread::sleep(delay);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// The value the next allocation for this slot would return.
    ///
    /// Read-only and served from the advisory cache when fresh. Display
    /// use only ("next MO number will be MO00042"); never hand a peeked
    /// value out on a document.
    pub fn peek_current(
        &self,
        key: &str,
        customer_id: Option<&str>,
    ) -> Result<u64, AllocatorError> {
        let slot = CounterSlot::resolve(key, customer_id)?;
        if let Some(snapshot) = self.cache.get() {
            return Ok(snapshot.next_for(&slot));
        }
        let snapshot = self.load_snapshot()?;
        let next = snapshot.next_for(&slot);
        self.cache.put(snapshot);
        Ok(next)
    }

    /// An uncached snapshot of the whole record, for administrative
    /// display.
    pub fn current_counters(&self) -> Result<CounterSet, AllocatorError> {
        self.load_snapshot().map_err(Into::into)
    }

    /// Administrative override: replace the stored values wholesale.
    ///
    /// Well-known globals missing from `globals` fall back to 1; the
    /// customer map is replaced by `customers`. Not an increment, not
    /// race-guarded: this is a single-operator correction after detected
    /// drift (e.g. imported legacy data), outside the allocation path.
    pub fn set_counters(
        &self,
        globals: BTreeMap<String, u64>,
        customers: BTreeMap<String, u64>,
    ) -> Result<(), AllocatorError> {
        let mut set = CounterSet::new();
        for (key, value) in globals {
            let key = CounterKey::new(&key)?;
            check_value(key.as_str(), value)?;
            set.set_next(&CounterSlot::Global(key), value);
        }
        for (id, value) in customers {
            let customer = CustomerId::new(&id)?;
            check_value(customer.as_str(), value)?;
            set.customers.insert(customer.as_str().to_string(), value);
        }
        set.touch();

        self.store.save(&set)?;
        self.cache.invalidate();
        debug!("counters overridden by administrator");
        Ok(())
    }

    /// Administrative reset: all global counters back to 1, customer
    /// sub-sequences cleared.
    ///
    /// Destructive and irreversible. Numbers issued before the reset are
    /// not tracked here, so future allocations can collide with
    /// historical documents; guarding against that is the caller's
    /// policy decision.
    pub fn reset_counters(&self) -> Result<(), AllocatorError> {
        let mut set = CounterSet::new();
        set.touch();
        self.store.save(&set)?;
        self.cache.invalidate();
        warn!("all counters reset to 1");
        Ok(())
    }

    /// One optimistic read-modify-write round trip. Creates the record
    /// lazily on first allocation; a lost creation race surfaces as a
    /// conflict like any other.
    fn try_allocate(
        &self,
        slot: &CounterSlot,
    ) -> Result<(u64, Versioned<CounterSet>), StoreError> {
        match self.store.load()? {
            Some(mut versioned) => {
                let value = versioned.data.advance(slot);
                versioned.data.touch();
                let committed = self.store.update(&versioned.data, versioned.version)?;
                Ok((value, committed))
            }
            None => {
                let mut set = CounterSet::new();
                let value = set.advance(slot);
                set.touch();
                let committed = self.store.insert(&set)?;
                Ok((value, committed))
            }
        }
    }

    fn load_snapshot(&self) -> Result<CounterSet, StoreError> {
        Ok(self
            .store
            .load()?
            .map(|versioned| versioned.data)
            .unwrap_or_default())
    }
}

fn check_value(slot: &str, value: u64) -> Result<(), AllocatorError> {
    if value == 0 {
        return Err(AllocatorError::InvalidValue {
            slot: slot.to_string(),
            value,
        });
    }
    Ok(())
}
