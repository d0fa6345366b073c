//! docnum - race-safe document-number sequence allocation.
//!
//! An MRP-style application hands out human-readable document numbers
//! (`MO00001`, `PO00042`, ...) drawn from named counters, plus independent
//! per-customer sub-sequences. Under concurrent sessions a naive
//! read-then-write against the backing store silently duplicates numbers;
//! this crate routes every increment through an optimistic
//! compare-and-swap against a single versioned counter record, retrying
//! lost races with jittered backoff.
//!
//! ## Example
//!
//! ```
//! use docnum::{InMemoryCounterStore, SequenceAllocator};
//!
//! let allocator = SequenceAllocator::new(InMemoryCounterStore::new());
//! let mo = allocator.allocate_next("MO", None).unwrap();
//! assert_eq!(mo.formatted, "MO00001");
//! assert_eq!(allocator.peek_current("MO", None).unwrap(), 2);
//! ```
//!
//! Bring your own durable store by implementing [`CounterStore`]; the
//! bundled [`InMemoryCounterStore`] is for tests and development.

mod allocator;
mod document_number;
mod error;
mod key;
mod record;
mod store;

pub use allocator::{RetryPolicy, SequenceAllocator, DEFAULT_CACHE_TTL, DEFAULT_PAD_WIDTH};
pub use document_number::{format_document_number, parse_document_number, DocumentNumber};
pub use error::{AllocatorError, ParseError};
pub use key::{CounterKey, CounterSlot, CustomerId};
pub use record::CounterSet;
pub use store::{CounterStore, InMemoryCounterStore, StoreError, Versioned};
