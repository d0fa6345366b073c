use std::fmt;

use crate::store::StoreError;

/// Error type for allocator operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocatorError {
    /// Counter key or customer id failed validation. Never retried.
    InvalidKey(String),
    /// Administrative set with a value that violates the counter
    /// invariant (values are positive integers).
    InvalidValue { slot: String, value: u64 },
    /// The compare-and-swap lost a race on every attempt in the retry
    /// budget. Transient; the caller may retry the whole call.
    Conflict { key: String, attempts: u32 },
    /// The backing store is unreachable. Transient; not retried
    /// internally.
    StoreUnavailable(String),
    /// Internal store fault (poisoned lock, codec failure).
    Store(String),
}

impl fmt::Display for AllocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocatorError::InvalidKey(key) => write!(f, "invalid counter key: {:?}", key),
            AllocatorError::InvalidValue { slot, value } => write!(
                f,
                "invalid counter value {} for {} (counters start at 1)",
                value, slot
            ),
            AllocatorError::Conflict { key, attempts } => write!(
                f,
                "could not allocate a number for {} after {} attempts, please try again",
                key, attempts
            ),
            AllocatorError::StoreUnavailable(msg) => {
                write!(f, "counter store unavailable: {}", msg)
            }
            AllocatorError::Store(msg) => write!(f, "counter store error: {}", msg),
        }
    }
}

impl std::error::Error for AllocatorError {}

impl From<StoreError> for AllocatorError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AllocatorError::StoreUnavailable(msg),
            other => AllocatorError::Store(other.to_string()),
        }
    }
}

/// Error type for [`parse_document_number`](crate::parse_document_number).
///
/// Malformed input is rejected outright; there is no default value to
/// fall back to, a document number either parses or it does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    /// Input starts with a digit; every document number carries a prefix.
    MissingPrefix(String),
    /// Input has no digits after the prefix.
    MissingSequence(String),
    /// Non-digit characters after the sequence.
    TrailingInput(String),
    /// Sequence digits overflow the counter range.
    SequenceOverflow(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty document number"),
            ParseError::MissingPrefix(input) => {
                write!(f, "document number {:?} has no prefix", input)
            }
            ParseError::MissingSequence(input) => {
                write!(f, "document number {:?} has no sequence digits", input)
            }
            ParseError::TrailingInput(input) => {
                write!(f, "document number {:?} has trailing input after the sequence", input)
            }
            ParseError::SequenceOverflow(input) => {
                write!(f, "document number {:?} sequence is out of range", input)
            }
        }
    }
}

impl std::error::Error for ParseError {}
