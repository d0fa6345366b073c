//! Formatting and parsing of document numbers.
//!
//! A document number is `prefix + zero-padded sequence` (`MO00042`). The
//! integer in the counter record is the source of truth; the formatted
//! string is derived on demand and never persisted as authoritative.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// An allocated document number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentNumber {
    pub prefix: String,
    pub sequence: u64,
    pub formatted: String,
}

impl DocumentNumber {
    pub fn new(prefix: &str, sequence: u64, width: usize) -> Self {
        DocumentNumber {
            prefix: prefix.to_string(),
            sequence,
            formatted: format_document_number(prefix, sequence, width),
        }
    }
}

impl std::fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formatted)
    }
}

/// Zero-pad `sequence` to `width` digits and prepend `prefix`.
///
/// A sequence wider than `width` is printed in full, never truncated or
/// wrapped: `format_document_number("PO", 123456, 5)` is `"PO123456"`.
pub fn format_document_number(prefix: &str, sequence: u64, width: usize) -> String {
    format!("{}{:0width$}", prefix, sequence, width = width)
}

/// Parse a document number back into `(prefix, sequence)`.
///
/// The prefix is everything before the first ASCII digit; the rest must
/// be digits through the end of the input.
pub fn parse_document_number(input: &str) -> Result<(String, u64), ParseError> {
    if input.is_empty() {
        return Err(ParseError::Empty);
    }
    let digits_at = input
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| ParseError::MissingSequence(input.to_string()))?;
    if digits_at == 0 {
        return Err(ParseError::MissingPrefix(input.to_string()));
    }

    let (prefix, digits) = input.split_at(digits_at);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseError::TrailingInput(input.to_string()));
    }
    let sequence = digits
        .parse::<u64>()
        .map_err(|_| ParseError::SequenceOverflow(input.to_string()))?;

    Ok((prefix.to_string(), sequence))
}
