//! Counter keys, customer ids, and slot resolution.

use std::fmt;

use crate::error::AllocatorError;

/// A validated counter key: the stable identifier of one global sequence
/// and the display prefix of every number it issues.
///
/// Keys are ASCII alphabetic only. Digits are excluded so a formatted
/// document number splits unambiguously back into prefix and sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CounterKey(String);

impl CounterKey {
    /// Manufacturing orders.
    pub const MO: &'static str = "MO";
    /// Purchase orders.
    pub const PO: &'static str = "PO";
    /// Customer orders.
    pub const CO: &'static str = "CO";
    /// Inventory lots/batches.
    pub const LOT: &'static str = "LOT";

    /// The well-known global keys. Unknown keys remain valid and are
    /// created lazily on first allocation.
    pub const WELL_KNOWN: [&'static str; 4] = [Self::MO, Self::PO, Self::CO, Self::LOT];

    pub fn new(key: &str) -> Result<Self, AllocatorError> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AllocatorError::InvalidKey(key.to_string()));
        }
        Ok(CounterKey(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CounterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated customer identifier for per-customer sub-sequences.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: &str) -> Result<Self, AllocatorError> {
        if id.trim().is_empty() || id.chars().any(|c| c.is_control()) {
            return Err(AllocatorError::InvalidKey(id.to_string()));
        }
        Ok(CustomerId(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved position within the counter record: either a global
/// counter named by its key, or a customer's sub-sequence.
///
/// For customer slots the counter key still supplies the display
/// prefix; the customer id only selects which sequence advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterSlot {
    Global(CounterKey),
    Customer { key: CounterKey, customer: CustomerId },
}

impl CounterSlot {
    /// Resolve raw consumer input into a concrete slot.
    pub fn resolve(key: &str, customer_id: Option<&str>) -> Result<Self, AllocatorError> {
        let key = CounterKey::new(key)?;
        match customer_id {
            None => Ok(CounterSlot::Global(key)),
            Some(id) => Ok(CounterSlot::Customer {
                key,
                customer: CustomerId::new(id)?,
            }),
        }
    }

    /// The display prefix for numbers allocated from this slot.
    pub fn prefix(&self) -> &str {
        match self {
            CounterSlot::Global(key) => key.as_str(),
            CounterSlot::Customer { key, .. } => key.as_str(),
        }
    }
}

impl fmt::Display for CounterSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterSlot::Global(key) => write!(f, "{}", key),
            CounterSlot::Customer { key, customer } => write!(f, "{}/customer:{}", key, customer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_known_keys() {
        for key in CounterKey::WELL_KNOWN {
            assert!(CounterKey::new(key).is_ok());
        }
    }

    #[test]
    fn accepts_unknown_alphabetic_keys() {
        assert!(CounterKey::new("RMA").is_ok());
        assert!(CounterKey::new("inv").is_ok());
    }

    #[test]
    fn rejects_empty_and_malformed_keys() {
        for key in ["", "MO1", "P O", "PO-", "42"] {
            assert_eq!(
                CounterKey::new(key),
                Err(AllocatorError::InvalidKey(key.to_string()))
            );
        }
    }

    #[test]
    fn rejects_blank_customer_ids() {
        assert!(CustomerId::new("").is_err());
        assert!(CustomerId::new("   ").is_err());
        assert!(CustomerId::new("cust\n1").is_err());
    }

    #[test]
    fn resolves_global_and_customer_slots() {
        let global = CounterSlot::resolve("MO", None).unwrap();
        assert_eq!(global.prefix(), "MO");

        let customer = CounterSlot::resolve("CO", Some("acme")).unwrap();
        assert_eq!(customer.prefix(), "CO");
        assert_eq!(customer.to_string(), "CO/customer:acme");
    }

    #[test]
    fn resolve_validates_both_parts() {
        assert!(CounterSlot::resolve("", Some("acme")).is_err());
        assert!(CounterSlot::resolve("CO", Some("")).is_err());
    }
}
