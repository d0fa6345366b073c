//! The counter record: one aggregate holding every sequence.

use std::collections::BTreeMap;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::key::{CounterKey, CounterSlot};

/// The single aggregate record holding all named counters.
///
/// Every stored value is the *next* value to hand out, and is always
/// >= 1. A slot that has never been allocated from is simply absent and
/// reads as 1. Values only move forward except through administrative
/// set/reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSet {
    /// Global sequences keyed by counter key (`MO`, `PO`, ...).
    pub globals: BTreeMap<String, u64>,
    /// Per-customer sub-sequences keyed by customer id.
    pub customers: BTreeMap<String, u64>,
    pub last_updated: SystemTime,
}

impl Default for CounterSet {
    fn default() -> Self {
        let mut globals = BTreeMap::new();
        for key in CounterKey::WELL_KNOWN {
            globals.insert(key.to_string(), 1);
        }
        CounterSet {
            globals,
            customers: BTreeMap::new(),
            last_updated: SystemTime::UNIX_EPOCH,
        }
    }
}

impl CounterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next value this slot would allocate.
    pub fn next_for(&self, slot: &CounterSlot) -> u64 {
        let value = match slot {
            CounterSlot::Global(key) => self.globals.get(key.as_str()),
            CounterSlot::Customer { customer, .. } => self.customers.get(customer.as_str()),
        };
        value.copied().unwrap_or(1)
    }

    /// Consume the slot's current value: returns the allocated value and
    /// stores value + 1 as the new "next to hand out".
    pub fn advance(&mut self, slot: &CounterSlot) -> u64 {
        let allocated = self.next_for(slot);
        self.put(slot, allocated + 1);
        allocated
    }

    /// Overwrite the slot's next value. Administrative path only; the
    /// caller validates the value is >= 1.
    pub fn set_next(&mut self, slot: &CounterSlot, value: u64) {
        self.put(slot, value);
    }

    /// All well-known globals back to 1, customer sub-sequences cleared.
    pub fn reset(&mut self) {
        *self = CounterSet::new();
        self.touch();
    }

    pub fn touch(&mut self) {
        self.last_updated = SystemTime::now();
    }

    fn put(&mut self, slot: &CounterSlot, value: u64) {
        match slot {
            CounterSlot::Global(key) => {
                self.globals.insert(key.as_str().to_string(), value);
            }
            CounterSlot::Customer { customer, .. } => {
                self.customers.insert(customer.as_str().to_string(), value);
            }
        }
    }
}
