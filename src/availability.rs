//! Availability engine
//!
//! Pure queries over a [`Catalog`] and a [`Ledger`]. Nothing here validates
//! dates or slots; an unknown slot simply has every fitting table free and
//! a party that fits no table gets an empty answer.

use crate::catalog::Catalog;
use crate::ledger::Ledger;
use crate::types::{Table, TimeSlot};

/// Read-only view combining the catalog with a ledger snapshot
#[derive(Debug, Clone, Copy)]
pub struct Availability<'a> {
    catalog: &'a Catalog,
    ledger: &'a Ledger,
}

impl<'a> Availability<'a> {
    pub fn new(catalog: &'a Catalog, ledger: &'a Ledger) -> Self {
        Self { catalog, ledger }
    }

    /// Tables that can seat `party_size` and are free at `(date, time_slot)`
    ///
    /// Returned in ascending table number; the booking workflow assigns the
    /// first entry.
    pub fn available_tables(&self, date: &str, time_slot: &str, party_size: i64) -> Vec<&'a Table> {
        if party_size <= 0 {
            return Vec::new();
        }

        self.catalog
            .tables()
            .iter()
            .filter(|t| i64::from(t.capacity) >= party_size)
            .filter(|t| !self.ledger.is_occupied(t.number, date, time_slot))
            .collect()
    }

    /// Slots on `date` with at least one table for `party_size`, in schedule order
    pub fn available_time_slots(&self, date: &str, party_size: i64) -> Vec<TimeSlot> {
        self.catalog
            .time_slots()
            .iter()
            .filter(|slot| !self.available_tables(date, slot.as_str(), party_size).is_empty())
            .cloned()
            .collect()
    }
}
