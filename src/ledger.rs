//! Reservation ledger
//!
//! Append-only record of every reservation ever made plus the id sequence.
//! Cancellation flips status in place; nothing is ever removed. The ledger
//! lives only as long as the process.

use crate::error::{Result, TablebookError};
use crate::types::{ContactDetails, Reservation, ReservationId, ReservationStatus, TimeSlot};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Validated fields for a new ledger entry
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub table_number: u32,
    pub customer_name: String,
    pub date: String,
    pub time_slot: TimeSlot,
    pub party_size: u32,
    pub contact: ContactDetails,
}

/// In-memory reservation store
#[derive(Debug, Default)]
pub struct Ledger {
    reservations: Vec<Reservation>,
    /// Sequence number of the last issued id
    last_sequence: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }

    /// All reservations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Reservation> {
        self.reservations.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id.as_str() == id)
    }

    /// Whether an active reservation holds the table at `(date, time_slot)`
    pub fn is_occupied(&self, table_number: u32, date: &str, time_slot: &str) -> bool {
        self.reservations
            .iter()
            .any(|r| r.occupies(table_number, date, time_slot))
    }

    /// Append an active reservation and issue its id
    ///
    /// Fails with `NoAvailability` if the table is already held at that date
    /// and slot; in that case no id is consumed.
    pub fn append(&mut self, entry: NewReservation, now: DateTime<Utc>) -> Result<&Reservation> {
        if self.is_occupied(entry.table_number, &entry.date, entry.time_slot.as_str()) {
            return Err(TablebookError::NoAvailability {
                date: entry.date,
                time_slot: entry.time_slot.to_string(),
                party_size: entry.party_size,
                alternatives: Vec::new(),
            });
        }

        let sequence = self.last_sequence + 1;
        let reservation = Reservation {
            id: ReservationId::from_sequence(sequence),
            table_number: entry.table_number,
            customer_name: entry.customer_name,
            date: entry.date,
            time_slot: entry.time_slot,
            party_size: entry.party_size,
            status: ReservationStatus::Active,
            contact: entry.contact,
            created_at: now,
            cancelled_at: None,
        };

        debug!("Ledger append {} (table {})", reservation.id, reservation.table_number);

        self.last_sequence = sequence;
        self.reservations.push(reservation);
        let index = self.reservations.len() - 1;
        Ok(&self.reservations[index])
    }

    /// Mark a reservation cancelled
    pub fn cancel(&mut self, id: &str, now: DateTime<Utc>) -> Result<&Reservation> {
        let reservation = self
            .reservations
            .iter_mut()
            .find(|r| r.id.as_str() == id)
            .ok_or_else(|| TablebookError::ReservationNotFound(id.to_string()))?;

        if reservation.status == ReservationStatus::Cancelled {
            return Err(TablebookError::AlreadyCancelled(id.to_string()));
        }

        reservation.status = ReservationStatus::Cancelled;
        reservation.cancelled_at = Some(now);

        debug!("Ledger cancel {}", reservation.id);

        Ok(&*reservation)
    }

    /// Counts by status
    pub fn stats(&self) -> LedgerStats {
        let active = self.reservations.iter().filter(|r| r.is_active()).count();
        LedgerStats {
            total: self.reservations.len(),
            active,
            cancelled: self.reservations.len() - active,
        }
    }
}

/// Ledger statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LedgerStats {
    pub total: usize,
    pub active: usize,
    pub cancelled: usize,
}
