//! Core data types for the tablebook reservation service
//!
//! Tables, time slots, reservations and the query types built on them.
//! Dates and time slots are opaque strings: equality is exact match and
//! ordering is lexicographic, which is correct for `YYYY-MM-DD` and `HH:MM`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A bookable table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table number (unique within the catalog)
    pub number: u32,

    /// Maximum party size
    pub capacity: u32,

    /// Location tag (e.g. "Window")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Table {
    pub fn new(number: u32, capacity: u32, location: Option<&str>) -> Self {
        Self {
            number,
            capacity,
            location: location.map(str::to_string),
        }
    }

    /// Reference locator used by the retrieval tools
    pub fn reference(&self) -> String {
        format!("table-{}", self.number)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(
                f,
                "Table {} ({} seats, {})",
                self.number, self.capacity, location
            ),
            None => write!(f, "Table {} ({} seats)", self.number, self.capacity),
        }
    }
}

/// A schedulable start time, e.g. `"19:00"`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSlot(String);

impl TimeSlot {
    pub fn new(slot: impl Into<String>) -> Self {
        Self(slot.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TimeSlot {
    fn from(slot: &str) -> Self {
        Self(slot.to_string())
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reservation identifier (`RES0001`, `RES0002`, ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(String);

impl ReservationId {
    /// Identifier for the given position in the issue sequence
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("RES{:04}", sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Active,
    /// Terminal
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "active",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional contact information attached to a booking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Special requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ContactDetails {
    /// Drop blank fields so `Some("")` never reaches the ledger
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            phone: clean(self.phone),
            email: clean(self.email),
            notes: clean(self.notes),
        }
    }
}

/// A reservation record in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,

    /// Number of the assigned table
    pub table_number: u32,

    pub customer_name: String,

    /// Opaque `YYYY-MM-DD` token
    pub date: String,

    pub time_slot: TimeSlot,

    pub party_size: u32,

    pub status: ReservationStatus,

    #[serde(flatten)]
    pub contact: ContactDetails,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Reservation {
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }

    /// Whether this reservation holds `table_number` at `(date, time_slot)`
    pub fn occupies(&self, table_number: u32, date: &str, time_slot: &str) -> bool {
        self.is_active()
            && self.table_number == table_number
            && self.date == date
            && self.time_slot.as_str() == time_slot
    }
}

/// Input to the booking workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub customer_name: String,
    pub date: String,
    pub time_slot: String,
    pub party_size: i64,
    #[serde(flatten)]
    pub contact: ContactDetails,
}

impl BookingRequest {
    pub fn new(
        customer_name: impl Into<String>,
        date: impl Into<String>,
        time_slot: impl Into<String>,
        party_size: i64,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            date: date.into(),
            time_slot: time_slot.into(),
            party_size,
            contact: ContactDetails::default(),
        }
    }

    pub fn with_contact(mut self, contact: ContactDetails) -> Self {
        self.contact = contact;
        self
    }
}

/// Status filter for reservation views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Cancelled,
}

impl StatusFilter {
    pub fn matches(&self, status: ReservationStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == ReservationStatus::Active,
            StatusFilter::Cancelled => status == ReservationStatus::Cancelled,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "cancelled" | "canceled" => Ok(StatusFilter::Cancelled),
            other => Err(format!(
                "unknown status '{}' (expected all, active or cancelled)",
                other
            )),
        }
    }
}

/// Filters for listing reservations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationQuery {
    /// Exact date match
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub status: StatusFilter,

    /// Case-insensitive partial match on the customer name
    #[serde(default)]
    pub customer_name: Option<String>,
}

impl ReservationQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn on_date(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn with_customer(mut self, customer_name: impl Into<String>) -> Self {
        self.customer_name = Some(customer_name.into());
        self
    }

    pub fn matches(&self, reservation: &Reservation) -> bool {
        if let Some(date) = &self.date {
            if &reservation.date != date {
                return false;
            }
        }

        if !self.status.matches(reservation.status) {
            return false;
        }

        if let Some(name) = &self.customer_name {
            let needle = name.trim().to_lowercase();
            if !reservation.customer_name.to_lowercase().contains(&needle) {
                return false;
            }
        }

        true
    }
}
