//! Booking workflow
//!
//! Validation + availability + ledger mutation. These functions are
//! synchronous and take the catalog and ledger explicitly; the
//! [`ReservationService`](crate::service::ReservationService) wraps them in
//! its lock.

use crate::availability::Availability;
use crate::catalog::Catalog;
use crate::error::{Result, TablebookError};
use crate::ledger::{Ledger, NewReservation};
use crate::types::{BookingRequest, Reservation, ReservationQuery, TimeSlot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default upper bound on party size
pub const DEFAULT_MAX_PARTY_SIZE: u32 = 10;

/// Limits applied to booking requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPolicy {
    pub max_party_size: u32,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            max_party_size: DEFAULT_MAX_PARTY_SIZE,
        }
    }
}

impl BookingPolicy {
    /// Check a raw party size against `1..=max_party_size`
    pub fn validate_party_size(&self, party_size: i64) -> Result<u32> {
        match u32::try_from(party_size) {
            Ok(size) if (1..=self.max_party_size).contains(&size) => Ok(size),
            _ => Err(TablebookError::InvalidArgument(format!(
                "party_size must be between 1 and {} (got {})",
                self.max_party_size, party_size
            ))),
        }
    }
}

/// Book the lowest-numbered free table that fits the party
pub fn book(
    catalog: &Catalog,
    ledger: &mut Ledger,
    request: &BookingRequest,
    policy: &BookingPolicy,
    now: DateTime<Utc>,
) -> Result<Reservation> {
    let customer_name = request.customer_name.trim();
    if customer_name.is_empty() {
        return Err(TablebookError::invalid_argument(
            "customer_name must not be empty",
        ));
    }

    let date = request.date.trim();
    if date.is_empty() {
        return Err(TablebookError::invalid_argument("date must not be empty"));
    }

    let time_slot = request.time_slot.trim();
    if !catalog.is_valid_slot(time_slot) {
        return Err(TablebookError::InvalidTimeSlot(time_slot.to_string()));
    }

    let party_size = policy.validate_party_size(request.party_size)?;

    let table_number = {
        let engine = Availability::new(catalog, ledger);
        match engine
            .available_tables(date, time_slot, request.party_size)
            .first()
        {
            Some(table) => table.number,
            None => {
                return Err(TablebookError::NoAvailability {
                    date: date.to_string(),
                    time_slot: time_slot.to_string(),
                    party_size,
                    alternatives: engine.available_time_slots(date, request.party_size),
                });
            }
        }
    };

    debug!(
        "Assigning table {} to party of {} on {} at {}",
        table_number, party_size, date, time_slot
    );

    let reservation = ledger.append(
        NewReservation {
            table_number,
            customer_name: customer_name.to_string(),
            date: date.to_string(),
            time_slot: TimeSlot::from(time_slot),
            party_size,
            contact: request.contact.clone().normalized(),
        },
        now,
    )?;

    Ok(reservation.clone())
}

/// Cancel an active reservation; cancelled reservations stay in the ledger
pub fn cancel(ledger: &mut Ledger, reservation_id: &str, now: DateTime<Utc>) -> Result<Reservation> {
    ledger.cancel(reservation_id, now).cloned()
}

/// Filtered reservations, stably sorted by `(date, time_slot)`
pub fn view(ledger: &Ledger, query: &ReservationQuery) -> Vec<Reservation> {
    let mut matches: Vec<Reservation> = ledger
        .iter()
        .filter(|r| query.matches(r))
        .cloned()
        .collect();

    matches.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.time_slot.cmp(&b.time_slot))
    });

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContactDetails, ReservationStatus, StatusFilter};

    const DATE: &str = "2025-11-15";

    fn request(name: &str, slot: &str, party_size: i64) -> BookingRequest {
        BookingRequest::new(name, DATE, slot, party_size)
    }

    fn book_ok(catalog: &Catalog, ledger: &mut Ledger, req: BookingRequest) -> Reservation {
        book(catalog, ledger, &req, &BookingPolicy::default(), Utc::now()).unwrap()
    }

    #[test]
    fn test_lowest_numbered_table_wins() {
        let catalog = Catalog::reference();
        let mut ledger = Ledger::new();

        let first = book_ok(&catalog, &mut ledger, request("A", "19:00", 4));
        let second = book_ok(&catalog, &mut ledger, request("B", "19:00", 4));

        assert_eq!(first.table_number, 3);
        assert_eq!(second.table_number, 4);
        assert_eq!(first.id.as_str(), "RES0001");
        assert_eq!(second.id.as_str(), "RES0002");
    }

    #[test]
    fn test_larger_tables_used_once_exact_fit_is_gone() {
        let catalog = Catalog::reference();
        let mut ledger = Ledger::new();

        for _ in 0..2 {
            book_ok(&catalog, &mut ledger, request("A", "19:00", 4));
        }
        let third = book_ok(&catalog, &mut ledger, request("C", "19:00", 4));
        assert_eq!(third.table_number, 5);
    }

    #[test]
    fn test_no_availability_suggests_alternatives() {
        let catalog = Catalog::reference();
        let mut ledger = Ledger::new();
        book_ok(&catalog, &mut ledger, request("A", "19:00", 8));

        let err = book(
            &catalog,
            &mut ledger,
            &request("B", "19:00", 7),
            &BookingPolicy::default(),
            Utc::now(),
        )
        .unwrap_err();

        match err {
            TablebookError::NoAvailability {
                party_size,
                alternatives,
                ..
            } => {
                assert_eq!(party_size, 7);
                assert_eq!(alternatives.len(), catalog.time_slots().len() - 1);
                assert!(!alternatives.iter().any(|s| s.as_str() == "19:00"));
            }
            other => panic!("Expected NoAvailability, got {:?}", other),
        }
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_party_larger_than_any_table() {
        let catalog = Catalog::reference();
        let mut ledger = Ledger::new();

        let err = book(
            &catalog,
            &mut ledger,
            &request("A", "19:00", 9),
            &BookingPolicy::default(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, TablebookError::NoAvailability { .. }));
    }

    #[test]
    fn test_validation_failures() {
        let catalog = Catalog::reference();
        let mut ledger = Ledger::new();
        let policy = BookingPolicy::default();

        let cases = vec![
            (request("", "19:00", 2), "customer_name"),
            (BookingRequest::new("A", "  ", "19:00", 2), "date"),
            (request("A", "19:00", 0), "party_size"),
            (request("A", "19:00", -1), "party_size"),
            (request("A", "19:00", 11), "party_size"),
        ];

        for (req, field) in cases {
            match book(&catalog, &mut ledger, &req, &policy, Utc::now()) {
                Err(TablebookError::InvalidArgument(msg)) => {
                    assert!(msg.contains(field), "{} should mention {}", msg, field)
                }
                other => panic!("Expected InvalidArgument for {}, got {:?}", field, other),
            }
        }

        let err = book(&catalog, &mut ledger, &request("A", "23:59", 2), &policy, Utc::now())
            .unwrap_err();
        assert!(matches!(err, TablebookError::InvalidTimeSlot(slot) if slot == "23:59"));

        assert!(ledger.is_empty());
    }

    #[test]
    fn test_contact_details_stored() {
        let catalog = Catalog::reference();
        let mut ledger = Ledger::new();

        let req = request("A", "12:00", 2).with_contact(ContactDetails {
            phone: Some("555-0100".to_string()),
            email: Some(String::new()),
            notes: Some("Birthday".to_string()),
        });
        let reservation = book_ok(&catalog, &mut ledger, req);

        assert_eq!(reservation.contact.phone.as_deref(), Some("555-0100"));
        assert_eq!(reservation.contact.email, None);
        assert_eq!(reservation.contact.notes.as_deref(), Some("Birthday"));
    }

    #[test]
    fn test_cancel_frees_table() {
        let catalog = Catalog::reference();
        let mut ledger = Ledger::new();
        let reservation = book_ok(&catalog, &mut ledger, request("A", "19:00", 8));

        let cancelled = cancel(&mut ledger, reservation.id.as_str(), Utc::now()).unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);

        let rebooked = book_ok(&catalog, &mut ledger, request("B", "19:00", 8));
        assert_eq!(rebooked.table_number, 6);
        assert_eq!(rebooked.id.as_str(), "RES0002");
    }

    #[test]
    fn test_view_filters_and_sorts() {
        let catalog = Catalog::reference();
        let mut ledger = Ledger::new();

        book_ok(&catalog, &mut ledger, request("Late", "20:00", 2));
        book_ok(&catalog, &mut ledger, request("Early", "12:00", 2));
        book_ok(
            &catalog,
            &mut ledger,
            BookingRequest::new("Other day", "2025-11-14", "21:00", 2),
        );
        let gone = book_ok(&catalog, &mut ledger, request("Gone", "13:00", 2));
        cancel(&mut ledger, gone.id.as_str(), Utc::now()).unwrap();

        let all = view(&ledger, &ReservationQuery::all());
        let names: Vec<&str> = all.iter().map(|r| r.customer_name.as_str()).collect();
        assert_eq!(names, vec!["Other day", "Early", "Gone", "Late"]);

        let active = view(
            &ledger,
            &ReservationQuery::on_date(DATE).with_status(StatusFilter::Active),
        );
        let names: Vec<&str> = active.iter().map(|r| r.customer_name.as_str()).collect();
        assert_eq!(names, vec!["Early", "Late"]);

        let cancelled = view(&ledger, &ReservationQuery::all().with_status(StatusFilter::Cancelled));
        assert_eq!(cancelled.len(), 1);

        assert!(view(&ledger, &ReservationQuery::on_date("2030-01-01")).is_empty());
    }

    #[test]
    fn test_view_ties_keep_insertion_order() {
        let catalog = Catalog::reference();
        let mut ledger = Ledger::new();

        book_ok(&catalog, &mut ledger, request("First", "19:00", 2));
        book_ok(&catalog, &mut ledger, request("Second", "19:00", 2));

        let names: Vec<String> = view(&ledger, &ReservationQuery::all())
            .into_iter()
            .map(|r| r.customer_name)
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }
}
