//! Chat-style text for tool replies

use crate::error::TablebookError;
use crate::retrieval::{Document, SearchHit};
use crate::types::{Reservation, Table, TimeSlot};
use chrono::{NaiveDate, NaiveTime};

/// `2025-11-15` -> `November 15, 2025`; other tokens unchanged
pub fn display_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%B %d, %Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// `19:00` -> `07:00 PM`; other tokens unchanged
pub fn display_time(slot: &str) -> String {
    NaiveTime::parse_from_str(slot, "%H:%M")
        .map(|t| t.format("%I:%M %p").to_string())
        .unwrap_or_else(|_| slot.to_string())
}

fn display_slots(slots: &[TimeSlot]) -> String {
    slots
        .iter()
        .map(|s| display_time(s.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn availability(date: &str, time_slot: &str, party_size: i64, tables: &[Table]) -> String {
    if tables.is_empty() {
        return format!(
            "✗ No tables available for {} people on {} at {}",
            party_size,
            display_date(date),
            display_time(time_slot)
        );
    }

    let listing = tables
        .iter()
        .map(Table::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "✓ Available! Tables for {} people on {} at {}:\n{}",
        party_size,
        display_date(date),
        display_time(time_slot),
        listing
    )
}

fn contact_lines(reservation: &Reservation, out: &mut String) {
    if let Some(phone) = &reservation.contact.phone {
        out.push_str(&format!("\nPhone: {}", phone));
    }
    if let Some(email) = &reservation.contact.email {
        out.push_str(&format!("\nEmail: {}", email));
    }
    if let Some(notes) = &reservation.contact.notes {
        out.push_str(&format!("\nNotes: {}", notes));
    }
}

pub fn booking_confirmed(reservation: &Reservation, table: Option<&Table>) -> String {
    let table = table
        .map(Table::to_string)
        .unwrap_or_else(|| format!("Table {}", reservation.table_number));

    let mut text = format!(
        "✓ Reservation Confirmed!\n\n\
         Reservation ID: {}\n\
         Customer: {}\n\
         Party Size: {} people\n\
         Date: {}\n\
         Time: {}\n\
         Table: {}",
        reservation.id,
        reservation.customer_name,
        reservation.party_size,
        display_date(&reservation.date),
        display_time(reservation.time_slot.as_str()),
        table
    );
    contact_lines(reservation, &mut text);
    text
}

pub fn cancelled(reservation: &Reservation) -> String {
    format!(
        "✓ Reservation Cancelled\n\n\
         Reservation ID: {}\n\
         Customer: {}\n\
         Date: {}\n\
         Time: {}\n\
         Party Size: {} people\n\n\
         The table has been released and is now available for booking.",
        reservation.id,
        reservation.customer_name,
        reservation.date,
        reservation.time_slot,
        reservation.party_size
    )
}

pub fn reservations(list: &[Reservation], tables: &[Table]) -> String {
    if list.is_empty() {
        return "No reservations found matching your criteria.".to_string();
    }

    let mut text = format!("Found {} reservation(s):\n", list.len());
    for r in list {
        let location = tables
            .iter()
            .find(|t| t.number == r.table_number)
            .and_then(|t| t.location.as_deref());
        let table = match location {
            Some(location) => format!("{} ({})", r.table_number, location),
            None => r.table_number.to_string(),
        };

        text.push_str(&format!(
            "\n---\nID: {}\nCustomer: {}\nDate: {} at {}\nParty: {} people\nTable: {}\nStatus: {}",
            r.id, r.customer_name, r.date, r.time_slot, r.party_size, table, r.status
        ));
        contact_lines(r, &mut text);
    }
    text
}

pub fn time_slots(date: &str, party_size: i64, slots: &[TimeSlot]) -> String {
    if slots.is_empty() {
        return format!(
            "Sorry, no available slots for {} people on {}. The restaurant is fully booked.",
            party_size,
            display_date(date)
        );
    }

    format!(
        "Available time slots for {} people on {}:\n\n{}\n\nUse book_table to reserve your preferred time.",
        party_size,
        display_date(date),
        display_slots(slots)
    )
}

pub fn search_hits(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No reservations match '{}'.", query.trim());
    }

    let mut text = format!("Found {} result(s):", hits.len());
    for hit in hits {
        text.push_str(&format!("\n- {} ({})", hit.title, hit.url));
    }
    text
}

pub fn document(doc: &Document) -> String {
    format!("{}\n\n{}", doc.title, doc.text)
}

/// Message for an expected failure; `valid_slots` backs the invalid-slot hint
pub fn failure(error: &TablebookError, valid_slots: &[TimeSlot]) -> String {
    match error {
        TablebookError::InvalidTimeSlot(slot) => format!(
            "✗ Invalid time slot '{}'. Please choose one of: {}",
            slot,
            display_slots(valid_slots)
        ),
        TablebookError::NoAvailability {
            date,
            time_slot,
            party_size,
            alternatives,
        } => {
            let mut text = format!(
                "Sorry, no tables available for {} people on {} at {}.",
                party_size,
                display_date(date),
                display_time(time_slot)
            );
            if alternatives.is_empty() {
                text.push_str(" The restaurant is fully booked that day.");
            } else {
                text.push_str(&format!(
                    "\nOther times still open that day: {}",
                    display_slots(alternatives)
                ));
            }
            text
        }
        TablebookError::ReservationNotFound(id) => format!(
            "✗ Reservation {} not found. Please check the ID and try again.",
            id
        ),
        TablebookError::TableNotFound(reference) => format!("✗ Table {} not found.", reference),
        TablebookError::AlreadyCancelled(id) => {
            format!("✗ Reservation {} has already been cancelled.", id)
        }
        TablebookError::InvalidArgument(message) => format!("✗ {}", message),
        other => format!("Error: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContactDetails, ReservationId, ReservationStatus};
    use chrono::Utc;

    fn reservation() -> Reservation {
        Reservation {
            id: ReservationId::from_sequence(1),
            table_number: 3,
            customer_name: "Alice Smith".to_string(),
            date: "2025-11-15".to_string(),
            time_slot: TimeSlot::from("19:00"),
            party_size: 4,
            status: ReservationStatus::Active,
            contact: ContactDetails {
                phone: Some("555-0100".to_string()),
                ..ContactDetails::default()
            },
            created_at: Utc::now(),
            cancelled_at: None,
        }
    }

    #[test]
    fn test_display_helpers() {
        assert_eq!(display_date("2025-11-15"), "November 15, 2025");
        assert_eq!(display_date("someday"), "someday");
        assert_eq!(display_time("19:00"), "07:00 PM");
        assert_eq!(display_time("11:00"), "11:00 AM");
    }

    #[test]
    fn test_availability_text() {
        let tables = vec![Table::new(3, 4, Some("Main Hall"))];
        let text = availability("2025-11-15", "19:00", 4, &tables);
        assert!(text.starts_with("✓ Available! Tables for 4 people on November 15, 2025 at 07:00 PM:"));
        assert!(text.ends_with("Table 3 (4 seats, Main Hall)"));

        let text = availability("2025-11-15", "19:00", 4, &[]);
        assert!(text.starts_with("✗ No tables available"));
    }

    #[test]
    fn test_confirmation_includes_contact() {
        let r = reservation();
        let table = Table::new(3, 4, Some("Main Hall"));
        let text = booking_confirmed(&r, Some(&table));

        assert!(text.contains("Reservation ID: RES0001"));
        assert!(text.contains("Table: Table 3 (4 seats, Main Hall)"));
        assert!(text.ends_with("Phone: 555-0100"));
    }

    #[test]
    fn test_reservation_listing() {
        let tables = vec![Table::new(3, 4, Some("Main Hall"))];
        let text = reservations(&[reservation()], &tables);

        assert!(text.starts_with("Found 1 reservation(s):\n\n---\nID: RES0001"));
        assert!(text.contains("Date: 2025-11-15 at 19:00"));
        assert!(text.contains("Table: 3 (Main Hall)"));
        assert_eq!(
            reservations(&[], &tables),
            "No reservations found matching your criteria."
        );
    }

    #[test]
    fn test_failure_messages() {
        let slots = vec![TimeSlot::from("18:00"), TimeSlot::from("19:00")];

        let text = failure(&TablebookError::InvalidTimeSlot("23:59".to_string()), &slots);
        assert!(text.contains("06:00 PM, 07:00 PM"));

        let text = failure(
            &TablebookError::NoAvailability {
                date: "2025-11-15".to_string(),
                time_slot: "19:00".to_string(),
                party_size: 4,
                alternatives: vec![TimeSlot::from("18:00")],
            },
            &slots,
        );
        assert!(text.contains("Other times still open that day: 06:00 PM"));

        let text = failure(&TablebookError::ReservationNotFound("RES9999".to_string()), &slots);
        assert_eq!(
            text,
            "✗ Reservation RES9999 not found. Please check the ID and try again."
        );
    }
}
