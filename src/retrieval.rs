//! Document-style projection for retrieval clients
//!
//! `search` returns lightweight references and `fetch` resolves one into a
//! rendered record. Both are read-only views over the ledger and catalog.

use crate::catalog::Catalog;
use crate::error::{Result, TablebookError};
use crate::ledger::Ledger;
use crate::types::{Reservation, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Search result reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub url: String,
}

/// A fully rendered record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub text: String,
    pub url: String,
    pub metadata: BTreeMap<String, String>,
}

/// Reservations whose customer name, date or status contains `query`
///
/// Matching is case-insensitive; an empty query matches everything.
pub fn search(ledger: &Ledger, query: &str) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();

    ledger
        .iter()
        .filter(|r| {
            r.customer_name.to_lowercase().contains(&needle)
                || r.date.to_lowercase().contains(&needle)
                || r.status.as_str().contains(&needle)
        })
        .map(|r| SearchHit {
            id: r.id.to_string(),
            title: reservation_title(r),
            url: reservation_url(r),
        })
        .collect()
}

/// Resolve `RES####` or `table-<N>`
pub fn fetch(catalog: &Catalog, ledger: &Ledger, reference: &str) -> Result<Document> {
    let reference = reference.trim();

    if let Some(number) = reference
        .strip_prefix("table-")
        .or_else(|| reference.strip_prefix("TABLE-"))
    {
        let table = number
            .parse::<u32>()
            .ok()
            .and_then(|n| catalog.table(n))
            .ok_or_else(|| TablebookError::TableNotFound(reference.to_string()))?;
        return Ok(table_document(table, ledger));
    }

    let id = reference.to_uppercase();
    ledger
        .get(&id)
        .map(|r| reservation_document(catalog, r))
        .ok_or(TablebookError::ReservationNotFound(id))
}

fn reservation_title(reservation: &Reservation) -> String {
    format!(
        "Reservation {}: {}, party of {} on {} at {}",
        reservation.id,
        reservation.customer_name,
        reservation.party_size,
        reservation.date,
        reservation.time_slot
    )
}

fn reservation_url(reservation: &Reservation) -> String {
    format!("reservation://{}", reservation.id)
}

fn reservation_document(catalog: &Catalog, reservation: &Reservation) -> Document {
    let table = catalog
        .table(reservation.table_number)
        .map(Table::to_string)
        .unwrap_or_else(|| format!("Table {}", reservation.table_number));

    let mut lines = vec![
        format!("Reservation ID: {}", reservation.id),
        format!("Customer: {}", reservation.customer_name),
        format!("Date: {}", reservation.date),
        format!("Time: {}", reservation.time_slot),
        format!("Party Size: {} people", reservation.party_size),
        format!("Table: {}", table),
        format!("Status: {}", reservation.status),
    ];
    if let Some(phone) = &reservation.contact.phone {
        lines.push(format!("Phone: {}", phone));
    }
    if let Some(email) = &reservation.contact.email {
        lines.push(format!("Email: {}", email));
    }
    if let Some(notes) = &reservation.contact.notes {
        lines.push(format!("Notes: {}", notes));
    }

    let mut metadata = BTreeMap::new();
    metadata.insert("kind".to_string(), "reservation".to_string());
    metadata.insert("status".to_string(), reservation.status.to_string());
    metadata.insert("date".to_string(), reservation.date.clone());
    metadata.insert("time_slot".to_string(), reservation.time_slot.to_string());
    metadata.insert("table".to_string(), reservation.table_number.to_string());
    metadata.insert("created_at".to_string(), reservation.created_at.to_rfc3339());

    Document {
        id: reservation.id.to_string(),
        title: reservation_title(reservation),
        text: lines.join("\n"),
        url: reservation_url(reservation),
        metadata,
    }
}

fn table_document(table: &Table, ledger: &Ledger) -> Document {
    let bookings: Vec<&Reservation> = ledger
        .iter()
        .filter(|r| r.is_active() && r.table_number == table.number)
        .collect();

    let mut text = format!("{}\n", table);
    if bookings.is_empty() {
        text.push_str("No active reservations.");
    } else {
        text.push_str(&format!("Active reservations ({}):", bookings.len()));
        for r in &bookings {
            text.push_str(&format!(
                "\n- {} {} {}: {} (party of {})",
                r.id, r.date, r.time_slot, r.customer_name, r.party_size
            ));
        }
    }

    let mut metadata = BTreeMap::new();
    metadata.insert("kind".to_string(), "table".to_string());
    metadata.insert("capacity".to_string(), table.capacity.to_string());
    if let Some(location) = &table.location {
        metadata.insert("location".to_string(), location.clone());
    }
    metadata.insert("active_reservations".to_string(), bookings.len().to_string());

    Document {
        id: table.reference(),
        title: table.to_string(),
        text,
        url: format!("table://{}", table.number),
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BookingRequest;
    use crate::workflow::{self, BookingPolicy};
    use chrono::Utc;

    fn ledger_with(bookings: &[(&str, &str, &str)]) -> (Catalog, Ledger) {
        let catalog = Catalog::reference();
        let mut ledger = Ledger::new();
        for (name, date, slot) in bookings {
            workflow::book(
                &catalog,
                &mut ledger,
                &BookingRequest::new(*name, *date, *slot, 2),
                &BookingPolicy::default(),
                Utc::now(),
            )
            .unwrap();
        }
        (catalog, ledger)
    }

    #[test]
    fn test_search_matches_name_date_and_status() {
        let (_, mut ledger) = ledger_with(&[
            ("Alice Smith", "2025-11-15", "19:00"),
            ("Bob Jones", "2025-11-16", "19:00"),
        ]);
        ledger.cancel("RES0002", Utc::now()).unwrap();

        let ids = |hits: Vec<SearchHit>| hits.into_iter().map(|h| h.id).collect::<Vec<_>>();

        assert_eq!(ids(search(&ledger, "alice")), vec!["RES0001"]);
        assert_eq!(ids(search(&ledger, "2025-11-16")), vec!["RES0002"]);
        assert_eq!(ids(search(&ledger, "2025-11")), vec!["RES0001", "RES0002"]);
        assert_eq!(ids(search(&ledger, "cancel")), vec!["RES0002"]);
        assert_eq!(ids(search(&ledger, "ACTIVE")), vec!["RES0001"]);
        assert!(search(&ledger, "nobody").is_empty());
    }

    #[test]
    fn test_search_hit_shape() {
        let (_, ledger) = ledger_with(&[("Alice", "2025-11-15", "19:00")]);
        let hit = &search(&ledger, "")[0];

        assert_eq!(hit.url, "reservation://RES0001");
        assert!(hit.title.contains("Alice"));
    }

    #[test]
    fn test_fetch_reservation() {
        let (catalog, ledger) = ledger_with(&[("Alice", "2025-11-15", "19:00")]);

        let doc = fetch(&catalog, &ledger, " res0001 ").unwrap();
        assert_eq!(doc.id, "RES0001");
        assert!(doc.text.contains("Table: Table 1 (2 seats, Window)"));
        assert_eq!(doc.metadata["status"], "active");
    }

    #[test]
    fn test_fetch_table() {
        let (catalog, ledger) = ledger_with(&[("Alice", "2025-11-15", "19:00")]);

        let doc = fetch(&catalog, &ledger, "table-1").unwrap();
        assert_eq!(doc.id, "table-1");
        assert_eq!(doc.url, "table://1");
        assert!(doc.text.contains("RES0001"));
        assert_eq!(doc.metadata["active_reservations"], "1");

        let empty = fetch(&catalog, &ledger, "table-6").unwrap();
        assert!(empty.text.contains("No active reservations."));
    }

    #[test]
    fn test_fetch_unknown_references() {
        let (catalog, ledger) = ledger_with(&[]);

        assert!(matches!(
            fetch(&catalog, &ledger, "RES9999"),
            Err(TablebookError::ReservationNotFound(_))
        ));
        assert!(matches!(
            fetch(&catalog, &ledger, "table-99"),
            Err(TablebookError::TableNotFound(_))
        ));
        assert!(matches!(
            fetch(&catalog, &ledger, "table-x"),
            Err(TablebookError::TableNotFound(_))
        ));
    }
}
