//! Reservation service
//!
//! Owns the catalog and the ledger for the lifetime of the process and is
//! shared by every transport. The ledger sits behind a single async
//! read/write lock: `book` and `cancel` hold the write guard for the whole
//! check-and-mutate step, queries share the read guard and always see a
//! consistent snapshot.

use crate::api::events::{Event, EventBroadcaster};
use crate::availability::Availability;
use crate::catalog::Catalog;
use crate::error::{Result, TablebookError};
use crate::ledger::{Ledger, LedgerStats};
use crate::retrieval::{self, Document, SearchHit};
use crate::types::{BookingRequest, Reservation, ReservationQuery, Table, TimeSlot};
use crate::workflow::{self, BookingPolicy};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Process-wide reservation state and the operations on it
pub struct ReservationService {
    catalog: Arc<Catalog>,
    ledger: RwLock<Ledger>,
    policy: BookingPolicy,
    events: Option<EventBroadcaster>,
}

impl ReservationService {
    /// Create a service with an empty ledger
    pub fn new(catalog: Catalog, policy: BookingPolicy) -> Self {
        Self {
            catalog: Arc::new(catalog),
            ledger: RwLock::new(Ledger::new()),
            policy,
            events: None,
        }
    }

    /// Create a service that publishes activity events
    pub fn new_with_events(
        catalog: Catalog,
        policy: BookingPolicy,
        events: Option<EventBroadcaster>,
    ) -> Self {
        Self {
            events,
            ..Self::new(catalog, policy)
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    pub fn events(&self) -> Option<&EventBroadcaster> {
        self.events.as_ref()
    }

    /// Free tables at `(date, time_slot)` for the party, lowest number first
    pub async fn available_tables(&self, date: &str, time_slot: &str, party_size: i64) -> Vec<Table> {
        let ledger = self.ledger.read().await;
        Availability::new(&self.catalog, &ledger)
            .available_tables(date, time_slot, party_size)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Slots on `date` that still have a table for the party
    pub async fn available_time_slots(&self, date: &str, party_size: i64) -> Vec<TimeSlot> {
        let ledger = self.ledger.read().await;
        Availability::new(&self.catalog, &ledger).available_time_slots(date, party_size)
    }

    /// Book a table
    pub async fn book(&self, request: BookingRequest) -> Result<Reservation> {
        let result = {
            let mut ledger = self.ledger.write().await;
            workflow::book(&self.catalog, &mut ledger, &request, &self.policy, Utc::now())
        };

        match &result {
            Ok(reservation) => {
                info!(
                    "Booked {} for {} (party of {}) at table {} on {} {}",
                    reservation.id,
                    reservation.customer_name,
                    reservation.party_size,
                    reservation.table_number,
                    reservation.date,
                    reservation.time_slot
                );
                self.publish(Event::reservation_booked(reservation));
            }
            Err(e) if e.is_expected() => {
                warn!("Booking rejected: {}", e);
                self.publish(Event::booking_rejected(
                    e.kind(),
                    request.date.clone(),
                    request.time_slot.clone(),
                    request.party_size,
                    e.to_string(),
                ));
            }
            Err(_) => {}
        }

        result
    }

    /// Cancel a reservation by id
    pub async fn cancel(&self, reservation_id: &str) -> Result<Reservation> {
        let result = {
            let mut ledger = self.ledger.write().await;
            workflow::cancel(&mut ledger, reservation_id, Utc::now())
        };

        match &result {
            Ok(reservation) => {
                info!("Cancelled {}", reservation.id);
                self.publish(Event::reservation_cancelled(reservation));
            }
            Err(e) => warn!("Cancellation of {} rejected: {}", reservation_id, e),
        }

        result
    }

    /// Filtered, sorted reservations
    pub async fn view(&self, query: &ReservationQuery) -> Vec<Reservation> {
        let ledger = self.ledger.read().await;
        workflow::view(&ledger, query)
    }

    /// Look up one reservation
    pub async fn reservation(&self, reservation_id: &str) -> Result<Reservation> {
        let ledger = self.ledger.read().await;
        ledger
            .get(reservation_id)
            .cloned()
            .ok_or_else(|| TablebookError::ReservationNotFound(reservation_id.to_string()))
    }

    /// Document search over reservations
    pub async fn search(&self, query: &str) -> Vec<SearchHit> {
        let ledger = self.ledger.read().await;
        retrieval::search(&ledger, query)
    }

    /// Resolve a reservation id or `table-<N>` reference
    pub async fn fetch(&self, reference: &str) -> Result<Document> {
        let ledger = self.ledger.read().await;
        retrieval::fetch(&self.catalog, &ledger, reference)
    }

    pub async fn stats(&self) -> LedgerStats {
        self.ledger.read().await.stats()
    }

    fn publish(&self, event: Event) {
        if let Some(events) = &self.events {
            if events.broadcast(event).is_err() {
                debug!("No subscribers for reservation event");
            }
        }
    }
}

impl Default for ReservationService {
    fn default() -> Self {
        Self::new(Catalog::default(), BookingPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::events::EventType;
    use crate::types::StatusFilter;

    #[tokio::test]
    async fn test_book_and_cancel() {
        let service = ReservationService::default();

        let reservation = service
            .book(BookingRequest::new("Ada", "2025-11-15", "19:00", 4))
            .await
            .unwrap();
        assert_eq!(reservation.table_number, 3);

        let tables = service.available_tables("2025-11-15", "19:00", 4).await;
        assert_eq!(tables.iter().map(|t| t.number).collect::<Vec<_>>(), vec![4, 5, 6]);

        service.cancel(reservation.id.as_str()).await.unwrap();
        let tables = service.available_tables("2025-11-15", "19:00", 4).await;
        assert_eq!(tables.first().unwrap().number, 3);

        let stats = service.stats().await;
        assert_eq!(stats.total, 1);
        assert_eq!(stats.cancelled, 1);
    }

    #[tokio::test]
    async fn test_reservation_lookup() {
        let service = ReservationService::default();
        service
            .book(BookingRequest::new("Ada", "2025-11-15", "19:00", 2))
            .await
            .unwrap();

        assert_eq!(service.reservation("RES0001").await.unwrap().customer_name, "Ada");
        assert!(matches!(
            service.reservation("RES0002").await,
            Err(TablebookError::ReservationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_events_published() {
        let events = EventBroadcaster::new(16);
        let mut rx = events.subscribe();
        let service = ReservationService::new_with_events(
            Catalog::default(),
            BookingPolicy::default(),
            Some(events),
        );

        let reservation = service
            .book(BookingRequest::new("Ada", "2025-11-15", "19:00", 2))
            .await
            .unwrap();
        service.cancel(reservation.id.as_str()).await.unwrap();
        let _ = service
            .book(BookingRequest::new("Bob", "2025-11-15", "23:59", 2))
            .await;

        let booked = rx.recv().await.unwrap();
        assert!(matches!(booked.event_type, EventType::ReservationBooked { .. }));
        let cancelled = rx.recv().await.unwrap();
        assert!(matches!(cancelled.event_type, EventType::ReservationCancelled { .. }));
        let rejected = rx.recv().await.unwrap();
        assert!(matches!(rejected.event_type, EventType::BookingRejected { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_bookings_never_double_book() {
        let service = Arc::new(ReservationService::default());

        let mut handles = Vec::new();
        for i in 0..16 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .book(BookingRequest::new(format!("Guest {}", i), "2025-11-15", "19:00", 8))
                    .await
            }));
        }

        let mut successes = 0;
        let mut no_availability = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(TablebookError::NoAvailability { .. }) => no_availability += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        // Only table 6 seats eight
        assert_eq!(successes, 1);
        assert_eq!(no_availability, 15);

        let active = service
            .view(&ReservationQuery::all().with_status(StatusFilter::Active))
            .await;
        assert_eq!(active.len(), 1);
    }
}
