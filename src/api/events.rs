//! Reservation activity events and the broadcaster feeding the SSE stream

use crate::error::ErrorKind;
use crate::types::Reservation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event type discriminant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventType {
    /// Reservation created
    ReservationBooked {
        reservation_id: String,
        table_number: u32,
        customer_name: String,
        date: String,
        time_slot: String,
        party_size: u32,
        timestamp: DateTime<Utc>,
    },
    /// Reservation cancelled
    ReservationCancelled {
        reservation_id: String,
        table_number: u32,
        date: String,
        time_slot: String,
        timestamp: DateTime<Utc>,
    },
    /// Booking request refused with an expected error
    BookingRejected {
        kind: ErrorKind,
        date: String,
        time_slot: String,
        party_size: i64,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    /// Server session started
    SessionStarted {
        #[serde(default)]
        instance_id: Option<String>,
        timestamp: DateTime<Utc>,
    },
    /// Heartbeat (published periodically)
    Heartbeat {
        #[serde(default)]
        instance_id: Option<String>,
        timestamp: DateTime<Utc>,
    },
}

/// Event wrapper with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Event ID (for deduplication)
    pub id: String,
    /// Event payload
    #[serde(flatten)]
    pub event_type: EventType,
}

impl Event {
    /// Create new event
    pub fn new(event_type: EventType) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type,
        }
    }

    /// Create reservation booked event
    pub fn reservation_booked(reservation: &Reservation) -> Self {
        Self::new(EventType::ReservationBooked {
            reservation_id: reservation.id.to_string(),
            table_number: reservation.table_number,
            customer_name: reservation.customer_name.clone(),
            date: reservation.date.clone(),
            time_slot: reservation.time_slot.to_string(),
            party_size: reservation.party_size,
            timestamp: reservation.created_at,
        })
    }

    /// Create reservation cancelled event
    pub fn reservation_cancelled(reservation: &Reservation) -> Self {
        Self::new(EventType::ReservationCancelled {
            reservation_id: reservation.id.to_string(),
            table_number: reservation.table_number,
            date: reservation.date.clone(),
            time_slot: reservation.time_slot.to_string(),
            timestamp: reservation.cancelled_at.unwrap_or_else(Utc::now),
        })
    }

    /// Create booking rejected event
    pub fn booking_rejected(
        kind: ErrorKind,
        date: String,
        time_slot: String,
        party_size: i64,
        reason: String,
    ) -> Self {
        Self::new(EventType::BookingRejected {
            kind,
            date,
            time_slot,
            party_size,
            reason,
            timestamp: Utc::now(),
        })
    }

    /// Create session started event
    pub fn session_started(instance_id: String) -> Self {
        Self::new(EventType::SessionStarted {
            instance_id: Some(instance_id),
            timestamp: Utc::now(),
        })
    }

    /// Create heartbeat event
    pub fn heartbeat(instance_id: String) -> Self {
        Self::new(EventType::Heartbeat {
            instance_id: Some(instance_id),
            timestamp: Utc::now(),
        })
    }

    /// Event name used as the SSE `event:` field
    pub fn name(&self) -> &'static str {
        match self.event_type {
            EventType::ReservationBooked { .. } => "reservation_booked",
            EventType::ReservationCancelled { .. } => "reservation_cancelled",
            EventType::BookingRejected { .. } => "booking_rejected",
            EventType::SessionStarted { .. } => "session_started",
            EventType::Heartbeat { .. } => "heartbeat",
        }
    }

    /// Render as a raw SSE frame
    pub fn to_sse(&self) -> String {
        let data = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("id: {}\nevent: {}\ndata: {}\n\n", self.id, self.name(), data)
    }
}

/// Event broadcaster for SSE subscribers
#[derive(Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<Event>,
}

impl EventBroadcaster {
    /// Create new broadcaster with channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Broadcast event to all subscribers
    pub fn broadcast(
        &self,
        event: Event,
    ) -> Result<usize, Box<broadcast::error::SendError<Event>>> {
        self.tx.send(event).map_err(Box::new)
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Get subscriber count
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(1000) // Default capacity: 1000 events
    }
}

impl std::fmt::Debug for EventBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBroadcaster")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
