//! tablebook - restaurant table reservations exposed as MCP tools
//!
//! A small booking engine for a fixed set of tables and daily time slots:
//! - Resource catalog (tables with capacities, the slot schedule)
//! - Append-only reservation ledger with sequential `RES####` ids
//! - Availability engine (lowest-numbered eligible table wins)
//! - Booking workflow (book, cancel, view)
//! - MCP tools over stdio, HTTP JSON-RPC and SSE, plus a REST adapter
//!
//! # Architecture
//!
//! - **Core**: `catalog`, `ledger`, `availability`, `workflow` are
//!   synchronous and take their state explicitly
//! - **Service**: `ReservationService` owns the ledger behind a lock and is
//!   shared by every transport
//! - **MCP / API**: protocol handling only; all tools go through one
//!   `ToolHandler`
//!
//! # Example
//!
//! ```ignore
//! use tablebook_core::{BookingRequest, ReservationService};
//!
//! #[tokio::main]
//! async fn main() -> tablebook_core::Result<()> {
//!     let service = ReservationService::default();
//!
//!     let reservation = service
//!         .book(BookingRequest::new("Ada", "2025-11-15", "19:00", 4))
//!         .await?;
//!     assert_eq!(reservation.table_number, 3);
//!
//!     service.cancel(reservation.id.as_str()).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod availability;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ledger;
pub mod mcp;
pub mod retrieval;
pub mod service;
pub mod types;
pub mod workflow;

// Re-export commonly used types
pub use catalog::Catalog;
pub use config::Settings;
pub use error::{ErrorKind, Result, TablebookError};
pub use ledger::{Ledger, LedgerStats};
pub use mcp::{McpServer, ToolHandler};
pub use service::ReservationService;
pub use types::{
    BookingRequest, ContactDetails, Reservation, ReservationId, ReservationQuery,
    ReservationStatus, StatusFilter, Table, TimeSlot,
};
pub use workflow::BookingPolicy;
