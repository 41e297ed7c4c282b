//! HTTP API for reservations, MCP over HTTP/SSE, and activity streaming
//!
//! Provides:
//! - JSON-RPC over `POST /rpc` and MCP over SSE sessions
//! - REST tool endpoints
//! - Server-Sent Events (SSE) for booking activity

pub mod events;
pub mod server;

pub use events::{Event, EventBroadcaster, EventType};
pub use server::{ApiServer, ApiServerConfig, HealthResponse};
