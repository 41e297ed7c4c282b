//! Common test utilities and helpers

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use tablebook_core::{
    api::{ApiServer, ApiServerConfig, EventBroadcaster},
    BookingPolicy, BookingRequest, Catalog, McpServer, ReservationService, ToolHandler,
};

/// Date used across the booking scenarios
pub const DATE: &str = "2025-11-15";

/// Service over the reference catalog with an empty ledger
pub fn reference_service() -> Arc<ReservationService> {
    Arc::new(ReservationService::default())
}

/// Service that publishes activity on the returned broadcaster
pub fn service_with_events() -> (Arc<ReservationService>, EventBroadcaster) {
    let events = EventBroadcaster::new(64);
    let service = ReservationService::new_with_events(
        Catalog::default(),
        BookingPolicy::default(),
        Some(events.clone()),
    );
    (Arc::new(service), events)
}

pub fn mcp_server(service: Arc<ReservationService>) -> McpServer {
    McpServer::new(ToolHandler::new(service))
}

/// API server bound to nothing; use `router()` with `oneshot`
pub fn api_server() -> (ApiServer, Arc<ReservationService>) {
    let (service, _events) = service_with_events();
    let server = ApiServer::new(ApiServerConfig::default(), service.clone());
    (server, service)
}

pub fn request(name: &str, time_slot: &str, party_size: i64) -> BookingRequest {
    BookingRequest::new(name, DATE, time_slot, party_size)
}

/// JSON-RPC `tools/call` message
pub fn tool_call(id: i64, name: &str, arguments: Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {
            "name": name,
            "arguments": arguments
        }
    })
    .to_string()
}
