//! HTTP API server with SSE support
//!
//! Routes:
//! - `GET /health`, `GET /catalog`
//! - `POST /rpc`: one JSON-RPC message per request
//! - `GET /sse` + `POST /messages?session_id=..`: MCP over SSE
//! - `POST /tools/:name`: REST adapter over the tool layer
//! - `GET /events`: reservation activity stream

use super::events::{Event, EventBroadcaster};
use crate::config::Settings;
use crate::error::{ErrorKind, TablebookError};
use crate::ledger::LedgerStats;
use crate::mcp::{JsonRpcResponse, McpServer, ToolHandler};
use crate::service::ReservationService;
use crate::types::{ReservationQuery, StatusFilter, Table, TimeSlot};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event as SseEvent, KeepAlive},
        IntoResponse, Response, Sse,
    },
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    convert::Infallible,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::sync::mpsc;
use tokio_stream::{
    wrappers::{BroadcastStream, ReceiverStream},
    StreamExt as _,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

/// Pending responses per MCP-over-SSE session
const SESSION_BUFFER: usize = 32;

/// Alternative ports tried when the configured one is taken
const PORT_FALLBACK_RANGE: u16 = 10;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Server address
    pub addr: SocketAddr,
    /// Event channel capacity
    pub event_capacity: usize,
    /// Interval between heartbeat events
    pub heartbeat_interval: Duration,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            addr: ([127, 0, 0, 1], 3000).into(),
            event_capacity: 1000,
            heartbeat_interval: Duration::from_secs(10),
        }
    }
}

impl ApiServerConfig {
    pub fn from_settings(settings: &Settings) -> crate::error::Result<Self> {
        Ok(Self {
            addr: settings.api_addr()?,
            event_capacity: settings.api.event_capacity,
            heartbeat_interval: Duration::from_secs(settings.api.heartbeat_secs.max(1)),
        })
    }
}

/// Open MCP-over-SSE sessions keyed by session id
#[derive(Clone, Default)]
struct SessionRegistry {
    inner: Arc<Mutex<HashMap<String, mpsc::Sender<JsonRpcResponse>>>>,
}

impl SessionRegistry {
    fn insert(&self, id: String, tx: mpsc::Sender<JsonRpcResponse>) {
        self.lock().insert(id, tx);
    }

    fn get(&self, id: &str) -> Option<mpsc::Sender<JsonRpcResponse>> {
        self.lock().get(id).cloned()
    }

    fn remove(&self, id: &str) {
        self.lock().remove(id);
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, mpsc::Sender<JsonRpcResponse>>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Removes a session from the registry when its stream is dropped
struct SessionGuard {
    id: String,
    sessions: SessionRegistry,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.sessions.remove(&self.id);
        debug!("MCP session {} closed", self.id);
    }
}

/// API server state
#[derive(Clone)]
struct AppState {
    service: Arc<ReservationService>,
    mcp: Arc<McpServer>,
    events: EventBroadcaster,
    sessions: SessionRegistry,
    instance_id: String,
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    service: Arc<ReservationService>,
    mcp: Arc<McpServer>,
    events: EventBroadcaster,
    sessions: SessionRegistry,
    instance_id: String,
    /// Shutdown signal for background tasks
    shutdown_tx: tokio::sync::broadcast::Sender<()>,
    /// Heartbeat task handle for cleanup
    heartbeat_handle: Option<tokio::task::JoinHandle<()>>,
}

impl ApiServer {
    /// Create new API server over a shared service
    ///
    /// Reuses the service's broadcaster so booking activity reaches
    /// `/events`; a service without one gets a private channel.
    pub fn new(config: ApiServerConfig, service: Arc<ReservationService>) -> Self {
        let events = service
            .events()
            .cloned()
            .unwrap_or_else(|| EventBroadcaster::new(config.event_capacity));
        let mcp = Arc::new(McpServer::new(ToolHandler::new(service.clone())));
        let instance_id = uuid::Uuid::new_v4().to_string()[..8].to_string();

        // Create shutdown channel for graceful task termination
        let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);

        Self {
            config,
            service,
            mcp,
            events,
            sessions: SessionRegistry::default(),
            instance_id,
            shutdown_tx,
            heartbeat_handle: None,
        }
    }

    /// Get event broadcaster
    pub fn broadcaster(&self) -> &EventBroadcaster {
        &self.events
    }

    /// Get instance ID
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Build the router
    pub fn router(&self) -> Router {
        let state = AppState {
            service: self.service.clone(),
            mcp: self.mcp.clone(),
            events: self.events.clone(),
            sessions: self.sessions.clone(),
            instance_id: self.instance_id.clone(),
        };

        Router::new()
            .route("/health", get(health_handler))
            .route("/catalog", get(catalog_handler))
            // MCP transports
            .route("/rpc", post(rpc_handler))
            .route("/sse", get(sse_handler))
            .route("/messages", post(messages_handler))
            // REST tools
            .route("/tools/:name", post(tool_handler))
            // Activity stream
            .route("/events", get(events_handler))
            .with_state(state)
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Start serving with dynamic port allocation
    ///
    /// Tries the configured address first, then the next few ports if it
    /// is already taken.
    pub async fn serve(mut self) -> anyhow::Result<()> {
        let router = self.router();

        let _ = self
            .events
            .broadcast(Event::session_started(self.instance_id.clone()));

        let events = self.events.clone();
        let instance_id = self.instance_id.clone();
        let period = self.config.heartbeat_interval;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let heartbeat_handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let _ = events.broadcast(Event::heartbeat(instance_id.clone()));
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Heartbeat task received shutdown signal");
                        break;
                    }
                }
            }
        });
        self.heartbeat_handle = Some(heartbeat_handle);

        let listener = bind_with_fallback(self.config.addr).await?;
        let local_addr = listener.local_addr()?;
        info!(
            "API server [{}] listening on http://{}",
            self.instance_id, local_addr
        );

        axum::serve(listener, router).await?;
        Ok(())
    }
}

async fn bind_with_fallback(addr: SocketAddr) -> anyhow::Result<tokio::net::TcpListener> {
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => return Ok(listener),
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            debug!("Port {} in use, trying alternative ports...", addr.port());
        }
        Err(e) => return Err(e.into()),
    }

    let base_port = addr.port();
    for offset in 1..=PORT_FALLBACK_RANGE {
        let Some(alt_port) = base_port.checked_add(offset) else {
            break;
        };
        let alt_addr = SocketAddr::new(addr.ip(), alt_port);

        match tokio::net::TcpListener::bind(alt_addr).await {
            Ok(listener) => {
                warn!("Port {} in use, using {} instead", base_port, alt_port);
                return Ok(listener);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(anyhow::anyhow!(
        "All ports ({}-{}) are in use",
        base_port,
        base_port.saturating_add(PORT_FALLBACK_RANGE)
    ))
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub instance_id: String,
    pub subscribers: usize,
    pub sessions: usize,
    pub reservations: LedgerStats,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        instance_id: state.instance_id.clone(),
        subscribers: state.events.subscriber_count(),
        sessions: state.sessions.len(),
        reservations: state.service.stats().await,
    })
}

#[derive(Debug, Serialize)]
struct CatalogResponse<'a> {
    tables: &'a [Table],
    time_slots: &'a [TimeSlot],
}

async fn catalog_handler(State(state): State<AppState>) -> Response {
    let catalog = state.service.catalog();
    Json(CatalogResponse {
        tables: catalog.tables(),
        time_slots: catalog.time_slots(),
    })
    .into_response()
}

/// Single JSON-RPC exchange over plain HTTP
async fn rpc_handler(State(state): State<AppState>, body: String) -> Response {
    match state.mcp.handle_message(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Open an MCP-over-SSE session
///
/// The first event (`endpoint`) carries the URL to POST messages to; each
/// JSON-RPC response then arrives as a `message` event.
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let session_id = uuid::Uuid::new_v4().simple().to_string();
    let (tx, rx) = mpsc::channel(SESSION_BUFFER);
    state.sessions.insert(session_id.clone(), tx);
    info!("MCP session {} opened", session_id);

    let guard = SessionGuard {
        id: session_id.clone(),
        sessions: state.sessions.clone(),
    };

    let endpoint = tokio_stream::once(Ok(SseEvent::default()
        .event("endpoint")
        .data(format!("/messages?session_id={}", session_id))));

    let messages = ReceiverStream::new(rx).map(move |response| {
        let _session = &guard;
        let data = serde_json::to_string(&response).unwrap_or_else(|e| {
            warn!("Failed to serialize session response: {}", e);
            "{}".to_string()
        });
        Ok(SseEvent::default().event("message").data(data))
    });

    Sse::new(endpoint.chain(messages)).keep_alive(KeepAlive::default())
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    session_id: String,
}

async fn messages_handler(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> StatusCode {
    let Some(sender) = state.sessions.get(&query.session_id) else {
        debug!("Message for unknown session {}", query.session_id);
        return StatusCode::NOT_FOUND;
    };

    if let Some(response) = state.mcp.handle_message(&body).await {
        if sender.send(response).await.is_err() {
            debug!("Session {} closed before reply", query.session_id);
            return StatusCode::GONE;
        }
    }

    StatusCode::ACCEPTED
}

/// REST adapter: `POST /tools/:name` with the arguments as the JSON body
async fn tool_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    let arguments = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => value,
            Err(e) => {
                return error_response(&TablebookError::invalid_argument(format!(
                    "request body is not valid JSON: {}",
                    e
                )))
            }
        }
    };

    match state.mcp.tool_handler().execute(&name, arguments).await {
        Ok(reply) => Json(json!({
            "tool": name,
            "text": reply.text,
            "data": reply.data,
        }))
        .into_response(),
        Err(e) => {
            if !e.is_expected() {
                warn!("Tool {} failed: {}", name, e);
            }
            error_response(&e)
        }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidArgument | ErrorKind::InvalidTimeSlot => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::NoAvailability | ErrorKind::AlreadyCancelled => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &TablebookError) -> Response {
    let kind = error.kind();
    let mut body = json!({
        "error": {
            "kind": kind,
            "message": error.to_string(),
        }
    });
    if let TablebookError::NoAvailability { alternatives, .. } = error {
        body["alternatives"] = json!(alternatives);
    }

    (status_for(kind), Json(body)).into_response()
}

/// SSE events handler
///
/// Late subscribers first get one `reservation_booked` event per active
/// reservation, then the live stream.
async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    // Subscribe before the snapshot so nothing falls between the two
    let rx = state.events.subscribe();

    let active = state
        .service
        .view(&ReservationQuery::all().with_status(StatusFilter::Active))
        .await;
    debug!("New SSE client connected, snapshot of {} reservations", active.len());

    let snapshot_events: Vec<Result<SseEvent, Infallible>> = active
        .iter()
        .map(Event::reservation_booked)
        .filter_map(|event| to_sse_event(&event))
        .map(Ok)
        .collect();

    let live_event_stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => to_sse_event(&event).map(Ok),
        Err(_) => None, // Skip lagged messages
    });

    let combined_stream = tokio_stream::iter(snapshot_events).chain(live_event_stream);

    Sse::new(combined_stream).keep_alive(KeepAlive::default())
}

fn to_sse_event(event: &Event) -> Option<SseEvent> {
    let data = serde_json::to_string(event).ok()?;
    Some(
        SseEvent::default()
            .event(event.name())
            .data(data)
            .id(event.id.clone()),
    )
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());

        if let Some(handle) = self.heartbeat_handle.take() {
            handle.abort();
            debug!("ApiServer dropped - heartbeat task aborted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::workflow::BookingPolicy;

    #[tokio::test]
    async fn test_server_shares_service_broadcaster() {
        let events = EventBroadcaster::new(8);
        let _rx = events.subscribe();
        let service = Arc::new(ReservationService::new_with_events(
            Catalog::default(),
            BookingPolicy::default(),
            Some(events),
        ));

        let server = ApiServer::new(ApiServerConfig::default(), service);
        assert_eq!(server.broadcaster().subscriber_count(), 1);
        assert_eq!(server.instance_id().len(), 8);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::InvalidTimeSlot), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::AlreadyCancelled), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::Internal), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_session_guard_unregisters() {
        let sessions = SessionRegistry::default();
        let (tx, _rx) = mpsc::channel(1);
        sessions.insert("abc".to_string(), tx);
        assert_eq!(sessions.len(), 1);

        drop(SessionGuard {
            id: "abc".to_string(),
            sessions: sessions.clone(),
        });
        assert!(sessions.get("abc").is_none());
    }

    #[test]
    fn test_config_from_settings() {
        let config = ApiServerConfig::from_settings(&Settings::default()).unwrap();
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.heartbeat_interval, Duration::from_secs(10));
    }
}
