//! Shared helper functions for CLI commands

use tablebook_core::{
    api::{ApiServerConfig, EventBroadcaster},
    error::Result,
    ReservationService, Settings,
};
use std::sync::Arc;
use tracing::debug;

/// Build the process-wide service from settings
///
/// With `with_events` the service publishes booking activity for the
/// HTTP API's `/events` stream.
pub fn build_service(settings: &Settings, with_events: bool) -> Result<Arc<ReservationService>> {
    let catalog = settings.catalog()?;
    debug!(
        "Catalog: {} tables, {} time slots",
        catalog.tables().len(),
        catalog.time_slots().len()
    );

    let events = with_events.then(|| EventBroadcaster::new(settings.api.event_capacity));

    Ok(Arc::new(ReservationService::new_with_events(
        catalog,
        settings.booking_policy(),
        events,
    )))
}

/// API config from settings, with an optional `--addr` override
pub fn api_config(settings: &Settings, addr: Option<String>) -> Result<ApiServerConfig> {
    let mut settings = settings.clone();
    if let Some(addr) = addr {
        settings.api.addr = addr;
    }
    ApiServerConfig::from_settings(&settings)
}
