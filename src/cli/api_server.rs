//! HTTP API server command

use super::helpers::{api_config, build_service};
use tablebook_core::{api::ApiServer, error::Result, Settings};
use tracing::{debug, info};

/// Handle API server startup command
pub async fn handle(settings: &Settings, addr: Option<String>) -> Result<()> {
    debug!("Starting HTTP API server...");

    let config = api_config(settings, addr)?;
    let service = build_service(settings, true)?;

    eprintln!();
    eprintln!("tablebook API server");
    eprintln!("   Address: http://{}", config.addr);
    eprintln!("   Event capacity: {}", config.event_capacity);
    eprintln!();
    eprintln!("   Endpoints:");
    eprintln!("   - GET  /health         - Health check");
    eprintln!("   - GET  /catalog        - Tables and time slots");
    eprintln!("   - POST /rpc            - JSON-RPC (MCP)");
    eprintln!("   - GET  /sse            - MCP over SSE");
    eprintln!("   - POST /tools/:name    - Call a tool with a JSON body");
    eprintln!("   - GET  /events         - Reservation activity stream");
    eprintln!();

    let server = ApiServer::new(config, service);

    tokio::select! {
        result = server.serve() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, stopping API server gracefully...");
        }
    }

    Ok(())
}
