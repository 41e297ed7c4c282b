//! MCP server startup command

use super::helpers::{api_config, build_service};
use tablebook_core::{
    api::ApiServer,
    error::Result,
    mcp::{McpServer, ToolHandler},
    Settings,
};
use tracing::{debug, info};

/// Serve MCP over stdio, optionally alongside the HTTP API
pub async fn handle(settings: &Settings, with_api: bool, addr: Option<String>) -> Result<()> {
    debug!("Starting MCP server...");

    let service = build_service(settings, with_api)?;
    let server = McpServer::new(ToolHandler::new(service.clone()));

    if !with_api {
        tokio::select! {
            result = server.run() => {
                result?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal, stopping MCP server gracefully...");
            }
        }

        info!("MCP server shut down complete");
        return Ok(());
    }

    let api_server = ApiServer::new(api_config(settings, addr)?, service);

    tokio::select! {
        result = server.run() => {
            result?;
        }
        result = api_server.serve() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, stopping MCP server and API server gracefully...");
        }
    }

    info!("MCP server and API server shut down complete");
    Ok(())
}
