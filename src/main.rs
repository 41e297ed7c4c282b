//! tablebook - restaurant table reservations over MCP
//!
//! Entry point for the stdio MCP server, the HTTP API, and the small
//! inspection commands.

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tablebook_core::{error::Result, Settings};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tablebook")]
#[command(about = "Restaurant table reservations as MCP tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (TOML)
    #[arg(long, global = true, env = "TABLEBOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Set log level (overrides the configured filter; RUST_LOG wins over both)
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server (stdio mode)
    Serve {
        /// Also start the HTTP API sharing the same reservations
        #[arg(long)]
        with_api: bool,

        /// API server address (when --with-api is enabled)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Start the HTTP API server only
    Api {
        /// Server address
        #[arg(long)]
        addr: Option<String>,
    },

    /// Show tables and time slots
    Catalog,

    /// Show the effective configuration
    Config,
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},tokio::sync::broadcast=error,tokio_stream=error",
            filter
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // stdout carries JSON-RPC
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;
    let filter = cli
        .log_level
        .clone()
        .unwrap_or_else(|| settings.logging.filter.clone());
    init_tracing(&filter);

    debug!("tablebook v{} starting...", env!("CARGO_PKG_VERSION"));

    match cli.command.unwrap_or(Commands::Serve {
        with_api: false,
        addr: None,
    }) {
        Commands::Serve { with_api, addr } => cli::serve::handle(&settings, with_api, addr).await,
        Commands::Api { addr } => cli::api_server::handle(&settings, addr).await,
        Commands::Catalog => cli::catalog::handle(&settings).await,
        Commands::Config => cli::config::handle(&settings).await,
    }
}
