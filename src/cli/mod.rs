//! CLI command handlers
//!
//! Each subcommand is implemented in its own module.

pub mod api_server;
pub mod catalog;
pub mod config;
pub mod helpers;
pub mod serve;
