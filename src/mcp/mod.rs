//! Model Context Protocol (MCP) server implementation
//!
//! JSON-RPC 2.0 over stdio, plus the tool layer reused by the HTTP
//! transports. Exposes the seven reservation tools.

pub mod input;
pub mod protocol;
pub mod render;
pub mod server;
pub mod tools;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallResult};
pub use server::McpServer;
pub use tools::{Tool, ToolHandler, ToolReply};
