//! MCP (Model Context Protocol) server implementation
//!
//! Exposes the context operations over stdio for editor integration.

mod server;
mod tools;
mod types;

pub use server::McpServer;
pub use tools::{get_tool_definitions, handle_tool_call};
pub use types::{McpError, McpMessage, McpRequest, McpResponse, ToolResult};
