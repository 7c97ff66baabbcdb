//! MCP (Model Context Protocol) implementation.

mod handlers;
pub mod health;
pub mod server;
mod tools;

pub use server::McpServer;
pub use tools::{Tool, ToolError, ToolHandler, ToolRegistry};
