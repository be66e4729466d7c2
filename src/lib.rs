//! SSH diagnostics MCP server.
//!
//! Exposes connection checks, config generation, key inventory, security
//! audits, and port scanning as MCP tools over a stdio JSON-RPC
//! transport. The server holds no session state: every tool call stands
//! alone and releases its resources before the response is written.

pub mod mcp;

pub use mcp::{McpServer, ToolRegistry};
