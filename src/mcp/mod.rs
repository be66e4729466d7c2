//! SSH diagnostics served over the Model Context Protocol.
//!
//! The crate is layered bottom-up:
//!
//! - [`exec`] and [`probe`]: subprocess execution and raw TCP probing,
//!   the only places that touch processes or sockets
//! - [`handlers`]: the five stateless diagnostic tools
//! - [`schema`] and [`registry`]: tool declarations and the validating
//!   dispatcher
//! - [`server`]: the JSON-RPC 2.0 transport adapter
//!
//! Requests are handled strictly one at a time; any parallelism (port
//! scans) lives inside a single handler invocation.

pub mod config;
pub mod error;
pub mod exec;
pub mod handlers;
pub mod probe;
pub mod registry;
pub mod schema;
pub mod server;
pub mod types;

pub use registry::ToolRegistry;
pub use server::McpServer;
