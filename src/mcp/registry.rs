//! Tool registry and request dispatcher.
//!
//! The registry is built once at startup and never mutated afterwards.
//! Dispatch validates arguments against the tool's descriptor before the
//! handler runs, so handlers only ever see declared, type-checked
//! parameters. Each handler runs in its own task: a panic is contained
//! and converted to an internal error instead of taking the server down.

use std::future::Future;
use std::pin::Pin;

use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use super::error::ToolError;
use super::handlers;
use super::schema::ToolDescriptor;
use super::types::{ToolRequest, ToolResult};

/// A tool handler: validated argument map in, JSON payload out.
pub type HandlerFn =
    fn(Map<String, Value>) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send>>;

struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: HandlerFn,
}

/// Immutable mapping from tool name to descriptor and handler.
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// The five built-in diagnostic tools.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(handlers::connection::descriptor(), |args| {
            Box::pin(handlers::connection::check_ssh_connection(args))
        });
        registry.register(handlers::config_gen::descriptor(), |args| {
            Box::pin(handlers::config_gen::generate_ssh_config(args))
        });
        registry.register(handlers::keys::descriptor(), |args| {
            Box::pin(handlers::keys::list_ssh_keys(args))
        });
        registry.register(handlers::audit::descriptor(), |args| {
            Box::pin(handlers::audit::ssh_security_audit(args))
        });
        registry.register(handlers::scan::descriptor(), |args| {
            Box::pin(handlers::scan::port_scanner(args))
        });
        registry
    }

    pub fn register(&mut self, descriptor: ToolDescriptor, handler: HandlerFn) {
        self.tools.push(RegisteredTool {
            descriptor,
            handler,
        });
    }

    /// Descriptors in registration order, for tool listings.
    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter().map(|tool| &tool.descriptor)
    }

    /// Validate and execute one tool request.
    ///
    /// Never returns a transport-level error: every failure mode maps to a
    /// `ToolResult::Failure` the caller can serialize as-is.
    pub async fn dispatch(&self, request: ToolRequest) -> ToolResult {
        let Some(tool) = self
            .tools
            .iter()
            .find(|tool| tool.descriptor.name == request.name)
        else {
            warn!("dispatch of unknown tool '{}'", request.name);
            return ToolError::UnknownTool(request.name).into();
        };

        let args = match tool.descriptor.validate(&request.arguments) {
            Ok(args) => args,
            Err(e) => {
                warn!("invalid arguments for '{}': {}", request.name, e);
                return e.into();
            }
        };

        debug!("dispatching '{}'", request.name);
        // Run the handler in its own task so a panic unwinds into a
        // JoinError here instead of tearing down the server loop.
        match tokio::spawn((tool.handler)(args)).await {
            Ok(Ok(payload)) => ToolResult::Success { payload },
            Ok(Err(e)) => {
                debug!("'{}' failed: {}", request.name, e);
                e.into()
            }
            Err(join_err) => {
                error!("handler for '{}' panicked: {}", request.name, join_err);
                ToolError::InternalError(format!("tool '{}' panicked", request.name)).into()
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
