//! Typed error taxonomy for tool dispatch and execution.
//!
//! Every failure that crosses the dispatcher boundary is one of these
//! variants. The wire representation is the stable snake_case string from
//! [`ToolError::kind`] plus the display message, so callers can branch on
//! the kind without parsing prose.
//!
//! # Policy
//!
//! - Validation errors (`UnknownTool`, `InvalidArguments`) are produced
//!   before a handler runs; no side effects have occurred.
//! - Expected negative outcomes inside a handler (unreachable host, missing
//!   audit file) are *not* errors; they are reported as diagnostic data in a
//!   success payload. A `ToolError` means the request itself could not be
//!   fulfilled.
//! - Anything unexpected is folded into `InternalError` at the dispatcher
//!   boundary so a single bad request can never take the process down.

use std::time::Duration;

use thiserror::Error;

/// Failure modes for a tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool name is not in the registry.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The supplied arguments do not satisfy the tool's input schema.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// A bounded operation exceeded its wall-clock budget.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// A required file or directory does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A required file or directory is not accessible.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// An external process could not be started.
    #[error("failed to spawn process: {0}")]
    SpawnError(String),

    /// Catch-all for faults the dispatcher converts at its boundary.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl ToolError {
    /// Stable machine-readable kind string used in wire responses.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UnknownTool(_) => "unknown_tool",
            ToolError::InvalidArguments(_) => "invalid_arguments",
            ToolError::Timeout(_) => "timeout",
            ToolError::NotFound(_) => "not_found",
            ToolError::PermissionDenied(_) => "permission_denied",
            ToolError::SpawnError(_) => "spawn_error",
            ToolError::InternalError(_) => "internal_error",
        }
    }

    /// Map an I/O error to the taxonomy, keeping the path in the message.
    ///
    /// Only `NotFound` and `PermissionDenied` are meaningful to callers;
    /// everything else is an internal fault.
    pub fn from_io(context: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ToolError::NotFound(format!("{context}: {err}")),
            std::io::ErrorKind::PermissionDenied => {
                ToolError::PermissionDenied(format!("{context}: {err}"))
            }
            _ => ToolError::InternalError(format!("{context}: {err}")),
        }
    }
}
