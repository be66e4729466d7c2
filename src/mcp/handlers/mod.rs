//! Diagnostic tool handlers.
//!
//! Each handler is a stateless async function from a validated argument
//! map to a JSON payload. Handlers open and release their own process and
//! socket handles per invocation; nothing is shared across calls.
//!
//! - `connection`: TCP reachability plus non-interactive auth probe
//! - `config_gen`: deterministic SSH config stanza synthesis
//! - `keys`: key directory inventory with per-entry failure reporting
//! - `audit`: fixed battery of security checks
//! - `scan`: bounded-concurrency port scanning

pub mod audit;
pub mod config_gen;
pub mod connection;
pub mod keys;
pub mod scan;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::error::ToolError;

/// Bind a validated argument map to a typed parameter struct.
///
/// The dispatcher has already checked presence and JSON types against the
/// descriptor; this is the final typed binding (e.g. range-checking a port
/// into a `u16`), so failures still surface as `InvalidArguments`.
pub(crate) fn parse_args<T: DeserializeOwned>(
    args: serde_json::Map<String, Value>,
) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Serialize a response type into the success payload.
pub(crate) fn to_payload<T: Serialize>(response: &T) -> Result<Value, ToolError> {
    serde_json::to_value(response).map_err(|e| ToolError::InternalError(e.to_string()))
}
