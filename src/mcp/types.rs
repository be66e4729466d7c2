//! Serializable request, response, and result types for the diagnostic tools.
//!
//! All response types implement `Serialize`, `Deserialize`, and `JsonSchema`
//! for MCP protocol compatibility. Everything here is a read-only view
//! computed fresh per request; nothing is cached across invocations.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ToolError;

/// One tool invocation as received from the transport.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolRequest {
    /// Tool name to invoke
    pub name: String,
    /// Arguments mapping, validated against the tool's descriptor before execution
    #[serde(default)]
    pub arguments: serde_json::Map<String, Value>,
}

/// Outcome of one tool invocation. Exactly one variant, never both.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResult {
    /// The request was executed; the payload is the tool-specific result.
    Success { payload: Value },
    /// The request could not be fulfilled.
    Failure { kind: String, message: String },
}

impl ToolResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolResult::Success { .. })
    }
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        ToolResult::Failure {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Why a TCP probe did not reach its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProbeFailure {
    /// No response within the connect timeout
    Timeout,
    /// Connection actively refused (nothing listening)
    Refused,
    /// Host or network unreachable
    Unreachable,
    /// Hostname did not resolve
    ResolutionFailed,
}

impl std::fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeFailure::Timeout => write!(f, "timeout"),
            ProbeFailure::Refused => write!(f, "refused"),
            ProbeFailure::Unreachable => write!(f, "unreachable"),
            ProbeFailure::ResolutionFailed => write!(f, "resolution_failed"),
        }
    }
}

/// Result of a single transport-level reachability probe.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProbeOutcome {
    /// Whether a TCP connection was established
    pub reachable: bool,
    /// Connect latency in milliseconds (only when reachable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// Failure classification (only when unreachable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ProbeFailure>,
}

impl ProbeOutcome {
    pub fn reached(latency_ms: u64) -> Self {
        Self {
            reachable: true,
            latency_ms: Some(latency_ms),
            detail: None,
        }
    }

    pub fn unreached(detail: ProbeFailure) -> Self {
        Self {
            reachable: false,
            latency_ms: None,
            detail: Some(detail),
        }
    }
}

/// Stage at which a connection check concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckStage {
    /// The check stopped at the TCP reachability probe
    Network,
    /// The check proceeded to the non-interactive auth probe
    Auth,
}

/// Classification of the non-interactive `ssh` auth probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuthOutcome {
    /// The probe authenticated and exited cleanly
    Ok,
    /// The host answered but rejected the offered credentials
    AuthRequired,
    /// The probe failed for another reason (see detail)
    Failed,
    /// The probe did not finish within its timeout
    Timeout,
}

/// Result of the optional auth probe step of a connection check.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AuthProbe {
    pub result: AuthOutcome,
    /// Exit code of the ssh client, when it ran to completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Short excerpt of the probe's stderr, for human diagnosis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Response payload of `check_ssh_connection`.
///
/// An unreachable host is a *successful diagnosis*, not an error: the
/// response still arrives as a success with `reachable: false`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConnectionCheckResponse {
    pub host: String,
    pub port: u16,
    pub reachable: bool,
    /// Stage at which the check concluded
    pub stage: CheckStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// Probe failure classification when unreachable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ProbeFailure>,
    /// Auth probe result when the host was reachable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthProbe>,
}

/// Response payload of `generate_ssh_config`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SshConfigResponse {
    pub alias: String,
    /// The synthesized config stanza, byte-deterministic for identical inputs
    pub stanza: String,
}

/// One entry of a key directory inventory.
///
/// A file that could not be inspected carries its error inline instead of
/// failing the whole listing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KeyRecord {
    pub path: String,
    /// Key algorithm (e.g. "ED25519", "RSA") when it could be determined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Fingerprint as reported by `ssh-keygen -l`, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    pub is_private: bool,
    /// Octal permission mode (e.g. "600")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Per-entry failure detail; the rest of the listing is unaffected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response payload of `list_ssh_keys`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KeyListResponse {
    pub directory: String,
    pub keys: Vec<KeyRecord>,
    pub count: usize,
}

/// Severity of an audit finding. Ordering is ascending: info < warning < critical.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// One result item from a security audit check.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AuditFinding {
    /// Stable identifier of the check that produced this finding
    pub check_id: String,
    pub severity: Severity,
    pub description: String,
    /// Affected file or directory
    pub path: String,
    /// Affected line within the file, when applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Response payload of `ssh_security_audit`.
///
/// Always a success, even when the finding list is empty: "nothing found"
/// is itself a diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AuditResponse {
    pub target: String,
    /// Findings ordered by descending severity, then check id, then path
    pub findings: Vec<AuditFinding>,
    pub count: usize,
    /// When the audit ran (RFC3339 format)
    pub generated_at: String,
}

/// Reachability of a single scanned port.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PortProbe {
    pub port: u16,
    pub reachable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ProbeFailure>,
}

/// Response payload of `port_scanner`, ordered by port number.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PortScanResponse {
    pub host: String,
    pub ports: Vec<PortProbe>,
    /// Number of ports scanned
    pub count: usize,
    /// Number of ports that accepted a connection
    pub open_count: usize,
}
