//! `check_ssh_connection`: layered reachability diagnosis.
//!
//! Stage one is a raw TCP probe. An unreachable host concludes the check
//! at the network stage and is reported as a successful diagnosis, not a
//! failure. Stage two runs a non-interactive `ssh -T` probe through the
//! process executor and classifies its outcome; a "permission denied"
//! from a reachable host means the SSH daemon answered, which is exactly
//! what the caller wants to know.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::{parse_args, to_payload};
use crate::mcp::config::{resolve_command_timeout, resolve_probe_timeout};
use crate::mcp::error::ToolError;
use crate::mcp::schema::{ParamSpec, ParamType, ToolDescriptor};
use crate::mcp::types::{AuthOutcome, AuthProbe, CheckStage, ConnectionCheckResponse};
use crate::mcp::{exec, probe};

/// Longest stderr excerpt carried back in the auth probe detail.
const STDERR_EXCERPT_LEN: usize = 200;

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "check_ssh_connection",
        "Check whether an SSH server is reachable and answering: a TCP probe first, \
         then a non-interactive auth probe when the port is open. An unreachable host \
         is reported as a diagnosis, not an error.",
        vec![
            ParamSpec::new("host", ParamType::String, "Hostname or IP of the SSH server")
                .required(),
            ParamSpec::new("port", ParamType::Integer, "SSH server port").with_default(json!(22)),
            ParamSpec::new("user", ParamType::String, "Username for the auth probe").required(),
            ParamSpec::new(
                "timeout",
                ParamType::Integer,
                "Probe timeout in seconds (default: 5, env: SSH_DIAG_PROBE_TIMEOUT)",
            ),
        ],
    )
}

#[derive(Debug, Deserialize)]
struct ConnectionArgs {
    host: String,
    port: u16,
    user: String,
    timeout: Option<u64>,
}

pub async fn check_ssh_connection(args: Map<String, Value>) -> Result<Value, ToolError> {
    let args: ConnectionArgs = parse_args(args)?;
    let probe_timeout = Duration::from_secs(resolve_probe_timeout(args.timeout));

    let outcome = probe::connect(&args.host, args.port, probe_timeout).await;
    if !outcome.reachable {
        debug!(
            "{}:{} unreachable at network stage: {:?}",
            args.host, args.port, outcome.detail
        );
        return to_payload(&ConnectionCheckResponse {
            host: args.host,
            port: args.port,
            reachable: false,
            stage: CheckStage::Network,
            latency_ms: None,
            detail: outcome.detail,
            auth: None,
        });
    }

    let auth = auth_probe(&args.host, args.port, &args.user, probe_timeout).await;

    to_payload(&ConnectionCheckResponse {
        host: args.host,
        port: args.port,
        reachable: true,
        stage: CheckStage::Auth,
        latency_ms: outcome.latency_ms,
        detail: None,
        auth: Some(auth),
    })
}

/// Run `ssh -T` in batch mode against the target and classify the result.
///
/// BatchMode forbids interactive prompts, so the probe always terminates
/// on its own or is killed by the executor timeout.
async fn auth_probe(host: &str, port: u16, user: &str, probe_timeout: Duration) -> AuthProbe {
    let command_timeout = Duration::from_secs(resolve_command_timeout(None));
    let target = format!("{user}@{host}");
    let port_arg = port.to_string();
    let connect_timeout_opt = format!("ConnectTimeout={}", probe_timeout.as_secs().max(1));

    let result = exec::run(
        "ssh",
        &[
            "-T",
            "-o",
            "BatchMode=yes",
            "-o",
            &connect_timeout_opt,
            "-o",
            "StrictHostKeyChecking=accept-new",
            "-p",
            &port_arg,
            &target,
            "exit",
        ],
        command_timeout,
    )
    .await;

    match result {
        Ok(output) if output.exit_code == 0 => AuthProbe {
            result: AuthOutcome::Ok,
            exit_code: Some(0),
            detail: None,
        },
        Ok(output) => {
            let excerpt = stderr_excerpt(&output.stderr);
            let result = if output.stderr.to_lowercase().contains("permission denied") {
                AuthOutcome::AuthRequired
            } else {
                AuthOutcome::Failed
            };
            AuthProbe {
                result,
                exit_code: Some(output.exit_code),
                detail: excerpt,
            }
        }
        Err(ToolError::Timeout(_)) => AuthProbe {
            result: AuthOutcome::Timeout,
            exit_code: None,
            detail: None,
        },
        // ssh binary missing or unrunnable: the network diagnosis stands,
        // the auth stage just reports why it could not run.
        Err(e) => AuthProbe {
            result: AuthOutcome::Failed,
            exit_code: None,
            detail: Some(e.to_string()),
        },
    }
}

fn stderr_excerpt(stderr: &str) -> Option<String> {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        return None;
    }
    let excerpt: String = trimmed.chars().take(STDERR_EXCERPT_LEN).collect();
    Some(excerpt)
}
