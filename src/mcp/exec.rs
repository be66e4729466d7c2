//! Bounded external process execution.
//!
//! All subprocess invocations in this server go through [`run`]: argument
//! vectors only (no shell interpolation), a hard wall-clock timeout, and
//! capped output capture. A timed-out child is killed, never orphaned.
//!
//! Exit codes are not interpreted here. A nonzero exit is meaningful data
//! for the calling handler (an `ssh -T` probe exiting 255 still tells us
//! the host is up), so only spawn failures and timeouts are errors.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use super::config::resolve_output_cap;
use super::error::ToolError;

/// Marker appended to a captured stream that exceeded the output cap.
const TRUNCATION_MARKER: &str = "\n[output truncated]";

/// Captured outcome of a completed subprocess.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Exit code; -1 when the process was terminated by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Whether either stream was cut at the output cap
    pub truncated: bool,
}

/// Run `program` with `args`, enforcing `timeout` and the configured output cap.
///
/// Returns `SpawnError` when the program cannot be started and `Timeout`
/// when the wall clock expires; the child is killed on timeout via
/// `kill_on_drop`, so no orphan survives the call.
pub async fn run(program: &str, args: &[&str], timeout: Duration) -> Result<ExecOutput, ToolError> {
    run_with_cap(program, args, timeout, resolve_output_cap()).await
}

/// Same as [`run`] with an explicit per-stream capture cap in bytes.
pub async fn run_with_cap(
    program: &str,
    args: &[&str],
    timeout: Duration,
    cap: usize,
) -> Result<ExecOutput, ToolError> {
    debug!("executing {} {:?} (timeout {:?})", program, args, timeout);

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ToolError::SpawnError(format!("{program}: {e}")))?;

    // On timeout the future is dropped, dropping the child with it;
    // kill_on_drop then reaps the process.
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(ToolError::InternalError(format!(
                "waiting for {program}: {e}"
            )));
        }
        Err(_) => return Err(ToolError::Timeout(timeout)),
    };

    let (stdout, stdout_cut) = cap_stream(&output.stdout, cap);
    let (stderr, stderr_cut) = cap_stream(&output.stderr, cap);

    Ok(ExecOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout,
        stderr,
        truncated: stdout_cut || stderr_cut,
    })
}

/// Lossy-decode up to `cap` bytes of a stream, marking truncation.
fn cap_stream(bytes: &[u8], cap: usize) -> (String, bool) {
    if bytes.len() <= cap {
        (String::from_utf8_lossy(bytes).into_owned(), false)
    } else {
        let mut text = String::from_utf8_lossy(&bytes[..cap]).into_owned();
        text.push_str(TRUNCATION_MARKER);
        (text, true)
    }
}
