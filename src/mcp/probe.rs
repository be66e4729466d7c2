//! Transport-level TCP reachability probing.
//!
//! A probe attempts one raw TCP connection and classifies the outcome.
//! No protocol handshake is performed; a negative outcome (refused,
//! timeout) is meaningful diagnostic data, not an error.

use std::time::{Duration, Instant};

use tokio::net::{TcpStream, lookup_host};
use tracing::debug;

use super::types::{ProbeFailure, ProbeOutcome};

/// Probe `host:port` with a bounded connect timeout.
///
/// DNS resolution shares the same budget as the connect attempt, so the
/// whole call never outlives `timeout`.
pub async fn connect(host: &str, port: u16, timeout: Duration) -> ProbeOutcome {
    let started = Instant::now();

    let addr = match tokio::time::timeout(timeout, lookup_host((host, port))).await {
        Err(_) => return ProbeOutcome::unreached(ProbeFailure::Timeout),
        Ok(Err(e)) => {
            debug!("resolution of {} failed: {}", host, e);
            return ProbeOutcome::unreached(ProbeFailure::ResolutionFailed);
        }
        Ok(Ok(mut addrs)) => match addrs.next() {
            Some(addr) => addr,
            None => return ProbeOutcome::unreached(ProbeFailure::ResolutionFailed),
        },
    };

    let remaining = timeout.saturating_sub(started.elapsed());
    if remaining.is_zero() {
        return ProbeOutcome::unreached(ProbeFailure::Timeout);
    }

    match tokio::time::timeout(remaining, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => {
            // Close immediately; reachability is all we wanted to know.
            drop(stream);
            let latency_ms = started.elapsed().as_millis() as u64;
            ProbeOutcome::reached(latency_ms)
        }
        Ok(Err(e)) => {
            debug!("connect to {}:{} failed: {}", host, port, e);
            ProbeOutcome::unreached(classify_connect_error(&e))
        }
        Err(_) => ProbeOutcome::unreached(ProbeFailure::Timeout),
    }
}

fn classify_connect_error(err: &std::io::Error) -> ProbeFailure {
    use std::io::ErrorKind;
    match err.kind() {
        ErrorKind::ConnectionRefused => ProbeFailure::Refused,
        ErrorKind::TimedOut => ProbeFailure::Timeout,
        _ => ProbeFailure::Unreachable,
    }
}
