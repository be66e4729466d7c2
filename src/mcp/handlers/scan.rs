//! `port_scanner`: bounded-concurrency TCP port scanning.
//!
//! Probes every port in an inclusive range with at most N connections in
//! flight. Results come back in port order regardless of which probe
//! finishes first, so two scans of the same range are directly diffable.

use std::time::Duration;

use futures::StreamExt;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::{parse_args, to_payload};
use crate::mcp::config::resolve_scan_concurrency;
use crate::mcp::error::ToolError;
use crate::mcp::probe;
use crate::mcp::schema::{ParamSpec, ParamType, ToolDescriptor};
use crate::mcp::types::{PortProbe, PortScanResponse};

/// Default per-port connect timeout in milliseconds.
const DEFAULT_PORT_TIMEOUT_MS: u64 = 1000;

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "port_scanner",
        "Probe a range of TCP ports on a host with bounded concurrency. Results are \
         reported in port order with a failure classification for each closed port.",
        vec![
            ParamSpec::new("host", ParamType::String, "Hostname or IP to scan").required(),
            ParamSpec::new(
                "port_range",
                ParamType::String,
                "Inclusive port range, \"N\" or \"N-M\" (e.g. \"22\" or \"8000-8100\")",
            )
            .required(),
            ParamSpec::new(
                "timeout_ms",
                ParamType::Integer,
                "Per-port connect timeout in milliseconds",
            )
            .with_default(json!(DEFAULT_PORT_TIMEOUT_MS)),
            ParamSpec::new(
                "max_concurrency",
                ParamType::Integer,
                "Maximum probes in flight (default: 16, env: SSH_DIAG_SCAN_CONCURRENCY, cap: 128)",
            ),
        ],
    )
}

#[derive(Debug, Deserialize)]
struct ScanArgs {
    host: String,
    port_range: String,
    timeout_ms: u64,
    max_concurrency: Option<u64>,
}

pub async fn port_scanner(args: Map<String, Value>) -> Result<Value, ToolError> {
    let args: ScanArgs = parse_args(args)?;
    let (start, end) = parse_port_range(&args.port_range)?;
    let timeout = Duration::from_millis(args.timeout_ms.max(1));
    let concurrency = resolve_scan_concurrency(args.max_concurrency);

    debug!(
        "scanning {} ports {}..={} with concurrency {}",
        args.host, start, end, concurrency
    );

    // `buffered` keeps at most `concurrency` probes in flight and yields
    // results in submission order, so the response stays sorted by port.
    let host = args.host.as_str();
    let ports: Vec<PortProbe> = futures::stream::iter(start..=end)
        .map(|port| async move {
            let outcome = probe::connect(host, port, timeout).await;
            PortProbe {
                port,
                reachable: outcome.reachable,
                detail: outcome.detail,
            }
        })
        .buffered(concurrency)
        .collect()
        .await;

    let count = ports.len();
    let open_count = ports.iter().filter(|p| p.reachable).count();
    to_payload(&PortScanResponse {
        host: args.host,
        ports,
        count,
        open_count,
    })
}

/// Parse `"N"` or `"N-M"` into an inclusive `(start, end)` pair.
///
/// A reversed range (`start > end`) is accepted and yields an empty scan;
/// port 0 and malformed input are rejected.
fn parse_port_range(range: &str) -> Result<(u16, u16), ToolError> {
    let parse_one = |s: &str| -> Result<u16, ToolError> {
        let port: u16 = s.trim().parse().map_err(|_| {
            ToolError::InvalidArguments(format!("invalid port {s:?} in range {range:?}"))
        })?;
        if port == 0 {
            return Err(ToolError::InvalidArguments(
                "port 0 is not scannable".to_string(),
            ));
        }
        Ok(port)
    };

    match range.split_once('-') {
        Some((start, end)) => Ok((parse_one(start)?, parse_one(end)?)),
        None => {
            let port = parse_one(range)?;
            Ok((port, port))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn scan(args: Value) -> Result<Value, ToolError> {
        port_scanner(serde_json::from_value(args).unwrap()).await
    }

    mod range_parsing {
        use super::*;

        #[test]
        fn test_single_port() {
            assert_eq!(parse_port_range("22").unwrap(), (22, 22));
        }

        #[test]
        fn test_range_with_whitespace() {
            assert_eq!(parse_port_range("8000 - 8100").unwrap(), (8000, 8100));
        }

        #[test]
        fn test_port_zero_is_rejected() {
            assert!(matches!(
                parse_port_range("0-100"),
                Err(ToolError::InvalidArguments(_))
            ));
        }

        #[test]
        fn test_garbage_is_rejected() {
            assert!(parse_port_range("http").is_err());
            assert!(parse_port_range("1-2-3").is_err());
            assert!(parse_port_range("70000").is_err());
            assert!(parse_port_range("").is_err());
        }
    }

    mod scanning {
        use super::*;

        #[tokio::test]
        async fn test_finds_open_port_among_closed_neighbors() {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let open_port = listener.local_addr().unwrap().port();

            let payload = scan(json!({
                "host": "127.0.0.1",
                "port_range": format!("{}-{}", open_port - 1, open_port + 1),
                "timeout_ms": 500,
            }))
            .await
            .unwrap();

            assert_eq!(payload["count"], 3);
            assert_eq!(payload["open_count"], 1);

            let ports = payload["ports"].as_array().unwrap();
            let open = ports.iter().find(|p| p["reachable"] == true).unwrap();
            assert_eq!(open["port"], open_port);
            assert!(open.get("detail").is_none());
        }

        #[tokio::test]
        async fn test_results_ordered_by_port() {
            let payload = scan(json!({
                "host": "127.0.0.1",
                "port_range": "49400-49410",
                "timeout_ms": 300,
                "max_concurrency": 8,
            }))
            .await
            .unwrap();

            let ports: Vec<u64> = payload["ports"]
                .as_array()
                .unwrap()
                .iter()
                .map(|p| p["port"].as_u64().unwrap())
                .collect();
            let mut sorted = ports.clone();
            sorted.sort_unstable();
            assert_eq!(ports, sorted);
        }

        #[tokio::test]
        async fn test_reversed_range_yields_empty_scan() {
            let payload = scan(json!({
                "host": "127.0.0.1",
                "port_range": "9000-8000",
                "timeout_ms": 100,
            }))
            .await
            .unwrap();
            assert_eq!(payload["count"], 0);
            assert_eq!(payload["open_count"], 0);
        }

        #[tokio::test]
        async fn test_closed_ports_carry_refused_detail() {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let port = listener.local_addr().unwrap().port();
            drop(listener);

            let payload = scan(json!({
                "host": "127.0.0.1",
                "port_range": port.to_string(),
                "timeout_ms": 500,
            }))
            .await
            .unwrap();

            let ports = payload["ports"].as_array().unwrap();
            assert_eq!(ports[0]["reachable"], false);
            assert_eq!(ports[0]["detail"], "refused");
        }

        #[tokio::test]
        async fn test_malformed_range_is_invalid_arguments() {
            let err = scan(json!({
                "host": "127.0.0.1",
                "port_range": "not-a-range",
            }))
            .await
            .unwrap_err();
            assert!(matches!(err, ToolError::InvalidArguments(_)));
        }
    }
}
