#![deny(warnings)]
#![deny(clippy::unwrap_used)]

use ssh_diag_mcp::{McpServer, ToolRegistry};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    // stdout carries the protocol frames; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("info".parse().expect("valid tracing directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let server = McpServer::new(ToolRegistry::builtin());
    server
        .serve(tokio::io::stdin(), tokio::io::stdout())
        .await?;

    info!("server stopped");
    Ok(())
}
