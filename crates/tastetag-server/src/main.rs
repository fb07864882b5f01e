use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use tastetag_server::config::ServerConfig;
use tastetag_service::UpstreamService;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tastetag_server=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::parse();
    let addr = config.addr();

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("tastetag-server listening on http://{addr}");

    tastetag_server::serve(listener, UpstreamService::new(&config.upstream_url)).await
}
