mod config;
mod error;
mod intent;
mod linker;
mod model;
mod reservation;
mod segment;
mod server;
mod turn;

use std::sync::Arc;

use clutch_common::yelp::YelpClient;
use rmcp::{ServiceExt, transport::stdio};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use server::ConciergeServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting clutch-concierge MCP server");

    let config = Config::from_env()?;
    let yelp = Arc::new(YelpClient::new(config.yelp.clone())?);
    info!(
        base_url = %yelp.config().base_url,
        timeout_ms = yelp.config().default_timeout.as_millis(),
        max_retries = yelp.config().max_retries,
        locale = %config.locale,
        reservation_delay_ms = config.reservation_delay.as_millis(),
        "configuration loaded"
    );

    let server = ConciergeServer::new(yelp, &config);

    if let Some(addr) = config.tcp_listen_addr.as_deref() {
        let listener = TcpListener::bind(addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.clone();
            tokio::spawn(async move {
                info!(peer = %peer, "MCP client connected");
                let service = server.serve(stream).await.inspect_err(|e| {
                    tracing::error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        info!("MCP server shut down");
    }
    Ok(())
}
