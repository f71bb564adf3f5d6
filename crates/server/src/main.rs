//! urlfilter server entry point.
//!
//! Builds the configured filter chain and serves it as an MCP server on stdio
//! transport. Logging goes to stderr to avoid interfering with the JSON-RPC
//! protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;
use urlfilter_core::{AppConfig, Filter, build_from_config};

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let chain: Arc<dyn Filter> = Arc::from(build_from_config(&config).await.context("failed to build filter chain")?);

    tracing::info!(filters = ?config.filters, "Starting urlfilter server on stdio transport");

    let handler = handler::UrlFilterServer::new(chain.clone());
    let transport = stdio();
    let result: Result<()> = async {
        let server = serve_server(handler, transport).await?;
        server.waiting().await?;
        tracing::info!("urlfilter server stopped");
        Ok(())
    }
    .await;

    chain.shutdown();
    result
}
