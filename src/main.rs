use std::sync::Arc;

use anyhow::Context;
use n8n_mcp_server::config::ServerConfig;
use n8n_mcp_server::dispatcher::Dispatcher;
use n8n_mcp_server::handlers::build_registry;
use n8n_mcp_server::logging::init_tracing;
use n8n_mcp_server::server::{serve, shutdown_signal};
use n8n_mcp_server::tools::ToolCatalog;
use n8n_mcp_server::upstream::N8nClient;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("n8n-mcp-server: fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("configuration error")?;
    init_tracing(&config)?;
    tracing::info!("Starting n8n MCP server");

    let client = N8nClient::new(
        &config.n8n_base_url,
        &config.n8n_api_key,
        config.upstream_timeout,
    )?;
    let registry = build_registry(Arc::new(client));
    let tools = ToolCatalog::load_or_default(config.tools_config.as_deref());
    tracing::info!(methods = ?registry.method_names(), "method registry built");

    let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry), Arc::new(tools)));

    let addr = config.bind_addr().await?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;

    serve(listener, dispatcher, shutdown_signal()).await?;
    tracing::info!("Server stopped");
    Ok(())
}
