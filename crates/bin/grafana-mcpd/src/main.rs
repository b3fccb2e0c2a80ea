//! Daemon entry point for the Grafana MCP server.
//!
//! Loads configuration from CLI arguments and the environment, then serves the
//! MCP protocol over stdio, streamable HTTP, or both. Logs go to stderr so the
//! stdio transport keeps stdout to itself.

mod config;

use std::sync::Arc;

use grafana_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::McpdConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = McpdConfig::from_args()?;
    if let Err(err) = config.grafana.validate() {
        warn!(error = %err, "grafana settings incomplete; tool calls will fail until they are set");
    }
    info!(
        grafana_url = config.grafana.base_url(),
        stdio = config.enable_stdio,
        http = config.mcp_serve,
        "starting grafana-mcpd"
    );

    let grafana = Arc::new(config.grafana);
    let http = config.mcp_serve.then(|| {
        McpHttpServerConfig::new(config.mcp_http_addr)
            .with_stateful_mode(config.stateful)
            .with_sse_keep_alive(config.sse_keep_alive)
    });

    if config.enable_stdio {
        if let Some(http) = http {
            let grafana = grafana.clone();
            tokio::spawn(async move {
                if let Err(err) = serve_streamable_http(grafana, http).await {
                    error!(error = %err, "streamable HTTP server stopped");
                }
            });
        }
        serve_stdio(grafana).await?;
    } else if let Some(http) = http {
        serve_streamable_http(grafana, http).await?;
    }

    info!("grafana-mcpd stopped");
    Ok(())
}
