//! MCP server implementation for grafana-mcp.
//!
//! This crate wires the Grafana client from `grafana-core` into rmcp tool
//! handlers and exposes the datasource listing as an MCP resource.

mod helpers;
mod resources;
mod tools;
pub mod server;

use std::sync::Arc;

use grafana_core::{GrafanaClient, GrafanaConfig, GrafanaError};
use rmcp::{
    ErrorData,
    RoleServer,
    ServerHandler,
    handler::server::tool::ToolRouter,
    model::{
        CallToolResult,
        Content,
        ListResourcesResult,
        PaginatedRequestParams,
        ReadResourceRequestParams,
        ReadResourceResult,
        ServerCapabilities,
        ServerInfo,
    },
    service::RequestContext,
    tool,
    tool_handler,
    tool_router,
};

const SERVER_INSTRUCTIONS: &str = r"grafana-mcp exposes read-only MCP tools over a Grafana instance and its datasources.

Workflow:
1. Read the `grafana://datasources` resource to find datasource UIDs and types.
2. Alerting:
   - `list_alert_rules` for rule summaries; set `includeState` for firing state and health.
   - `get_alert_rule_by_uid` for the full rule definition.
3. Dashboards:
   - `search_dashboards` by title query or tag.
   - `get_dashboard_summary` for a compact overview.
   - `get_dashboard_panel_queries` for every panel query with its resolved datasource.
4. Logs (Loki): `list_loki_label_names`, `list_loki_label_values`, `query_loki_stats`, `query_loki_logs`.
5. Metrics (Prometheus): `list_prometheus_label_names`, `list_prometheus_label_values`,
   `list_prometheus_metric_names`, `query_prometheus`.
6. Traces (Tempo): `list_tempo_tag_names`, `list_tempo_tag_values`, `search_tempo_traces`, `get_tempo_trace`.

Notes:
- Times are RFC3339 (`startRfc3339`, `endRfc3339`) and default to the last hour.
- Run `query_loki_stats` before `query_loki_logs` to gauge result size.
- A panel datasource UID such as `$datasource` is a template variable; resolve it with `grafana://datasources`.
- `health` returns `ok`.";

/// MCP server wrapper around the Grafana connection settings and tool routers.
#[derive(Clone)]
pub struct GrafanaMcp {
    tool_router: ToolRouter<Self>,
    config: Arc<GrafanaConfig>,
}

impl GrafanaMcp {
    /// Creates a new server owning its configuration.
    #[must_use]
    pub fn new(config: GrafanaConfig) -> Self {
        Self::with_config(Arc::new(config))
    }

    /// Creates a new server using a shared configuration handle.
    #[must_use]
    pub fn with_config(config: Arc<GrafanaConfig>) -> Self {
        let tool_router = Self::tool_router_core()
            + Self::tool_router_alerting()
            + Self::tool_router_dashboard()
            + Self::tool_router_loki()
            + Self::tool_router_prometheus()
            + Self::tool_router_tempo();
        Self {
            tool_router,
            config,
        }
    }

    /// Builds a client for one call. Missing settings surface here, before
    /// any request is made.
    pub(crate) fn client(&self) -> Result<GrafanaClient, GrafanaError> {
        GrafanaClient::new(&self.config)
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl GrafanaMcp {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }
}

#[tool_handler]
impl ServerHandler for GrafanaMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult::with_all_items(resources::catalog()))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        resources::read(self, &request.uri, &context).await
    }
}
