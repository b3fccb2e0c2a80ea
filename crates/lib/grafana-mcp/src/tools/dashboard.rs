use grafana_core::dashboard::SEARCH_LIMIT;
use rmcp::{
    ErrorData,
    RoleServer,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    service::RequestContext,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::GrafanaMcp;
use crate::helpers;

/// Parameters for searching dashboards.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchDashboardsParams {
    /// Search query string matched against dashboard titles.
    pub query: Option<String>,
    /// Filter dashboards by tag.
    pub tag: Option<String>,
    /// Maximum number of results to return (default: 50).
    pub limit: Option<i64>,
}

/// Parameters addressing one dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct DashboardUidParams {
    /// The UID of the dashboard.
    pub uid: String,
}

#[tool_router(router = tool_router_dashboard, vis = "pub")]
impl GrafanaMcp {
    #[tool(
        description = "Searches Grafana dashboards by query string or tag. Returns matching dashboards with UID, title, tags, folder information, and URL. Use the UID with get_dashboard_summary or get_dashboard_panel_queries."
    )]
    async fn search_dashboards(
        &self,
        Parameters(params): Parameters<SearchDashboardsParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let limit = SEARCH_LIMIT.resolve(params.limit);
        helpers::respond(&context, async {
            let client = self.client()?;
            client
                .dashboards()
                .search(params.query.as_deref(), params.tag.as_deref(), limit)
                .await
        })
        .await
    }

    #[tool(
        description = "Gets a compact summary of a Grafana dashboard: title, description, tags, panel count and types, template variables, and metadata. Prefer this over the full dashboard JSON. Use search_dashboards first to find the UID."
    )]
    async fn get_dashboard_summary(
        &self,
        Parameters(params): Parameters<DashboardUidParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        helpers::respond(&context, async {
            let client = self.client()?;
            client.dashboards().summary(&params.uid).await
        })
        .await
    }

    #[tool(
        description = "Extracts every query from a Grafana dashboard's panels with panel ID, title, datasource UID and type, and query expression. A target's datasource overrides its panel's. A datasourceUid such as '$datasource' is a template variable; resolve it with the grafana://datasources resource."
    )]
    async fn get_dashboard_panel_queries(
        &self,
        Parameters(params): Parameters<DashboardUidParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        helpers::respond(&context, async {
            let client = self.client()?;
            client.dashboards().panel_queries(&params.uid).await
        })
        .await
    }
}
