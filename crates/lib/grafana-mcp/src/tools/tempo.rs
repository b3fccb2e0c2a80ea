use grafana_core::tempo::TRACE_LIMIT;
use grafana_core::TimeRange;
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

/// Parameters for listing Tempo tag names.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TempoTagNamesParams {
    /// The UID of the Tempo datasource to query.
    pub datasource_uid: String,
    /// Optional scope filter: 'resource', 'span', or 'intrinsic'.
    pub scope: Option<String>,
    /// Start time in RFC3339 format (defaults to 1 hour ago).
    pub start_rfc3339: Option<String>,
    /// End time in RFC3339 format (defaults to now).
    pub end_rfc3339: Option<String>,
}

/// Parameters for listing values of one Tempo tag.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TempoTagValuesParams {
    /// The UID of the Tempo datasource to query.
    pub datasource_uid: String,
    /// The tag name to get values for (e.g. "service.name", "http.method").
    pub tag_name: String,
    /// Start time in RFC3339 format (defaults to 1 hour ago).
    pub start_rfc3339: Option<String>,
    /// End time in RFC3339 format (defaults to now).
    pub end_rfc3339: Option<String>,
}

/// Parameters for a TraceQL search.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TempoSearchParams {
    /// The UID of the Tempo datasource to query.
    pub datasource_uid: String,
    /// TraceQL expression (e.g. '{service.name="api"}', '{http.status_code>=400}'). Empty returns recent traces.
    pub query: Option<String>,
    /// Start time in RFC3339 format (defaults to 1 hour ago).
    pub start_rfc3339: Option<String>,
    /// End time in RFC3339 format (defaults to now).
    pub end_rfc3339: Option<String>,
    /// Maximum number of traces to return (default: 20, max: 100).
    pub limit: Option<i64>,
}

/// Parameters for fetching one trace.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TempoTraceParams {
    /// The UID of the Tempo datasource to query.
    pub datasource_uid: String,
    /// The trace ID to retrieve (32-character hex string).
    pub trace_id: String,
}

#[tool_router(router = tool_router_tempo, vis = "pub")]
impl GrafanaMcp {
    #[tool(
        description = "Lists tag names (attributes) in a Tempo datasource (e.g. [\"service.name\", \"http.method\"]), optionally filtered by scope (resource, span, intrinsic). Defaults to the last hour."
    )]
    async fn list_tempo_tag_names(
        &self,
        Parameters(params): Parameters<TempoTagNamesParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        helpers::respond(&context, async {
            let range = TimeRange::resolve(
                params.start_rfc3339.as_deref(),
                params.end_rfc3339.as_deref(),
            )?;
            let client = self.client()?;
            client
                .tempo(&params.datasource_uid)?
                .tag_names(params.scope.as_deref(), &range)
                .await
        })
        .await
    }

    #[tool(
        description = "Retrieves the unique values of one tag in a Tempo datasource (e.g. tagName=\"service.name\" might return [\"api-gateway\", \"user-service\"]). Defaults to the last hour."
    )]
    async fn list_tempo_tag_values(
        &self,
        Parameters(params): Parameters<TempoTagValuesParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        helpers::respond(&context, async {
            let range = TimeRange::resolve(
                params.start_rfc3339.as_deref(),
                params.end_rfc3339.as_deref(),
            )?;
            let client = self.client()?;
            client
                .tempo(&params.datasource_uid)?
                .tag_values(&params.tag_name, &range)
                .await
        })
        .await
    }

    #[tool(
        description = "Searches traces in a Tempo datasource using TraceQL. Returns trace ID, root service name, root trace name, start time, and duration per trace. Without a query, returns recent traces. Defaults to the last hour."
    )]
    async fn search_tempo_traces(
        &self,
        Parameters(params): Parameters<TempoSearchParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let limit = TRACE_LIMIT.resolve(params.limit);
        helpers::respond(&context, async {
            let range = TimeRange::resolve(
                params.start_rfc3339.as_deref(),
                params.end_rfc3339.as_deref(),
            )?;
            let client = self.client()?;
            client
                .tempo(&params.datasource_uid)?
                .search(params.query.as_deref(), &range, limit)
                .await
        })
        .await
    }

    #[tool(
        description = "Retrieves a complete trace by ID from a Tempo datasource, including all spans, attributes, and timing. Use search_tempo_traces first to find trace IDs."
    )]
    async fn get_tempo_trace(
        &self,
        Parameters(params): Parameters<TempoTraceParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        helpers::respond(&context, async {
            let client = self.client()?;
            client
                .tempo(&params.datasource_uid)?
                .trace(&params.trace_id)
                .await
        })
        .await
    }
}
