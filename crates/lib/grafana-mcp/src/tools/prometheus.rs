use grafana_core::prometheus::{LABEL_LIMIT, PromQuery, QueryType};
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

/// Parameters for listing Prometheus label names.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromLabelNamesParams {
    /// The UID of the Prometheus datasource to query.
    pub datasource_uid: String,
    /// Start time in RFC3339 format (defaults to 1 hour ago).
    pub start_rfc3339: Option<String>,
    /// End time in RFC3339 format (defaults to now).
    pub end_rfc3339: Option<String>,
    /// Maximum number of label names to return (default: 100).
    pub limit: Option<i64>,
}

/// Parameters for listing values of one Prometheus label.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromLabelValuesParams {
    /// The UID of the Prometheus datasource to query.
    pub datasource_uid: String,
    /// The label name to get values for (e.g. "job", "instance", or "__name__" for metric names).
    pub label_name: String,
    /// Start time in RFC3339 format (defaults to 1 hour ago).
    pub start_rfc3339: Option<String>,
    /// End time in RFC3339 format (defaults to now).
    pub end_rfc3339: Option<String>,
    /// Maximum number of values to return (default: 100).
    pub limit: Option<i64>,
}

/// Parameters for listing metric names.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromMetricNamesParams {
    /// The UID of the Prometheus datasource to query.
    pub datasource_uid: String,
    /// Optional regex filter (e.g. "node_.*").
    pub regex: Option<String>,
    /// Start time in RFC3339 format (defaults to 1 hour ago).
    pub start_rfc3339: Option<String>,
    /// End time in RFC3339 format (defaults to now).
    pub end_rfc3339: Option<String>,
    /// Maximum number of metric names to return (default: 100).
    pub limit: Option<i64>,
}

/// Parameters for evaluating a PromQL expression.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromQueryParams {
    /// The UID of the Prometheus datasource to query.
    pub datasource_uid: String,
    /// PromQL expression (e.g. 'up', 'rate(http_requests_total[5m])').
    pub expr: String,
    /// 'instant' (default) for a single point in time, or 'range' for a time series.
    pub query_type: Option<String>,
    /// Evaluation time for instant queries in RFC3339 format (defaults to now).
    pub time_rfc3339: Option<String>,
    /// Start time for range queries in RFC3339 format (defaults to 1 hour ago).
    pub start_rfc3339: Option<String>,
    /// End time for range queries in RFC3339 format (defaults to now).
    pub end_rfc3339: Option<String>,
    /// Step interval for range queries in seconds (default: 60).
    pub step_seconds: Option<i64>,
}

#[tool_router(router = tool_router_prometheus, vis = "pub")]
impl GrafanaMcp {
    #[tool(
        description = "Lists label names in a Prometheus datasource (e.g. [\"__name__\", \"instance\", \"job\"]). Defaults to the last hour."
    )]
    async fn list_prometheus_label_names(
        &self,
        Parameters(params): Parameters<PromLabelNamesParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let limit = LABEL_LIMIT.resolve(params.limit);
        helpers::respond(&context, async {
            let range = TimeRange::resolve(
                params.start_rfc3339.as_deref(),
                params.end_rfc3339.as_deref(),
            )?;
            let client = self.client()?;
            client
                .prometheus(&params.datasource_uid)?
                .label_names(&range, limit)
                .await
        })
        .await
    }

    #[tool(
        description = "Retrieves the unique values of one label in a Prometheus datasource (e.g. labelName=\"job\" might return [\"prometheus\", \"node-exporter\"]). Use __name__ to list metric names. Defaults to the last hour."
    )]
    async fn list_prometheus_label_values(
        &self,
        Parameters(params): Parameters<PromLabelValuesParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let limit = LABEL_LIMIT.resolve(params.limit);
        helpers::respond(&context, async {
            let range = TimeRange::resolve(
                params.start_rfc3339.as_deref(),
                params.end_rfc3339.as_deref(),
            )?;
            let client = self.client()?;
            client
                .prometheus(&params.datasource_uid)?
                .label_values(&params.label_name, &range, limit)
                .await
        })
        .await
    }

    #[tool(
        description = "Lists metric names in a Prometheus datasource (e.g. [\"up\", \"node_cpu_seconds_total\"]), optionally filtered by a regex. Defaults to the last hour."
    )]
    async fn list_prometheus_metric_names(
        &self,
        Parameters(params): Parameters<PromMetricNamesParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let limit = LABEL_LIMIT.resolve(params.limit);
        helpers::respond(&context, async {
            let range = TimeRange::resolve(
                params.start_rfc3339.as_deref(),
                params.end_rfc3339.as_deref(),
            )?;
            let client = self.client()?;
            client
                .prometheus(&params.datasource_uid)?
                .metric_names(params.regex.as_deref(), &range, limit)
                .await
        })
        .await
    }

    #[tool(
        description = "Executes a PromQL query against a Prometheus datasource. Instant queries evaluate at timeRfc3339 (default now). Set queryType='range' with optional startRfc3339, endRfc3339, and stepSeconds for a time series. Returns resultType (vector, matrix, scalar, string) and result data."
    )]
    async fn query_prometheus(
        &self,
        Parameters(params): Parameters<PromQueryParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        helpers::respond(&context, async {
            let query_type: QueryType = params.query_type.as_deref().unwrap_or_default().parse()?;
            let request = PromQuery {
                expr: &params.expr,
                query_type,
                time: params.time_rfc3339.as_deref(),
                start: params.start_rfc3339.as_deref(),
                end: params.end_rfc3339.as_deref(),
                step_seconds: params.step_seconds,
            };
            let client = self.client()?;
            client
                .prometheus(&params.datasource_uid)?
                .query(&request)
                .await
        })
        .await
    }
}
