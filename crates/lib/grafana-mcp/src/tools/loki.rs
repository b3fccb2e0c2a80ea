use grafana_core::loki::{LOG_LIMIT, LogQuery};
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

/// Parameters for listing Loki label names.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LokiLabelNamesParams {
    /// The UID of the Loki datasource to query.
    pub datasource_uid: String,
    /// Start time in RFC3339 format (defaults to 1 hour ago).
    pub start_rfc3339: Option<String>,
    /// End time in RFC3339 format (defaults to now).
    pub end_rfc3339: Option<String>,
}

/// Parameters for listing values of one Loki label.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LokiLabelValuesParams {
    /// The UID of the Loki datasource to query.
    pub datasource_uid: String,
    /// The label name to get values for (e.g. "app", "env", "pod").
    pub label_name: String,
    /// Start time in RFC3339 format (defaults to 1 hour ago).
    pub start_rfc3339: Option<String>,
    /// End time in RFC3339 format (defaults to now).
    pub end_rfc3339: Option<String>,
}

/// Parameters for Loki index statistics.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LokiStatsParams {
    /// The UID of the Loki datasource to query.
    pub datasource_uid: String,
    /// LogQL stream selector (e.g. '{app="nginx"}'). Line filters and aggregations are not supported.
    pub logql: String,
    /// Start time in RFC3339 format (defaults to 1 hour ago).
    pub start_rfc3339: Option<String>,
    /// End time in RFC3339 format (defaults to now).
    pub end_rfc3339: Option<String>,
}

/// Parameters for a Loki log query.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LokiLogsParams {
    /// The UID of the Loki datasource to query.
    pub datasource_uid: String,
    /// LogQL query expression (e.g. '{app="nginx"} |= "error"').
    pub logql: String,
    /// Start time in RFC3339 format (defaults to 1 hour ago).
    pub start_rfc3339: Option<String>,
    /// End time in RFC3339 format (defaults to now).
    pub end_rfc3339: Option<String>,
    /// Maximum number of log lines to return (default: 10, max: 100).
    pub limit: Option<i64>,
    /// Query direction: 'forward' (oldest first) or 'backward' (newest first, default).
    pub direction: Option<String>,
}

#[tool_router(router = tool_router_loki, vis = "pub")]
impl GrafanaMcp {
    #[tool(
        description = "Lists label names found in logs within a Loki datasource and time range (e.g. [\"app\", \"env\", \"pod\"]). Defaults to the last hour."
    )]
    async fn list_loki_label_names(
        &self,
        Parameters(params): Parameters<LokiLabelNamesParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        helpers::respond(&context, async {
            let range = TimeRange::resolve(
                params.start_rfc3339.as_deref(),
                params.end_rfc3339.as_deref(),
            )?;
            let client = self.client()?;
            client.loki(&params.datasource_uid)?.label_names(&range).await
        })
        .await
    }

    #[tool(
        description = "Retrieves the unique values of one label within a Loki datasource and time range (e.g. labelName=\"env\" might return [\"prod\", \"staging\"]). Useful for discovering filter options. Defaults to the last hour."
    )]
    async fn list_loki_label_values(
        &self,
        Parameters(params): Parameters<LokiLabelValuesParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        helpers::respond(&context, async {
            let range = TimeRange::resolve(
                params.start_rfc3339.as_deref(),
                params.end_rfc3339.as_deref(),
            )?;
            let client = self.client()?;
            client
                .loki(&params.datasource_uid)?
                .label_values(&params.label_name, &range)
                .await
        })
        .await
    }

    #[tool(
        description = "Retrieves statistics about log streams matching a LogQL selector: counts of streams, chunks, entries, and bytes. Useful for checking query size before fetching logs. Defaults to the last hour."
    )]
    async fn query_loki_stats(
        &self,
        Parameters(params): Parameters<LokiStatsParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        helpers::respond(&context, async {
            let range = TimeRange::resolve(
                params.start_rfc3339.as_deref(),
                params.end_rfc3339.as_deref(),
            )?;
            let client = self.client()?;
            client
                .loki(&params.datasource_uid)?
                .stats(&params.logql, &range)
                .await
        })
        .await
    }

    #[tool(
        description = "Executes a LogQL query against a Loki datasource and returns log entries with timestamp, labels, and log line (or numeric value for metric queries). Defaults to the last hour, 10 entries, newest first. Consider query_loki_stats first to check query size."
    )]
    async fn query_loki_logs(
        &self,
        Parameters(params): Parameters<LokiLogsParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let limit = LOG_LIMIT.resolve(params.limit);
        helpers::respond(&context, async {
            let range = TimeRange::resolve(
                params.start_rfc3339.as_deref(),
                params.end_rfc3339.as_deref(),
            )?;
            let request = LogQuery {
                logql: &params.logql,
                range,
                limit,
                direction: params.direction.as_deref(),
            };
            let client = self.client()?;
            client
                .loki(&params.datasource_uid)?
                .query_logs(&request)
                .await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_use_camel_case_names() {
        let schema = serde_json::to_value(schemars::schema_for!(LokiLogsParams))
            .expect("schema serializes");
        let properties = &schema["properties"];
        for name in ["datasourceUid", "logql", "startRfc3339", "endRfc3339", "limit", "direction"] {
            assert!(properties.get(name).is_some(), "missing {name}");
        }
        let required = schema["required"].as_array().expect("required list");
        assert_eq!(required.len(), 2);
    }

    #[test]
    fn optional_arguments_may_be_omitted() {
        let params: LokiLogsParams = serde_json::from_str(
            r#"{"datasourceUid": "loki-1", "logql": "{app=\"nginx\"}"}"#,
        )
        .expect("params decode");
        assert_eq!(params.datasource_uid, "loki-1");
        assert!(params.limit.is_none());
        assert_eq!(LOG_LIMIT.resolve(params.limit), 10);
    }
}
