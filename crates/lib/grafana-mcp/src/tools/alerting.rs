use grafana_core::GrafanaError;
use grafana_core::alerting::RULES_LIMIT;
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

/// Parameters for listing alert rules.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListAlertRulesParams {
    /// Maximum number of rules to return (default: 100).
    pub limit: Option<i64>,
    /// Include current state (firing, pending, inactive) and health (default: false).
    pub include_state: Option<bool>,
}

/// Parameters for fetching one alert rule.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetAlertRuleParams {
    /// The UID of the alert rule.
    pub uid: String,
}

#[tool_router(router = tool_router_alerting, vis = "pub")]
impl GrafanaMcp {
    #[tool(
        description = "Lists Grafana alert rules. Returns a summary of each rule including UID, title, folder, rule group, labels, annotations, and pause status. Set includeState=true to also include current state (firing, pending, inactive) and health. Use get_alert_rule_by_uid for the full definition."
    )]
    async fn list_alert_rules(
        &self,
        Parameters(params): Parameters<ListAlertRulesParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let limit = RULES_LIMIT.resolve(params.limit);
        let include_state = params.include_state.unwrap_or(false);
        helpers::respond(&context, async {
            let client = self.client()?;
            let listing = client.alerting().list_rules(limit, include_state).await?;
            Ok::<_, GrafanaError>(listing.into_data())
        })
        .await
    }

    #[tool(
        description = "Gets the full configuration of a Grafana alert rule by its UID, including condition, query data, folder, rule group, no-data and error state settings, labels, annotations, and pause status. Use list_alert_rules first to find the UID."
    )]
    async fn get_alert_rule_by_uid(
        &self,
        Parameters(params): Parameters<GetAlertRuleParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        helpers::respond(&context, async {
            let client = self.client()?;
            client.alerting().rule_by_uid(&params.uid).await
        })
        .await
    }
}
