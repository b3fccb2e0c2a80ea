//! Alert rule models for the provisioning and live-evaluation APIs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lenient;

/// Rule type reported by the live API for alerting rules.
pub const ALERTING_RULE_TYPE: &str = "alerting";

/// Alert rule definition as returned by `/api/v1/provisioning/alert-rules`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient::string")]
    pub uid: String,
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(rename = "folderUID", deserialize_with = "lenient::string")]
    pub folder_uid: String,
    #[serde(rename = "ruleGroup", deserialize_with = "lenient::string")]
    pub rule_group: String,
    #[serde(rename = "for", deserialize_with = "lenient::string")]
    pub for_duration: String,
    #[serde(
        deserialize_with = "lenient::string_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub labels: BTreeMap<String, String>,
    #[serde(
        deserialize_with = "lenient::string_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub annotations: BTreeMap<String, String>,
    #[serde(deserialize_with = "lenient::string")]
    pub condition: String,
    #[serde(rename = "noDataState", deserialize_with = "lenient::string")]
    pub no_data_state: String,
    #[serde(rename = "execErrState", deserialize_with = "lenient::string")]
    pub exec_err_state: String,
    #[serde(deserialize_with = "lenient::nullable")]
    pub data: Vec<QueryData>,
    #[serde(rename = "isPaused", deserialize_with = "lenient::boolean")]
    pub is_paused: bool,
    #[serde(deserialize_with = "lenient::string")]
    pub updated: String,
}

/// One query of an alert rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryData {
    #[serde(rename = "refId", deserialize_with = "lenient::string")]
    pub ref_id: String,
    #[serde(
        rename = "queryType",
        deserialize_with = "lenient::string",
        skip_serializing_if = "String::is_empty"
    )]
    pub query_type: String,
    #[serde(rename = "relativeTimeRange", skip_serializing_if = "Option::is_none")]
    pub relative_time_range: Option<RelativeTimeRange>,
    #[serde(rename = "datasourceUid", deserialize_with = "lenient::string")]
    pub datasource_uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,
}

/// Relative evaluation window of an alert query, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelativeTimeRange {
    pub from: i64,
    pub to: i64,
}

/// Compact alert rule view returned by the listing tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSummary {
    pub uid: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<String>,
    #[serde(rename = "folderUID", default, skip_serializing_if = "String::is_empty")]
    pub folder_uid: String,
    #[serde(rename = "ruleGroup", default, skip_serializing_if = "String::is_empty")]
    pub rule_group: String,
    #[serde(rename = "for", default, skip_serializing_if = "String::is_empty")]
    pub for_duration: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(rename = "isPaused", default)]
    pub is_paused: bool,
}

impl From<&AlertRule> for RuleSummary {
    fn from(rule: &AlertRule) -> Self {
        Self {
            uid: rule.uid.clone(),
            title: rule.title.clone(),
            state: None,
            health: None,
            folder_uid: rule.folder_uid.clone(),
            rule_group: rule.rule_group.clone(),
            for_duration: rule.for_duration.clone(),
            labels: rule.labels.clone(),
            annotations: rule.annotations.clone(),
            is_paused: rule.is_paused,
        }
    }
}

/// Response of the Prometheus-compatible live rules API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LiveRulesResponse {
    pub status: String,
    pub data: LiveRulesData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LiveRulesData {
    pub groups: Vec<LiveRuleGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LiveRuleGroup {
    pub name: String,
    pub file: String,
    pub rules: Vec<LiveRule>,
    pub interval: f64,
}

/// A single rule entry inside a live rule group. Recording rules share this
/// shape and are told apart by `kind`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LiveRule {
    pub name: String,
    pub query: String,
    pub duration: f64,
    #[serde(deserialize_with = "lenient::string_map")]
    pub labels: BTreeMap<String, String>,
    #[serde(deserialize_with = "lenient::string_map")]
    pub annotations: BTreeMap<String, String>,
    pub state: String,
    pub health: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "lastEvaluation")]
    pub last_evaluation: String,
    #[serde(rename = "evaluationTime")]
    pub evaluation_time: f64,
}

impl LiveRule {
    #[must_use]
    pub fn is_alerting(&self) -> bool {
        self.kind == ALERTING_RULE_TYPE
    }
}

/// Live evaluation state of one alerting rule, keyed by title and group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleState {
    pub title: String,
    pub rule_group: String,
    pub state: String,
    pub health: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

impl RuleState {
    /// Builds a state record from a live rule entry and its group name.
    #[must_use]
    pub fn from_live(group: &str, rule: &LiveRule) -> Self {
        Self {
            title: rule.name.clone(),
            rule_group: group.to_string(),
            state: rule.state.clone(),
            health: rule.health.clone(),
            labels: rule.labels.clone(),
            annotations: rule.annotations.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn provisioning_rule_decodes_grafana_field_names() {
        let rule: AlertRule = serde_json::from_value(json!({
            "uid": "abc",
            "title": "HighCPU",
            "folderUID": "f1",
            "ruleGroup": "infra",
            "for": "5m",
            "labels": {"team": "ops"},
            "noDataState": "NoData",
            "execErrState": "Error",
            "isPaused": true,
            "data": [{"refId": "A", "datasourceUid": "prom", "model": {"expr": "up"}}]
        }))
        .expect("rule decodes");

        assert_eq!(rule.folder_uid, "f1");
        assert_eq!(rule.rule_group, "infra");
        assert_eq!(rule.for_duration, "5m");
        assert!(rule.is_paused);
        assert_eq!(rule.data[0].datasource_uid, "prom");
        assert_eq!(rule.labels.get("team").map(String::as_str), Some("ops"));
    }

    #[test]
    fn null_scalars_and_data_read_as_empty() {
        let rule: AlertRule = serde_json::from_value(json!({
            "uid": "x",
            "title": null,
            "for": null,
            "condition": null,
            "isPaused": null,
            "data": null,
            "labels": null
        }))
        .expect("rule with nulls decodes");

        assert_eq!(rule.uid, "x");
        assert!(rule.title.is_empty());
        assert!(rule.for_duration.is_empty());
        assert!(rule.condition.is_empty());
        assert!(!rule.is_paused);
        assert!(rule.data.is_empty());
        assert!(rule.labels.is_empty());
    }

    #[test]
    fn malformed_query_data_is_still_rejected() {
        let err = serde_json::from_value::<AlertRule>(json!({"uid": "x", "data": "A"}));
        assert!(err.is_err());
    }

    #[test]
    fn summary_omits_state_and_health_when_absent() {
        let rule = AlertRule {
            uid: "abc".to_string(),
            title: "HighCPU".to_string(),
            rule_group: "infra".to_string(),
            ..AlertRule::default()
        };
        let value = serde_json::to_value(RuleSummary::from(&rule)).expect("serializes");

        assert!(value.get("state").is_none());
        assert!(value.get("health").is_none());
        assert_eq!(value["ruleGroup"], "infra");
        assert_eq!(value["isPaused"], false);
    }

    #[test]
    fn live_rule_type_distinguishes_recording_entries() {
        let response: LiveRulesResponse = serde_json::from_value(json!({
            "status": "success",
            "data": {"groups": [{
                "name": "infra",
                "rules": [
                    {"name": "HighCPU", "type": "alerting", "state": "firing", "health": "ok"},
                    {"name": "HighCPU", "type": "recording", "health": "ok"}
                ]
            }]}
        }))
        .expect("live response decodes");

        let rules = &response.data.groups[0].rules;
        assert!(rules[0].is_alerting());
        assert!(!rules[1].is_alerting());
    }
}
