//! Dashboard document tree, search results, and derived summaries.
//!
//! The document types are read from free-form dashboard JSON. Every field is
//! lenient: an absent value or a value of the wrong type becomes the field's
//! zero value, so decoding a document object never fails on shape.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::lenient::{self, Node};

/// Response of `GET /api/dashboards/uid/{uid}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardResponse {
    #[serde(default, deserialize_with = "lenient::object")]
    pub meta: DashboardMeta,
    #[serde(default)]
    pub dashboard: Value,
}

impl DashboardResponse {
    /// Builds the typed document tree from the raw dashboard value.
    #[must_use]
    pub fn document(&self) -> DashboardDocument {
        DashboardDocument::from_value(&self.dashboard)
    }
}

/// Dashboard metadata block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardMeta {
    #[serde(default, deserialize_with = "lenient::string")]
    pub slug: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub created: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub updated: String,
    #[serde(rename = "folderUid", default, deserialize_with = "lenient::string")]
    pub folder_uid: String,
    #[serde(rename = "folderTitle", default, deserialize_with = "lenient::string")]
    pub folder_title: String,
    #[serde(rename = "folderUrl", default, deserialize_with = "lenient::string")]
    pub folder_url: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub version: i64,
}

/// Typed view of a dashboard document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardDocument {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::nodes")]
    pub panels: Vec<Node<Panel>>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub templating: Templating,
}

impl DashboardDocument {
    /// Reads a document from any JSON value. Non-objects yield an empty
    /// document.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    /// Well-formed panels in document order.
    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter().filter_map(Node::as_object)
    }
}

/// A dashboard panel.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Panel {
    #[serde(default, deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::object")]
    pub datasource: DatasourceRef,
    #[serde(default, deserialize_with = "lenient::nodes")]
    pub targets: Vec<Node<PanelTarget>>,
}

/// Datasource reference on a panel or target. A field is `Some` only when the
/// document carries it as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DatasourceRef {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub uid: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::opt_string")]
    pub kind: Option<String>,
}

/// A panel target (query). The whole node is kept in `raw`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelTarget {
    pub datasource: DatasourceRef,
    pub ref_id: Option<String>,
    pub expr: Option<String>,
    pub query: Option<String>,
    pub raw: Map<String, Value>,
}

impl PanelTarget {
    #[must_use]
    pub fn from_map(raw: Map<String, Value>) -> Self {
        let datasource = raw
            .get("datasource")
            .filter(|value| value.is_object())
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default();
        let text = |key: &str| lenient::member_str(&raw, key).map(str::to_string);
        Self {
            datasource,
            ref_id: text("refId"),
            expr: text("expr"),
            query: text("query"),
            raw,
        }
    }
}

impl<'de> Deserialize<'de> for PanelTarget {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Map::deserialize(deserializer)?;
        Ok(Self::from_map(raw))
    }
}

/// The `templating` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Templating {
    #[serde(default, deserialize_with = "lenient::nodes")]
    pub list: Vec<Node<Variable>>,
}

/// A template variable definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Variable {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub label: String,
}

/// Entry returned by `GET /api/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub id: i64,
    pub uid: String,
    pub title: String,
    pub uri: String,
    pub url: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub tags: Vec<String>,
    #[serde(rename = "isStarred")]
    pub is_starred: bool,
    #[serde(rename = "folderId", skip_serializing_if = "is_zero")]
    pub folder_id: i64,
    #[serde(rename = "folderUid", skip_serializing_if = "String::is_empty")]
    pub folder_uid: String,
    #[serde(rename = "folderTitle", skip_serializing_if = "String::is_empty")]
    pub folder_title: String,
    #[serde(rename = "folderUrl", skip_serializing_if = "String::is_empty")]
    pub folder_url: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// Compact overview of a dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub uid: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub folder_title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    pub panel_count: usize,
    pub panels: Vec<PanelSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<VariableSummary>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub updated: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSummary {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub query_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
}

/// One query extracted from a dashboard panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelQuery {
    pub panel_id: i64,
    pub panel_title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub datasource_uid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub datasource_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub query_expr: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ref_id: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub raw_query: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn target_keeps_raw_node_and_typed_fields() {
        let target: PanelTarget = serde_json::from_value(json!({
            "refId": "A",
            "expr": "up",
            "datasource": {"uid": "ds2"},
            "legendFormat": "{{job}}"
        }))
        .expect("target decodes");

        assert_eq!(target.ref_id.as_deref(), Some("A"));
        assert_eq!(target.expr.as_deref(), Some("up"));
        assert_eq!(target.datasource.uid.as_deref(), Some("ds2"));
        assert!(target.datasource.kind.is_none());
        assert_eq!(target.raw.get("legendFormat"), Some(&json!("{{job}}")));
        assert_eq!(target.raw.len(), 4);
    }

    #[test]
    fn legacy_string_datasource_is_ignored() {
        let panel: Panel = serde_json::from_value(json!({
            "id": 3,
            "datasource": "Prometheus",
            "targets": [{"datasource": "Loki", "expr": "{job=\"x\"}"}]
        }))
        .expect("panel decodes");

        assert_eq!(panel.datasource, DatasourceRef::default());
        let target = panel.targets[0].as_object().expect("target is an object");
        assert_eq!(target.datasource, DatasourceRef::default());
    }

    #[test]
    fn non_object_dashboard_yields_empty_document() {
        let document = DashboardDocument::from_value(&json!("not a dashboard"));
        assert!(document.title.is_empty());
        assert!(document.panels.is_empty());
        assert!(document.templating.list.is_empty());
    }

    #[test]
    fn search_result_omits_empty_folder_fields() {
        let result: SearchResult = serde_json::from_value(json!({
            "id": 1,
            "uid": "abc",
            "title": "Overview",
            "type": "dash-db",
            "tags": ["prod"]
        }))
        .expect("search result decodes");
        let value = serde_json::to_value(&result).expect("serializes");

        assert!(value.get("folderId").is_none());
        assert!(value.get("folderUid").is_none());
        assert_eq!(value["type"], "dash-db");
        assert_eq!(value["isStarred"], false);
    }
}
