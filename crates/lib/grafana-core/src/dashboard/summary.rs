use grafana_models::dashboard::{
    DashboardResponse,
    DashboardSummary,
    Panel,
    PanelSummary,
    Variable,
    VariableSummary,
};
use grafana_models::lenient::Node;

/// Builds the compact overview of a fetched dashboard.
///
/// Target contents are never inspected; each panel only reports how many
/// targets it has.
#[must_use]
pub fn summarize_dashboard(uid: &str, response: &DashboardResponse) -> DashboardSummary {
    let document = response.document();
    DashboardSummary {
        uid: uid.to_string(),
        title: document.title.clone(),
        description: document.description.clone(),
        tags: document.tags.clone(),
        folder_title: response.meta.folder_title.clone(),
        url: response.meta.url.clone(),
        panel_count: document.panels.len(),
        panels: document.panels().map(panel_summary).collect(),
        variables: document
            .templating
            .list
            .iter()
            .filter_map(Node::as_object)
            .map(variable_summary)
            .collect(),
        created: response.meta.created.clone(),
        updated: response.meta.updated.clone(),
    }
}

fn panel_summary(panel: &Panel) -> PanelSummary {
    PanelSummary {
        id: panel.id,
        title: panel.title.clone(),
        kind: panel.kind.clone(),
        description: panel.description.clone(),
        query_count: panel.targets.len(),
    }
}

fn variable_summary(variable: &Variable) -> VariableSummary {
    VariableSummary {
        name: variable.name.clone(),
        kind: variable.kind.clone(),
        label: variable.label.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> DashboardResponse {
        serde_json::from_value(value).expect("response decodes")
    }

    #[test]
    fn summary_counts_panels_and_targets() {
        let summary = summarize_dashboard(
            "abc",
            &response(json!({
                "meta": {"folderTitle": "Ops", "url": "/d/abc/overview", "created": "2024-01-01T00:00:00Z"},
                "dashboard": {
                    "title": "Overview",
                    "description": "Service health",
                    "tags": ["prod", 3, "team-a"],
                    "panels": [
                        {"id": 1, "title": "CPU", "type": "timeseries", "targets": [{}, {}]},
                        {"id": 2.0, "title": "Notes", "type": "text"},
                        42
                    ]
                }
            })),
        );

        assert_eq!(summary.uid, "abc");
        assert_eq!(summary.title, "Overview");
        assert_eq!(summary.tags, vec!["prod".to_string(), "team-a".to_string()]);
        assert_eq!(summary.folder_title, "Ops");
        assert_eq!(summary.panel_count, 3);
        assert_eq!(summary.panels.len(), 2);
        assert_eq!(summary.panels[0].query_count, 2);
        assert_eq!(summary.panels[1].id, 2);
        assert_eq!(summary.panels[1].query_count, 0);
    }

    #[test]
    fn variables_skip_malformed_entries() {
        let summary = summarize_dashboard(
            "abc",
            &response(json!({
                "dashboard": {
                    "templating": {"list": [
                        {"name": "env", "type": "custom", "label": "Environment"},
                        "broken",
                        {"name": "datasource", "type": "datasource"}
                    ]}
                }
            })),
        );

        assert_eq!(summary.variables.len(), 2);
        assert_eq!(summary.variables[0].label, "Environment");
        assert_eq!(summary.variables[1].kind, "datasource");
        assert!(summary.variables[1].label.is_empty());
    }

    #[test]
    fn malformed_document_degrades_to_empty_summary() {
        let summary = summarize_dashboard(
            "abc",
            &response(json!({"meta": "oops", "dashboard": {"title": 5, "panels": "none", "templating": []}})),
        );

        assert!(summary.title.is_empty());
        assert_eq!(summary.panel_count, 0);
        assert!(summary.panels.is_empty());
        assert!(summary.variables.is_empty());

        let value = serde_json::to_value(&summary).expect("serializes");
        assert_eq!(value["panels"], json!([]));
        assert_eq!(value["panelCount"], 0);
        assert!(value.get("variables").is_none());
    }
}
