use grafana_models::dashboard::{DashboardDocument, DatasourceRef, Panel, PanelQuery, PanelTarget};

/// Flattens every target of every panel into a [`PanelQuery`].
///
/// Output order is panels in document order, then targets in document order.
/// Entries that are not objects are skipped.
#[must_use]
pub fn extract_panel_queries(document: &DashboardDocument) -> Vec<PanelQuery> {
    document
        .panels()
        .flat_map(|panel| {
            panel
                .targets
                .iter()
                .filter_map(|target| target.as_object())
                .map(move |target| panel_query(panel, target))
        })
        .collect()
}

fn panel_query(panel: &Panel, target: &PanelTarget) -> PanelQuery {
    let (datasource_uid, datasource_type) = resolve_datasource(&panel.datasource, &target.datasource);
    PanelQuery {
        panel_id: panel.id,
        panel_title: panel.title.clone(),
        datasource_uid,
        datasource_type,
        query_expr: query_expr(target).to_string(),
        ref_id: target.ref_id.clone().unwrap_or_default(),
        raw_query: target.raw.clone(),
    }
}

/// Target fields override panel fields one at a time, only when present.
fn resolve_datasource(panel: &DatasourceRef, target: &DatasourceRef) -> (String, String) {
    let pick = |own: &Option<String>, inherited: &Option<String>| {
        own.as_ref().or(inherited.as_ref()).cloned().unwrap_or_default()
    };
    (
        pick(&target.uid, &panel.uid),
        pick(&target.kind, &panel.kind),
    )
}

/// `expr` when non-empty, else `query` when non-empty, else empty.
fn query_expr(target: &PanelTarget) -> &str {
    [target.expr.as_deref(), target.query.as_deref()]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}
