use grafana_models::datasource::Datasource;

use crate::client::GrafanaClient;
use crate::error::GrafanaError;

/// Lists configured datasources.
///
/// # Errors
/// Returns transport, status, or decode failures.
pub async fn list_datasources(client: &GrafanaClient) -> Result<Vec<Datasource>, GrafanaError> {
    client.get_json(&["api", "datasources"], &[]).await
}
