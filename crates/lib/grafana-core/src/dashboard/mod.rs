//! Dashboard search, summaries, and panel query extraction.

mod extract;
mod summary;

pub use extract::extract_panel_queries;
pub use summary::summarize_dashboard;

use grafana_models::dashboard::{DashboardResponse, DashboardSummary, PanelQuery, SearchResult};

use crate::client::{GrafanaClient, require};
use crate::error::GrafanaError;
use crate::limits::LimitPolicy;
use crate::time_range::present;

pub const SEARCH_LIMIT: LimitPolicy = LimitPolicy::new(50);

const SEARCH_TYPE: &str = "dash-db";

/// Dashboard operations against one Grafana instance.
#[derive(Debug, Clone, Copy)]
pub struct Dashboards<'a> {
    client: &'a GrafanaClient,
}

impl<'a> Dashboards<'a> {
    #[must_use]
    pub const fn new(client: &'a GrafanaClient) -> Self {
        Self { client }
    }

    /// Searches dashboards by title query and tag.
    ///
    /// # Errors
    /// Returns transport, status, or decode failures.
    pub async fn search(
        &self,
        query: Option<&str>,
        tag: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SearchResult>, GrafanaError> {
        let mut params = vec![("type", SEARCH_TYPE.to_string())];
        if let Some(query) = present(query) {
            params.push(("query", query.to_string()));
        }
        if let Some(tag) = present(tag) {
            params.push(("tag", tag.to_string()));
        }
        if limit > 0 {
            params.push(("limit", limit.to_string()));
        }
        self.client.get_json(&["api", "search"], &params).await
    }

    /// Fetches the raw dashboard document and its metadata.
    ///
    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for a blank uid, otherwise
    /// transport, status, or decode failures. An empty dashboard is not an
    /// error.
    pub async fn fetch(&self, uid: &str) -> Result<DashboardResponse, GrafanaError> {
        let uid = require("uid", uid)?;
        self.client
            .get_json(&["api", "dashboards", "uid", uid], &[])
            .await
    }

    /// Fetches a dashboard and summarizes it.
    ///
    /// # Errors
    /// See [`Dashboards::fetch`].
    pub async fn summary(&self, uid: &str) -> Result<DashboardSummary, GrafanaError> {
        let response = self.fetch(uid).await?;
        Ok(summarize_dashboard(uid.trim(), &response))
    }

    /// Fetches a dashboard and extracts its panel queries.
    ///
    /// # Errors
    /// See [`Dashboards::fetch`].
    pub async fn panel_queries(&self, uid: &str) -> Result<Vec<PanelQuery>, GrafanaError> {
        let response = self.fetch(uid).await?;
        Ok(extract_panel_queries(&response.document()))
    }
}
