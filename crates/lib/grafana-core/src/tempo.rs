//! Tempo trace search through the Grafana datasource proxy.

use grafana_models::tempo::{SearchResponse, TagValuesResponse, TagsResponse};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::{GrafanaClient, require};
use crate::error::GrafanaError;
use crate::limits::LimitPolicy;
use crate::proxy::proxy_segments;
use crate::time_range::{TimeRange, present};

pub const TRACE_LIMIT: LimitPolicy = LimitPolicy::new(20).with_max(100);
/// Byte ceiling for Tempo response bodies.
pub const MAX_BODY_BYTES: usize = 1024 * 1024 * 48;

/// Tempo client bound to one datasource.
#[derive(Debug, Clone)]
pub struct Tempo<'a> {
    client: &'a GrafanaClient,
    datasource_uid: String,
}

impl<'a> Tempo<'a> {
    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for a blank datasource uid.
    pub fn new(client: &'a GrafanaClient, datasource_uid: &str) -> Result<Self, GrafanaError> {
        let datasource_uid = require("datasourceUid", datasource_uid)?.to_string();
        Ok(Self {
            client,
            datasource_uid,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, GrafanaError> {
        let segments = proxy_segments(&self.datasource_uid, path);
        self.client
            .get_bounded(&segments, query, MAX_BODY_BYTES)
            .await
    }

    /// Lists tag names, optionally restricted to a scope
    /// (`resource`, `span`, `intrinsic`).
    ///
    /// # Errors
    /// Returns transport, status, size, or decode failures.
    pub async fn tag_names(
        &self,
        scope: Option<&str>,
        range: &TimeRange,
    ) -> Result<Vec<String>, GrafanaError> {
        let mut query = Vec::new();
        if let Some(scope) = present(scope) {
            query.push(("scope", scope.to_string()));
        }
        query.extend(range.seconds_params());
        let response: TagsResponse = self.get(&["api", "search", "tags"], &query).await?;
        Ok(response.tag_names)
    }

    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for a blank tag name, otherwise
    /// transport, status, size, or decode failures.
    pub async fn tag_values(
        &self,
        tag_name: &str,
        range: &TimeRange,
    ) -> Result<Vec<String>, GrafanaError> {
        let tag_name = require("tagName", tag_name)?;
        let response: TagValuesResponse = self
            .get(
                &["api", "search", "tag", tag_name, "values"],
                &range.seconds_params(),
            )
            .await?;
        Ok(response.tag_values)
    }

    /// Searches traces with an optional TraceQL query.
    ///
    /// # Errors
    /// Returns transport, status, size, or decode failures, including a
    /// malformed string-encoded 64-bit metric.
    pub async fn search(
        &self,
        traceql: Option<&str>,
        range: &TimeRange,
        limit: usize,
    ) -> Result<SearchResponse, GrafanaError> {
        let mut query = Vec::new();
        if let Some(traceql) = present(traceql) {
            query.push(("q", traceql.to_string()));
        }
        query.extend(range.seconds_params());
        if limit > 0 {
            query.push(("limit", limit.to_string()));
        }
        self.get(&["api", "search"], &query).await
    }

    /// Fetches a complete trace, returned as upstream JSON.
    ///
    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for a blank trace id, otherwise
    /// transport, status, size, or decode failures.
    pub async fn trace(&self, trace_id: &str) -> Result<Value, GrafanaError> {
        let trace_id = require("traceId", trace_id)?;
        self.get(&["api", "traces", trace_id], &[]).await
    }
}
