//! Loki queries through the Grafana datasource proxy.

use grafana_models::loki::{LabelResponse, LogEntry, LogStream, QueryRangeResponse, Stats};
use grafana_models::prometheus::SUCCESS_STATUS;
use serde_json::Value;

use crate::client::{GrafanaClient, require};
use crate::error::GrafanaError;
use crate::limits::LimitPolicy;
use crate::proxy::proxy_segments;
use crate::time_range::{TimeRange, present};

pub const LOG_LIMIT: LimitPolicy = LimitPolicy::new(10).with_max(100);
pub const DEFAULT_DIRECTION: &str = "backward";
/// Byte ceiling for Loki response bodies.
pub const MAX_BODY_BYTES: usize = 1024 * 1024 * 48;

/// A log query over a time window.
#[derive(Debug, Clone)]
pub struct LogQuery<'q> {
    pub logql: &'q str,
    pub range: TimeRange,
    pub limit: usize,
    pub direction: Option<&'q str>,
}

/// Loki client bound to one datasource.
#[derive(Debug, Clone)]
pub struct Loki<'a> {
    client: &'a GrafanaClient,
    datasource_uid: String,
}

impl<'a> Loki<'a> {
    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for a blank datasource uid.
    pub fn new(client: &'a GrafanaClient, datasource_uid: &str) -> Result<Self, GrafanaError> {
        let datasource_uid = require("datasourceUid", datasource_uid)?.to_string();
        Ok(Self {
            client,
            datasource_uid,
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, GrafanaError> {
        let segments = proxy_segments(&self.datasource_uid, path);
        self.client
            .get_bounded(&segments, query, MAX_BODY_BYTES)
            .await
    }

    async fn labels(
        &self,
        path: &[&str],
        range: &TimeRange,
    ) -> Result<Vec<String>, GrafanaError> {
        let response: LabelResponse = self.get(path, &range.nanos_params()?).await?;
        if response.status != SUCCESS_STATUS {
            return Err(GrafanaError::decode(format!(
                "loki API returned unexpected status: {}",
                response.status
            )));
        }
        Ok(response.data)
    }

    /// # Errors
    /// Returns transport, status, size, or decode failures.
    pub async fn label_names(&self, range: &TimeRange) -> Result<Vec<String>, GrafanaError> {
        self.labels(&["loki", "api", "v1", "labels"], range).await
    }

    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for a blank label name, otherwise
    /// transport, status, size, or decode failures.
    pub async fn label_values(
        &self,
        label_name: &str,
        range: &TimeRange,
    ) -> Result<Vec<String>, GrafanaError> {
        let label_name = require("labelName", label_name)?;
        self.labels(&["loki", "api", "v1", "label", label_name, "values"], range)
            .await
    }

    /// Index statistics for a stream selector.
    ///
    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for a blank query, otherwise
    /// transport, status, size, or decode failures.
    pub async fn stats(&self, logql: &str, range: &TimeRange) -> Result<Stats, GrafanaError> {
        let logql = require("logql", logql)?;
        let mut query = vec![("query", logql.to_string())];
        query.extend(range.nanos_params()?);
        self.get(&["loki", "api", "v1", "index", "stats"], &query)
            .await
    }

    /// Runs a range query and flattens the streams into entries.
    ///
    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for a blank query, otherwise
    /// transport, status, size, or decode failures.
    pub async fn query_logs(&self, request: &LogQuery<'_>) -> Result<Vec<LogEntry>, GrafanaError> {
        let logql = require("logql", request.logql)?;
        let mut query = vec![("query", logql.to_string())];
        query.extend(request.range.nanos_params()?);
        if request.limit > 0 {
            query.push(("limit", request.limit.to_string()));
        }
        let direction = present(request.direction).unwrap_or(DEFAULT_DIRECTION);
        query.push(("direction", direction.to_string()));

        let response: QueryRangeResponse = self
            .get(&["loki", "api", "v1", "query_range"], &query)
            .await?;
        if response.status != SUCCESS_STATUS {
            return Err(GrafanaError::decode(format!(
                "loki API returned unexpected status: {}",
                response.status
            )));
        }
        Ok(flatten_streams(&response.data.result))
    }
}

/// Turns streams into one entry per `[timestamp, value]` pair. Metric streams
/// yield numeric values, log streams yield lines; malformed pairs are skipped.
#[must_use]
pub fn flatten_streams(streams: &[LogStream]) -> Vec<LogEntry> {
    streams
        .iter()
        .flat_map(|stream| {
            let metric = stream.is_metric();
            stream.values.iter().filter_map(move |pair| {
                let [timestamp, value, ..] = pair.as_slice() else {
                    return None;
                };
                let mut entry = LogEntry {
                    timestamp: timestamp_text(timestamp),
                    labels: stream.stream.clone(),
                    ..LogEntry::default()
                };
                if metric {
                    entry.value = Some(metric_value(value)?);
                } else {
                    entry.line = Some(value.as_str()?.to_string());
                }
                Some(entry)
            })
        })
        .collect()
}

fn timestamp_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn metric_value(value: &Value) -> Option<f64> {
    match value {
        Value::String(text) => text.parse().ok(),
        other => other.as_f64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn streams(value: Value) -> Vec<LogStream> {
        serde_json::from_value(value).expect("streams decode")
    }

    #[test]
    fn log_streams_flatten_to_lines_with_labels() {
        let entries = flatten_streams(&streams(json!([
            {"stream": {"app": "nginx"}, "values": [
                ["1700000000000000000", "GET / 200"],
                ["1700000000000000001", "GET /health 200"]
            ]},
            {"stream": {"app": "api"}, "values": [["1700000000000000002", "boom"]]}
        ])));

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].timestamp, "1700000000000000000");
        assert_eq!(entries[0].line.as_deref(), Some("GET / 200"));
        assert!(entries[0].value.is_none());
        assert_eq!(entries[2].labels.get("app").map(String::as_str), Some("api"));
    }

    #[test]
    fn metric_streams_accept_string_and_number_values() {
        let entries = flatten_streams(&streams(json!([
            {"stream": {"__type__": "metrics"}, "values": [
                ["1700000000", "1.5"],
                ["1700000060", 2],
                ["1700000120", "NaN-ish"],
                ["1700000180", {"nested": true}]
            ]}
        ])));

        let values: Vec<f64> = entries.iter().filter_map(|entry| entry.value).collect();
        assert_eq!(values, vec![1.5, 2.0]);
        assert!(entries.iter().all(|entry| entry.line.is_none()));
    }

    #[test]
    fn short_pairs_and_non_string_lines_are_skipped() {
        let entries = flatten_streams(&streams(json!([
            {"stream": {}, "values": [["1"], [], ["2", 42], ["3", "kept"]]}
        ])));

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].line.as_deref(), Some("kept"));
    }

    #[test]
    fn log_limit_defaults_and_clamps() {
        assert_eq!(LOG_LIMIT.resolve(None), 10);
        assert_eq!(LOG_LIMIT.resolve(Some(1_000)), 100);
    }
}
