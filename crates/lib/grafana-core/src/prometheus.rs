//! Prometheus queries through the Grafana datasource proxy.

use std::str::FromStr;

use grafana_models::prometheus::{Envelope, QueryResult};
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::client::{GrafanaClient, require};
use crate::error::GrafanaError;
use crate::limits::LimitPolicy;
use crate::proxy::proxy_segments;
use crate::time_range::{TimeRange, parse_rfc3339, present};

pub const LABEL_LIMIT: LimitPolicy = LimitPolicy::new(100);
pub const DEFAULT_STEP_SECONDS: i64 = 60;

const METRIC_NAME_LABEL: &str = "__name__";

/// Kind of PromQL evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryType {
    #[default]
    Instant,
    Range,
}

impl FromStr for QueryType {
    type Err = GrafanaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" | "instant" => Ok(Self::Instant),
            "range" => Ok(Self::Range),
            other => Err(GrafanaError::invalid_input(format!(
                "invalid queryType: {other} (must be 'instant' or 'range')"
            ))),
        }
    }
}

/// A PromQL query request. `time` applies to instant queries; `start`, `end`,
/// and `step_seconds` to range queries.
#[derive(Debug, Clone, Default)]
pub struct PromQuery<'q> {
    pub expr: &'q str,
    pub query_type: QueryType,
    pub time: Option<&'q str>,
    pub start: Option<&'q str>,
    pub end: Option<&'q str>,
    pub step_seconds: Option<i64>,
}

/// Prometheus client bound to one datasource.
#[derive(Debug, Clone)]
pub struct Prometheus<'a> {
    client: &'a GrafanaClient,
    datasource_uid: String,
}

impl<'a> Prometheus<'a> {
    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for a blank datasource uid.
    pub fn new(client: &'a GrafanaClient, datasource_uid: &str) -> Result<Self, GrafanaError> {
        let datasource_uid = require("datasourceUid", datasource_uid)?.to_string();
        Ok(Self {
            client,
            datasource_uid,
        })
    }

    /// Fetches an API response and unwraps its `data` member.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, GrafanaError> {
        let segments = proxy_segments(&self.datasource_uid, path);
        let envelope: Envelope = self.client.get_json(&segments, query).await?;
        unwrap_envelope(envelope)
    }

    /// # Errors
    /// Returns transport, status, or decode failures.
    pub async fn label_names(
        &self,
        range: &TimeRange,
        limit: usize,
    ) -> Result<Vec<String>, GrafanaError> {
        let mut names: Vec<String> = self
            .get(&["api", "v1", "labels"], &range.seconds_params())
            .await?;
        names.truncate(limit);
        Ok(names)
    }

    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for a blank label name, otherwise
    /// transport, status, or decode failures.
    pub async fn label_values(
        &self,
        label_name: &str,
        range: &TimeRange,
        limit: usize,
    ) -> Result<Vec<String>, GrafanaError> {
        let mut values = self.all_label_values(label_name, range).await?;
        values.truncate(limit);
        Ok(values)
    }

    async fn all_label_values(
        &self,
        label_name: &str,
        range: &TimeRange,
    ) -> Result<Vec<String>, GrafanaError> {
        let label_name = require("labelName", label_name)?;
        self.get(
            &["api", "v1", "label", label_name, "values"],
            &range.seconds_params(),
        )
        .await
    }

    /// Lists metric names, optionally filtered by a regular expression.
    ///
    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for an invalid pattern, otherwise
    /// transport, status, or decode failures.
    pub async fn metric_names(
        &self,
        pattern: Option<&str>,
        range: &TimeRange,
        limit: usize,
    ) -> Result<Vec<String>, GrafanaError> {
        let filter = present(pattern)
            .map(|pattern| {
                Regex::new(pattern)
                    .map_err(|err| GrafanaError::invalid_input(format!("invalid regex: {err}")))
            })
            .transpose()?;
        let names = self.all_label_values(METRIC_NAME_LABEL, range).await?;
        Ok(filter_names(names, filter.as_ref(), limit))
    }

    /// Evaluates a PromQL expression.
    ///
    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for a blank expression or bad
    /// timestamp, otherwise transport, status, or decode failures.
    pub async fn query(&self, request: &PromQuery<'_>) -> Result<QueryResult, GrafanaError> {
        let expr = require("expr (PromQL expression)", request.expr)?;
        let mut query = vec![("query", expr.to_string())];
        match request.query_type {
            QueryType::Instant => {
                if let Some(time) = present(request.time) {
                    query.push(("time", parse_rfc3339("time", time)?.timestamp().to_string()));
                }
                self.get(&["api", "v1", "query"], &query).await
            }
            QueryType::Range => {
                let range = TimeRange::resolve(request.start, request.end)?;
                let step = request
                    .step_seconds
                    .filter(|step| *step > 0)
                    .unwrap_or(DEFAULT_STEP_SECONDS);
                query.extend(range.seconds_params());
                query.push(("step", step.to_string()));
                self.get(&["api", "v1", "query_range"], &query).await
            }
        }
    }
}

/// Checks the `{status, data, error}` envelope and decodes `data`.
///
/// # Errors
/// Returns [`GrafanaError::Decode`] when the status is not `success` or the
/// data does not match `T`.
pub fn unwrap_envelope<T: DeserializeOwned>(envelope: Envelope) -> Result<T, GrafanaError> {
    if !envelope.is_success() {
        return Err(GrafanaError::decode(format!(
            "prometheus API error: {}",
            envelope.error
        )));
    }
    let data = envelope.data.unwrap_or_default();
    Ok(serde_json::from_value(data)?)
}

fn filter_names(names: Vec<String>, filter: Option<&Regex>, limit: usize) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| filter.is_none_or(|regex| regex.is_match(name)))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_type_parses_known_values_only() {
        assert_eq!("".parse::<QueryType>().expect("empty"), QueryType::Instant);
        assert_eq!("range".parse::<QueryType>().expect("range"), QueryType::Range);
        let err = "scalar".parse::<QueryType>().expect_err("unknown type");
        assert!(err.to_string().contains("must be 'instant' or 'range'"));
    }

    #[test]
    fn envelope_errors_surface_the_upstream_message() {
        let envelope: Envelope = serde_json::from_value(json!({
            "status": "error",
            "errorType": "bad_data",
            "error": "parse error at char 4"
        }))
        .expect("envelope decodes");

        let err = unwrap_envelope::<QueryResult>(envelope).expect_err("status is error");
        assert_eq!(err.to_string(), "decoding response: prometheus API error: parse error at char 4");
    }

    #[test]
    fn envelope_data_decodes_into_the_requested_shape() {
        let envelope: Envelope = serde_json::from_value(json!({
            "status": "success",
            "data": {"resultType": "vector", "result": [{"metric": {}, "value": [1, "1"]}]}
        }))
        .expect("envelope decodes");

        let result: QueryResult = unwrap_envelope(envelope).expect("success");
        assert_eq!(result.result_type, "vector");
        assert!(result.result.is_array());
    }

    #[test]
    fn metric_names_filter_then_truncate() {
        let names = vec![
            "node_cpu_seconds_total".to_string(),
            "up".to_string(),
            "node_memory_bytes".to_string(),
            "node_load1".to_string(),
        ];
        let regex = Regex::new("^node_").expect("valid regex");

        assert_eq!(
            filter_names(names.clone(), Some(&regex), 2),
            vec!["node_cpu_seconds_total".to_string(), "node_memory_bytes".to_string()]
        );
        assert_eq!(filter_names(names, None, 100).len(), 4);
    }
}
