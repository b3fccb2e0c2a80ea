//! Loki API response types and the flattened log entry view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stream label that marks a metric (numeric) result.
pub const METRIC_STREAM_TYPE: &str = "metrics";

/// Response of the label name and label value endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LabelResponse {
    pub status: String,
    pub data: Vec<String>,
}

/// Response of `/loki/api/v1/index/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub streams: u64,
    pub chunks: u64,
    pub entries: u64,
    pub bytes: u64,
}

/// Response of `/loki/api/v1/query_range`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryRangeResponse {
    pub status: String,
    pub data: QueryRangeData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryRangeData {
    #[serde(rename = "resultType")]
    pub result_type: String,
    pub result: Vec<LogStream>,
}

/// One labelled stream with `[timestamp, value]` pairs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogStream {
    pub stream: BTreeMap<String, String>,
    pub values: Vec<Vec<Value>>,
}

impl LogStream {
    #[must_use]
    pub fn is_metric(&self) -> bool {
        self.stream.get("__type__").map(String::as_str) == Some(METRIC_STREAM_TYPE)
    }
}

/// A single flattened log line or metric sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub labels: BTreeMap<String, String>,
}
