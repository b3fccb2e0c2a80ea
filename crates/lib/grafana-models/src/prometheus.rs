//! Prometheus HTTP API envelope and query result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status value of a successful Prometheus (and Loki) response.
pub const SUCCESS_STATUS: &str = "success";

/// Standard `{status, data, error}` wrapper of every Prometheus API response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub status: String,
    pub data: Option<Value>,
    pub error: String,
    #[serde(rename = "errorType")]
    pub error_type: String,
}

impl Envelope {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

/// Payload of `/api/v1/query` and `/api/v1/query_range`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(rename = "resultType", default)]
    pub result_type: String,
    #[serde(default)]
    pub result: Value,
}
