//! Tempo search API types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::wire::Uint64String;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TagsResponse {
    #[serde(rename = "tagNames")]
    pub tag_names: Vec<String>,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TagValuesResponse {
    #[serde(rename = "tagValues")]
    pub tag_values: Vec<String>,
}

/// Response of `/api/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub traces: Vec<TraceSearchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<SearchMetrics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSearchResult {
    #[serde(rename = "traceID")]
    pub trace_id: String,
    #[serde(rename = "rootServiceName")]
    pub root_service_name: String,
    #[serde(rename = "rootTraceName")]
    pub root_trace_name: String,
    #[serde(rename = "startTimeUnixNano")]
    pub start_time_unix_nano: String,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    #[serde(rename = "spanSets", skip_serializing_if = "Vec::is_empty")]
    pub span_sets: Vec<SpanSet>,
    #[serde(rename = "serviceStats", skip_serializing_if = "Map::is_empty")]
    pub service_stats: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanSet {
    pub spans: Vec<Span>,
    pub matched: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Span {
    #[serde(rename = "spanID")]
    pub span_id: String,
    #[serde(rename = "startTimeUnixNano")]
    pub start_time_unix_nano: String,
    #[serde(rename = "durationNanos")]
    pub duration_nanos: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attribute {
    pub key: String,
    pub value: Value,
}

/// Search statistics. `inspected_traces` is a protobuf `uint32` (JSON
/// number); `inspected_bytes` is a `uint64` and arrives as a string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchMetrics {
    #[serde(rename = "inspectedTraces", skip_serializing_if = "is_zero")]
    pub inspected_traces: u32,
    #[serde(rename = "inspectedBytes", skip_serializing_if = "Uint64String::is_zero")]
    pub inspected_bytes: Uint64String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &u32) -> bool {
    *value == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_response_decodes_string_encoded_bytes() {
        let response: SearchResponse = serde_json::from_value(json!({
            "traces": [{
                "traceID": "2f3e",
                "rootServiceName": "api",
                "rootTraceName": "GET /",
                "startTimeUnixNano": "1700000000000000000",
                "durationMs": 12
            }],
            "metrics": {"inspectedTraces": 7, "inspectedBytes": "12345678901234"}
        }))
        .expect("search response decodes");

        let metrics = response.metrics.expect("metrics present");
        assert_eq!(metrics.inspected_traces, 7);
        assert_eq!(metrics.inspected_bytes.get(), 12_345_678_901_234);
        assert_eq!(response.traces[0].duration_ms, 12);
    }

    #[test]
    fn malformed_inspected_bytes_fails_decoding() {
        let result = serde_json::from_value::<SearchResponse>(json!({
            "traces": [],
            "metrics": {"inspectedBytes": "abc"}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn empty_metrics_fields_are_omitted_on_output() {
        let response: SearchResponse = serde_json::from_value(json!({
            "traces": [],
            "metrics": {"inspectedBytes": ""}
        }))
        .expect("empty string decodes to zero");
        let value = serde_json::to_value(&response).expect("serializes");

        assert_eq!(value["metrics"], json!({}));
        assert_eq!(value["traces"], json!([]));
    }
}
