//! MCP tool modules.
//!
//! Tools are grouped by Grafana area: alerting, dashboards, and the Loki,
//! Prometheus, and Tempo datasource proxies.

pub mod alerting;
pub mod dashboard;
pub mod loki;
pub mod prometheus;
pub mod tempo;
