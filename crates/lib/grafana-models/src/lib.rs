//! Wire and summary models for grafana-mcp.
//!
//! Types here mirror the JSON shapes of Grafana's REST APIs and the proxied
//! Loki, Prometheus, and Tempo APIs, plus the compact summaries returned to
//! MCP callers. No I/O happens in this crate.

pub mod alerting;
pub mod dashboard;
pub mod datasource;
pub mod lenient;
pub mod loki;
pub mod prometheus;
pub mod tempo;
pub mod wire;

pub use alerting::{AlertRule, RuleState, RuleSummary};
pub use dashboard::{DashboardDocument, DashboardSummary, PanelQuery, SearchResult};
pub use datasource::Datasource;
pub use wire::Uint64String;
