//! Grafana API client and response normalization for grafana-mcp.
//!
//! Every operation is a stateless request: build a [`GrafanaClient`] from a
//! [`GrafanaConfig`], make one or two HTTP calls, and reshape the JSON into
//! the compact models from `grafana-models`.

pub mod alerting;
pub mod client;
pub mod dashboard;
pub mod datasources;
pub mod error;
pub mod limits;
pub mod loki;
pub mod prometheus;
mod proxy;
pub mod tempo;
pub mod time_range;

pub use client::{ConfigError, GrafanaClient, GrafanaConfig};
pub use error::GrafanaError;
pub use time_range::TimeRange;

impl GrafanaClient {
    #[must_use]
    pub const fn alerting(&self) -> alerting::Alerting<'_> {
        alerting::Alerting::new(self)
    }

    #[must_use]
    pub const fn dashboards(&self) -> dashboard::Dashboards<'_> {
        dashboard::Dashboards::new(self)
    }

    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for a blank datasource uid.
    pub fn loki(&self, datasource_uid: &str) -> Result<loki::Loki<'_>, GrafanaError> {
        loki::Loki::new(self, datasource_uid)
    }

    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for a blank datasource uid.
    pub fn prometheus(
        &self,
        datasource_uid: &str,
    ) -> Result<prometheus::Prometheus<'_>, GrafanaError> {
        prometheus::Prometheus::new(self, datasource_uid)
    }

    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for a blank datasource uid.
    pub fn tempo(&self, datasource_uid: &str) -> Result<tempo::Tempo<'_>, GrafanaError> {
        tempo::Tempo::new(self, datasource_uid)
    }
}
