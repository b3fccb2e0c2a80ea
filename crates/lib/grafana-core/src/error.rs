use std::error::Error;
use std::fmt;

use crate::client::ConfigError;

/// Failure of a Grafana-backed operation.
#[derive(Debug)]
pub enum GrafanaError {
    /// Client configuration is missing or invalid. Raised before any request.
    Config(ConfigError),
    /// A caller-supplied argument was rejected before any request.
    InvalidInput(String),
    /// Grafana or the proxied datasource could not be reached.
    UpstreamUnavailable(String),
    /// Upstream answered with a non-success status.
    UpstreamError { status: u16, body: String },
    /// A single-resource lookup answered with a non-success status.
    NotFound {
        resource: String,
        status: u16,
        body: String,
    },
    /// The response body was not the expected JSON.
    Decode(String),
    /// A bounded response body exceeded its byte ceiling.
    BodyTooLarge { limit: usize },
    /// The calling request was cancelled while the upstream call was in flight.
    Cancelled,
}

impl GrafanaError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Rewrites an upstream status failure as a lookup miss for `resource`.
    #[must_use]
    pub fn into_not_found(self, resource: impl Into<String>) -> Self {
        match self {
            Self::UpstreamError { status, body } => Self::NotFound {
                resource: resource.into(),
                status,
                body,
            },
            other => other,
        }
    }

    /// Returns `true` when the failure happened before any request was made.
    #[must_use]
    pub const fn is_rejected_locally(&self) -> bool {
        matches!(self, Self::Config(_) | Self::InvalidInput(_))
    }
}

impl fmt::Display for GrafanaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::InvalidInput(message) => write!(f, "{message}"),
            Self::UpstreamUnavailable(message) => write!(f, "executing request: {message}"),
            Self::UpstreamError { status, body } => {
                write!(f, "API returned status {status}: {body}")
            }
            Self::NotFound {
                resource,
                status,
                body,
            } => write!(f, "{resource} not found (status {status}): {body}"),
            Self::Decode(message) => write!(f, "decoding response: {message}"),
            Self::BodyTooLarge { limit } => {
                write!(f, "response body exceeds the {limit} byte limit")
            }
            Self::Cancelled => write!(f, "request cancelled"),
        }
    }
}

impl Error for GrafanaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for GrafanaError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<reqwest::Error> for GrafanaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        Self::UpstreamUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for GrafanaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::GrafanaError;

    #[test]
    fn status_failures_become_not_found_for_lookups() {
        let err = GrafanaError::UpstreamError {
            status: 404,
            body: "{\"message\":\"rule not found\"}".to_string(),
        }
        .into_not_found("alert rule abc");

        assert!(matches!(err, GrafanaError::NotFound { status: 404, .. }));
        assert!(err.to_string().starts_with("alert rule abc not found"));
    }

    #[test]
    fn transport_failures_are_not_rewritten() {
        let err = GrafanaError::UpstreamUnavailable("connection refused".to_string())
            .into_not_found("alert rule abc");
        assert!(matches!(err, GrafanaError::UpstreamUnavailable(_)));
    }
}
