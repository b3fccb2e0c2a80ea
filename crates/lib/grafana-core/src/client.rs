//! Authenticated Grafana HTTP client.
//!
//! A [`GrafanaClient`] is built per call from an immutable [`GrafanaConfig`].
//! Every request carries `Authorization: Bearer <key>`; paths are given as
//! segments and percent-encoded onto the configured base URL.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use futures::StreamExt;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::GrafanaError;

pub const GRAFANA_URL_ENV: &str = "GRAFANA_URL";
pub const GRAFANA_API_KEY_ENV: &str = "GRAFANA_API_KEY";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const CONFIG_GUIDANCE: &str = "Please ensure the following environment variables are set:
  GRAFANA_URL       - Base URL of your Grafana instance (e.g., http://localhost:3000)
  GRAFANA_API_KEY   - Service account token for authentication

To create a service account token:
  1. In Grafana, go to Administration > Service accounts
  2. Click 'Add service account'
  3. Set a display name and assign the 'Viewer' role
  4. Click 'Add token' and copy the generated token";

/// Grafana client configuration problems. All are detected before any request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
    ClientBuild(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => {
                write!(f, "{name} environment variable not set\n\n{CONFIG_GUIDANCE}")
            }
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}\n\n{CONFIG_GUIDANCE}")
            }
            Self::ClientBuild(message) => write!(f, "building HTTP client: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Connection settings for a Grafana instance.
///
/// Values are stored as given; they are validated when a client is built so
/// that a missing setting surfaces as a tool error rather than a startup
/// failure.
#[derive(Clone, PartialEq, Eq)]
pub struct GrafanaConfig {
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl GrafanaConfig {
    /// Creates a configuration. A trailing `/` on the URL is trimmed.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self {
            base_url,
            api_key: api_key.into().trim().to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads `GRAFANA_URL` and `GRAFANA_API_KEY`. Unset variables are kept
    /// empty and reported when a client is built.
    #[must_use]
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).unwrap_or_default();
        Self::new(read(GRAFANA_URL_ENV), read(GRAFANA_API_KEY_ENV))
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Checks that both settings are present.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingSetting`] naming the first absent setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::MissingSetting(GRAFANA_URL_ENV));
        }
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingSetting(GRAFANA_API_KEY_ENV));
        }
        Ok(())
    }
}

impl fmt::Debug for GrafanaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrafanaConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Authenticated HTTP client bound to one Grafana instance.
#[derive(Debug, Clone)]
pub struct GrafanaClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GrafanaClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    /// Returns [`GrafanaError::Config`] if a setting is missing or malformed.
    pub fn new(config: &GrafanaConfig) -> Result<Self, GrafanaError> {
        config.validate()?;

        let base_url = Url::parse(&config.base_url).map_err(|err| ConfigError::InvalidSetting {
            name: GRAFANA_URL_ENV,
            value: format!("{} ({err})", config.base_url),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidSetting {
                name: GRAFANA_URL_ENV,
                value: config.base_url.clone(),
            }
            .into());
        }

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(
            |_| ConfigError::InvalidSetting {
                name: GRAFANA_API_KEY_ENV,
                value: "<contains characters not allowed in a header>".to_string(),
            },
        )?;
        bearer.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|err| ConfigError::ClientBuild(err.to_string()))?;

        Ok(Self { http, base_url })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves path segments against the base URL, percent-encoding each.
    pub(crate) fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments.iter().map(AsRef::as_ref));
        }
        url
    }

    async fn send<S: AsRef<str>>(
        &self,
        segments: &[S],
        query: &[(&str, String)],
    ) -> Result<Response, GrafanaError> {
        let url = self.endpoint(segments);
        debug!(path = url.path(), params = query.len(), "grafana request");

        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "grafana request failed");
            return Err(GrafanaError::UpstreamError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Fetches and decodes a JSON response.
    ///
    /// # Errors
    /// Returns transport, status, or decode failures.
    pub async fn get_json<T, S>(
        &self,
        segments: &[S],
        query: &[(&str, String)],
    ) -> Result<T, GrafanaError>
    where
        T: DeserializeOwned,
        S: AsRef<str>,
    {
        let response = self.send(segments, query).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Fetches a JSON response whose body is read chunk by chunk and refused
    /// once it exceeds `limit` bytes. An empty body is a decode failure.
    ///
    /// # Errors
    /// Returns transport, status, size, or decode failures.
    pub async fn get_bounded<T, S>(
        &self,
        segments: &[S],
        query: &[(&str, String)],
        limit: usize,
    ) -> Result<T, GrafanaError>
    where
        T: DeserializeOwned,
        S: AsRef<str>,
    {
        let response = self.send(segments, query).await?;
        let body = read_bounded(response, limit).await?;
        let body = body.trim_ascii();
        if body.is_empty() {
            return Err(GrafanaError::decode("empty response body"));
        }
        Ok(serde_json::from_slice(body)?)
    }
}

async fn read_bounded(response: Response, limit: usize) -> Result<Vec<u8>, GrafanaError> {
    if response
        .content_length()
        .is_some_and(|length| length > limit as u64)
    {
        return Err(GrafanaError::BodyTooLarge { limit });
    }

    let mut stream = response.bytes_stream();
    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if body.len() + chunk.len() > limit {
            return Err(GrafanaError::BodyTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Rejects a blank required argument before any request is made.
///
/// # Errors
/// Returns [`GrafanaError::InvalidInput`] naming `field`.
pub fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, GrafanaError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GrafanaError::invalid_input(format!("{field} is required")));
    }
    Ok(trimmed)
}
