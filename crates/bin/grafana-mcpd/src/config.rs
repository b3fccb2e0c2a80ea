use clap::{Parser, builder::BoolishValueParser};
use grafana_core::GrafanaConfig;
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4020";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SSE_KEEP_ALIVE_SECS: u64 = 15;

#[derive(Parser, Debug)]
#[command(name = "grafana-mcpd", version, about = "Grafana MCP daemon.")]
struct CliArgs {
    #[arg(long, env = "GRAFANA_URL")]
    grafana_url: Option<String>,

    #[arg(long, env = "GRAFANA_API_KEY", hide_env_values = true)]
    grafana_api_key: Option<String>,

    #[arg(long, env = "GRAFANA_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[arg(
        long = "stdio",
        env = "GRAFANA_MCP_STDIO",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long,
        env = "GRAFANA_MCP_SERVE",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    mcp_serve: bool,

    #[arg(long, env = "GRAFANA_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,

    #[arg(
        long,
        env = "GRAFANA_MCP_STATEFUL",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    stateful: bool,

    #[arg(
        long,
        env = "GRAFANA_MCP_SSE_KEEP_ALIVE_SECS",
        default_value_t = DEFAULT_SSE_KEEP_ALIVE_SECS
    )]
    sse_keep_alive_secs: u64,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Debug, Clone)]
pub struct McpdConfig {
    pub grafana: GrafanaConfig,
    pub enable_stdio: bool,
    pub mcp_serve: bool,
    pub mcp_http_addr: SocketAddr,
    pub stateful: bool,
    pub sse_keep_alive: Option<Duration>,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl McpdConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for McpdConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if !args.enable_stdio && !args.mcp_serve {
            return Err(ConfigError::MissingSetting(
                "GRAFANA_MCP_STDIO or GRAFANA_MCP_SERVE",
            ));
        }
        if args.timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "GRAFANA_TIMEOUT_SECS",
                value: args.timeout_secs.to_string(),
            });
        }

        // Missing credentials are reported per tool call, not here.
        let grafana = GrafanaConfig::new(
            args.grafana_url.unwrap_or_default(),
            args.grafana_api_key.unwrap_or_default(),
        )
        .with_timeout(Duration::from_secs(args.timeout_secs));

        let sse_keep_alive =
            (args.sse_keep_alive_secs > 0).then(|| Duration::from_secs(args.sse_keep_alive_secs));

        Ok(Self {
            grafana,
            enable_stdio: args.enable_stdio,
            mcp_serve: args.mcp_serve,
            mcp_http_addr: args.mcp_http_addr,
            stateful: args.stateful,
            sse_keep_alive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            grafana_url: Some("http://localhost:3000/".to_string()),
            grafana_api_key: Some("glsa_token".to_string()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            enable_stdio: true,
            mcp_serve: false,
            mcp_http_addr: DEFAULT_MCP_HTTP_ADDR.parse().expect("valid MCP addr"),
            stateful: true,
            sse_keep_alive_secs: DEFAULT_SSE_KEEP_ALIVE_SECS,
        }
    }

    #[test]
    fn trims_the_trailing_slash_from_the_grafana_url() {
        let config = McpdConfig::try_from(base_args()).expect("config should parse");

        assert_eq!(config.grafana.base_url(), "http://localhost:3000");
        assert_eq!(config.grafana.timeout(), Duration::from_secs(30));
        assert!(config.grafana.validate().is_ok());
    }

    #[test]
    fn missing_credentials_do_not_block_startup() {
        let mut args = base_args();
        args.grafana_url = None;
        args.grafana_api_key = Some("   ".to_string());

        let config = McpdConfig::try_from(args).expect("config should parse");

        assert!(config.grafana.validate().is_err());
    }

    #[test]
    fn requires_at_least_one_transport() {
        let mut args = base_args();
        args.enable_stdio = false;
        args.mcp_serve = false;

        let err = McpdConfig::try_from(args).expect_err("no transport");

        assert!(matches!(err, ConfigError::MissingSetting(_)));
    }

    #[test]
    fn rejects_a_zero_timeout() {
        let mut args = base_args();
        args.timeout_secs = 0;

        let err = McpdConfig::try_from(args).expect_err("zero timeout");

        assert!(matches!(
            err,
            ConfigError::InvalidSetting {
                name: "GRAFANA_TIMEOUT_SECS",
                ..
            }
        ));
    }

    #[test]
    fn zero_keep_alive_disables_sse_pings() {
        let mut args = base_args();
        args.sse_keep_alive_secs = 0;

        let config = McpdConfig::try_from(args).expect("config should parse");

        assert!(config.sse_keep_alive.is_none());
    }
}
