use crate::dashboard::UrgencyWeights;
use std::env;
use std::net::{IpAddr, SocketAddr};

/// Deployment stage of the triage service; telemetry picks its output
/// shape from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Runtime configuration for the triage service, read from `TRIAGE_*`
/// environment variables (a `.env` file is honored in development).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    /// Urgency weight table applied by the service; `TRIAGE_URGENCY_WEIGHTS`
    /// accepts a JSON object overriding any subset of the default weights.
    pub weights: UrgencyWeights,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::parse(&var_or("TRIAGE_ENV", "development"));

        let host = var_or("TRIAGE_HOST", "127.0.0.1");
        let raw_port = var_or("TRIAGE_PORT", "8080");
        let port = raw_port
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort { value: raw_port })?;

        let log_level = var_or("TRIAGE_LOG_LEVEL", "info");

        let weights = match env::var("TRIAGE_URGENCY_WEIGHTS") {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|source| ConfigError::InvalidWeights { source })?,
            Err(_) => UrgencyWeights::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            weights,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// HTTP listener binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host = if self.host.eq_ignore_ascii_case("localhost") {
            "127.0.0.1"
        } else {
            self.host.as_str()
        };

        let ip: IpAddr = host.parse().map_err(|source| ConfigError::InvalidHost {
            host: self.host.clone(),
            source,
        })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TRIAGE_PORT '{value}' must be a valid u16")]
    InvalidPort { value: String },
    #[error("TRIAGE_HOST '{host}' must be an IP address or localhost")]
    InvalidHost {
        host: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("TRIAGE_URGENCY_WEIGHTS is not a valid weight table")]
    InvalidWeights {
        #[source]
        source: serde_json::Error,
    },
}
