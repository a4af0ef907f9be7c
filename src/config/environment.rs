use std::env;

/// Which of the two HTTP services a process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Backend,
    Frontend,
}

impl Service {
    pub fn default_port(self) -> u16 {
        match self {
            Service::Backend => 5000,
            Service::Frontend => 3001,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Service::Backend => "backend",
            Service::Frontend => "frontend",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),

    #[error("COLLECT_DEFAULT_METRICS must be true or false, got {0:?}")]
    InvalidFlag(String),
}

/// Environment configuration
/// Loads and validates environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub service: Service,
    pub host: String,
    pub port: u16,
    pub collect_default_metrics: bool,
}

impl Config {
    pub fn from_env(service: Service) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(service, |key| env::var(key).ok())
    }

    /// Build a config from any key/value source. Unset and blank values fall
    /// back to the defaults.
    pub fn from_lookup<F>(service: Service, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match value("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => service.default_port(),
        };

        let host = value("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let collect_default_metrics = match value("COLLECT_DEFAULT_METRICS") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag(raw))?,
            None => true,
        };

        Ok(Self {
            service,
            host,
            port,
            collect_default_metrics,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
