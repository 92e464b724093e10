use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::survey::{SurveySettings, SurveyVersion};

const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the quiz service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub survey: SurveyConfig,
    pub database: DatabaseConfig,
    pub narrative: NarrativeConfig,
    pub rate_limit: RateLimitConfig,
    pub telemetry: TelemetryConfig,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn number_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_var(name) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { var: name }),
        None => Ok(default),
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let default_version = var_or("APP_SURVEY_VERSION", "short")
            .parse::<SurveyVersion>()
            .map_err(|error| ConfigError::InvalidSurveyVersion(error.0))?;

        let log_level = var_or("APP_LOG_LEVEL", "info");

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            survey: SurveyConfig {
                public_base_url: var_or("APP_PUBLIC_BASE_URL", "http://localhost:3000"),
                default_version,
            },
            database: DatabaseConfig {
                url: optional_var("DATABASE_URL"),
                max_connections: number_or("DATABASE_MAX_CONNECTIONS", 5)?,
            },
            narrative: NarrativeConfig {
                api_key: optional_var("GEMINI_API_KEY"),
                model: var_or("GEMINI_MODEL", "gemini-pro"),
                endpoint: var_or("GEMINI_ENDPOINT", DEFAULT_GEMINI_ENDPOINT),
                timeout: Duration::from_secs(number_or("NARRATIVE_TIMEOUT_SECS", 20)?),
            },
            rate_limit: RateLimitConfig {
                max_requests: number_or("RATE_LIMIT_MAX", 20)?,
                window: Duration::from_secs(number_or("RATE_LIMIT_WINDOW_SECS", 60)?),
            },
            telemetry: TelemetryConfig { log_level },
        })
    }

    /// Settings handed to the survey service.
    pub fn survey_settings(&self) -> SurveySettings {
        SurveySettings {
            default_version: self.survey.default_version,
            public_base_url: self.survey.public_base_url.clone(),
            narrative_timeout: self.narrative.timeout,
        }
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct SurveyConfig {
    /// Origin used when building share links.
    pub public_base_url: String,
    pub default_version: SurveyVersion,
}

/// Postgres connection settings. Without a URL the service keeps results in
/// memory.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct NarrativeConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { var: &'static str },
    InvalidSurveyVersion(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { var } => {
                write!(f, "{var} must be a non-negative integer")
            }
            ConfigError::InvalidSurveyVersion(value) => write!(
                f,
                "APP_SURVEY_VERSION must be 'short' or 'mini', got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidSurveyVersion(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for var in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_PUBLIC_BASE_URL",
            "APP_SURVEY_VERSION",
            "DATABASE_URL",
            "DATABASE_MAX_CONNECTIONS",
            "GEMINI_API_KEY",
            "GEMINI_MODEL",
            "GEMINI_ENDPOINT",
            "NARRATIVE_TIMEOUT_SECS",
            "RATE_LIMIT_MAX",
            "RATE_LIMIT_WINDOW_SECS",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.survey.default_version, SurveyVersion::Short);
        assert!(config.database.url.is_none());
        assert!(config.narrative.api_key.is_none());
        assert_eq!(config.narrative.timeout, Duration::from_secs(20));
        assert_eq!(config.rate_limit.max_requests, 20);
        assert_eq!(config.rate_limit.window, Duration::from_secs(60));
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn blank_secrets_count_as_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("GEMINI_API_KEY", "   ");
        env::set_var("APP_SURVEY_VERSION", "MINI");
        let config = AppConfig::load().expect("config loads");
        assert!(config.narrative.api_key.is_none());
        assert_eq!(config.survey_settings().default_version, SurveyVersion::Mini);
        reset_env();
    }

    #[test]
    fn rejects_malformed_numbers_and_versions() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RATE_LIMIT_MAX", "twenty");
        let error = AppConfig::load().expect_err("non-numeric limit rejected");
        assert!(matches!(
            error,
            ConfigError::InvalidNumber {
                var: "RATE_LIMIT_MAX"
            }
        ));

        reset_env();
        env::set_var("APP_SURVEY_VERSION", "long");
        let error = AppConfig::load().expect_err("unknown version rejected");
        assert!(matches!(error, ConfigError::InvalidSurveyVersion(ref v) if v == "long"));
        reset_env();
    }
}
