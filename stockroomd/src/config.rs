//! Daemon configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::{DaemonError, DaemonResult};
use std::env;
use std::time::Duration;

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Environment (test, development, production)
    pub environment: Environment,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection string; `None` runs on the in-memory store
    pub url: Option<String>,
    /// Pool size
    pub max_connections: u32,
    /// How long a request waits for a pooled connection
    pub acquire_timeout: Duration,
}

/// Environment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment (in-memory store)
    Test,
    /// Development environment
    Development,
    /// Production environment
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> DaemonResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let environment = Self::load_environment()?;
        let api = Self::load_api_config()?;
        let database = Self::load_database_config()?;

        if environment == Environment::Production && database.url.is_none() {
            return Err(DaemonError::Config(
                "DATABASE_URL is required in production".to_string(),
            ));
        }

        Ok(Self {
            api,
            database,
            environment,
        })
    }

    /// Create test configuration.
    pub fn test() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 2,
                acquire_timeout: Duration::from_secs(1),
            },
            environment: Environment::Test,
        }
    }

    fn load_environment() -> DaemonResult<Environment> {
        let env_str = env::var("STOCKROOM_ENV").unwrap_or_else(|_| "development".to_string());
        Environment::parse(&env_str)
    }

    fn load_api_config() -> DaemonResult<ApiConfig> {
        let host = env::var("STOCKROOM_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = Self::load_parsed_env("STOCKROOM_API_PORT", 8080u16)?;

        Ok(ApiConfig { host, port })
    }

    fn load_database_config() -> DaemonResult<DatabaseConfig> {
        let url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());
        let max_connections = Self::load_parsed_env("STOCKROOM_DB_MAX_CONNECTIONS", 10u32)?;
        let acquire_timeout_secs = Self::load_parsed_env("STOCKROOM_DB_ACQUIRE_TIMEOUT_SECS", 5u64)?;

        if max_connections == 0 {
            return Err(DaemonError::Config(
                "STOCKROOM_DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        Ok(DatabaseConfig {
            url,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
        })
    }

    fn load_parsed_env<T: std::str::FromStr>(key: &str, default: T) -> DaemonResult<T> {
        match env::var(key) {
            Ok(val) => val
                .parse::<T>()
                .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val))),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                acquire_timeout: Duration::from_secs(5),
            },
            environment: Environment::Development,
        }
    }
}

impl Environment {
    /// Parse an environment name.
    pub fn parse(value: &str) -> DaemonResult<Self> {
        match value.to_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(DaemonError::Config(format!(
                "Invalid STOCKROOM_ENV: {}. Expected: test, development, production",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
