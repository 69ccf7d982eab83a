//! Server configuration loaded from the environment.
//!
//! Required: `DATABASE_URL` and `AUTH_TOKEN_SECRET`. Optional with defaults:
//! `AUTH_TOKEN_TTL_SECONDS` (86 400, i.e. 24 h), `REQUEST_TIMEOUT_SECONDS`
//! (30), and `BIND_ADDR` (`0.0.0.0:8080`). Missing or malformed values abort
//! startup.

use std::env;
use std::net::SocketAddr;

use chrono::Duration;
use zeroize::Zeroizing;

use backend::outbound::persistence::DbPool;

const DATABASE_URL: &str = "DATABASE_URL";
const AUTH_TOKEN_SECRET: &str = "AUTH_TOKEN_SECRET";
const AUTH_TOKEN_TTL_SECONDS: &str = "AUTH_TOKEN_TTL_SECONDS";
const REQUEST_TIMEOUT_SECONDS: &str = "REQUEST_TIMEOUT_SECONDS";
const BIND_ADDR: &str = "BIND_ADDR";

const DEFAULT_TOKEN_TTL_SECONDS: i64 = 86_400;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Failures while reading the process configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A mandatory variable is absent.
    #[error("missing required environment variable {name}")]
    Missing {
        /// Variable name.
        name: &'static str,
    },
    /// A variable is present but unusable.
    #[error("invalid value for environment variable {name}: {message}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing { name })
}

/// Process settings resolved from the environment at bootstrap.
pub struct AppSettings {
    pub(crate) database_url: Zeroizing<String>,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) token_secret: Zeroizing<String>,
    pub(crate) token_ttl: Duration,
    pub(crate) request_timeout: std::time::Duration,
}

impl AppSettings {
    /// Read and validate the settings from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = Zeroizing::new(required(DATABASE_URL)?);
        let token_secret = Zeroizing::new(required(AUTH_TOKEN_SECRET)?);
        if token_secret.trim().is_empty() {
            return Err(ConfigError::Invalid {
                name: AUTH_TOKEN_SECRET,
                message: "secret must not be empty".into(),
            });
        }

        let ttl_seconds = match env::var(AUTH_TOKEN_TTL_SECONDS) {
            Ok(raw) => raw.parse::<i64>().map_err(|err| ConfigError::Invalid {
                name: AUTH_TOKEN_TTL_SECONDS,
                message: err.to_string(),
            })?,
            Err(_) => DEFAULT_TOKEN_TTL_SECONDS,
        };
        if ttl_seconds <= 0 {
            return Err(ConfigError::Invalid {
                name: AUTH_TOKEN_TTL_SECONDS,
                message: "ttl must be positive".into(),
            });
        }

        let timeout_seconds = match env::var(REQUEST_TIMEOUT_SECONDS) {
            Ok(raw) => raw.parse::<u64>().map_err(|err| ConfigError::Invalid {
                name: REQUEST_TIMEOUT_SECONDS,
                message: err.to_string(),
            })?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECONDS,
        };
        if timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                name: REQUEST_TIMEOUT_SECONDS,
                message: "timeout must be positive".into(),
            });
        }

        let bind_addr = env::var(BIND_ADDR)
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned())
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::Invalid {
                name: BIND_ADDR,
                message: err.to_string(),
            })?;

        Ok(Self {
            database_url,
            bind_addr,
            token_secret,
            token_ttl: Duration::seconds(ttl_seconds),
            request_timeout: std::time::Duration::from_secs(timeout_seconds),
        })
    }

    /// Database connection string.
    pub(crate) fn database_url(&self) -> &str {
        self.database_url.as_str()
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) token_secret: Zeroizing<String>,
    pub(crate) token_ttl: Duration,
    pub(crate) request_timeout: std::time::Duration,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration from resolved settings.
    #[must_use]
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            bind_addr: settings.bind_addr,
            token_secret: settings.token_secret.clone(),
            token_ttl: settings.token_ttl,
            request_timeout: settings.request_timeout,
            db_pool: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without a pool the server falls back to fixture adapters, which is
    /// only useful for smoke-testing the HTTP surface.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
