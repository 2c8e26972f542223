//! Environment-driven server configuration.

use std::env;
use std::fs;

use chrono::Duration;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors raised while assembling the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is absent.
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// A variable is present but unusable.
    #[error("invalid value for {name}: {message}")]
    InvalidVar {
        /// Variable name.
        name: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// The secret file named by `JWT_SECRET_FILE` could not be read.
    #[error("failed to read secret file {path}: {message}")]
    SecretFile {
        /// Path that was attempted.
        path: String,
        /// Underlying failure description.
        message: String,
    },
}

/// Runtime configuration resolved from the environment.
///
/// `JWT_SECRET` may alternatively be supplied via `JWT_SECRET_FILE`, which
/// suits secret mounts; the direct variable wins when both are set.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds, `host:port`.
    pub bind_addr: String,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// HS256 signing secret for access tokens.
    pub jwt_secret: String,
    /// Access-token lifetime.
    pub jwt_ttl: Duration,
    /// Maximum database connections in the pool.
    pub pool_size: u32,
}

impl ServerConfig {
    /// Resolve configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `DATABASE_URL` is absent, no signing
    /// secret is available, or a numeric variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let database_url =
            lookup("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?;
        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                let path =
                    lookup("JWT_SECRET_FILE").ok_or(ConfigError::MissingVar("JWT_SECRET"))?;
                fs::read_to_string(&path)
                    .map(|contents| contents.trim().to_owned())
                    .map_err(|err| ConfigError::SecretFile {
                        path,
                        message: err.to_string(),
                    })?
            }
        };
        if jwt_secret.is_empty() {
            return Err(ConfigError::InvalidVar {
                name: "JWT_SECRET",
                message: "must not be empty".to_owned(),
            });
        }
        let jwt_ttl = match lookup("JWT_TTL_SECS") {
            None => Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            Some(raw) => {
                let secs: i64 = raw.parse().map_err(|_| ConfigError::InvalidVar {
                    name: "JWT_TTL_SECS",
                    message: format!("expected a positive integer, got {raw:?}"),
                })?;
                if secs <= 0 {
                    return Err(ConfigError::InvalidVar {
                        name: "JWT_TTL_SECS",
                        message: "must be positive".to_owned(),
                    });
                }
                Duration::seconds(secs)
            }
        };
        let pool_size = match lookup("DATABASE_POOL_SIZE") {
            None => DEFAULT_POOL_SIZE,
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidVar {
                name: "DATABASE_POOL_SIZE",
                message: format!("expected a positive integer, got {raw:?}"),
            })?,
        };
        Ok(Self {
            bind_addr,
            database_url,
            jwt_secret,
            jwt_ttl,
            pool_size,
        })
    }
}
