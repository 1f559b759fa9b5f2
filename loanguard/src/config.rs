//! Configuration for a [`LoanGuard`](crate::LoanGuard) instance
//!
//! Build one programmatically or load it from the environment:
//!
//! | Variable                           | Required | Default                 |
//! | ---------------------------------- | -------- | ----------------------- |
//! | `ACCESS_SECRET_KEY`                | yes      |                         |
//! | `REFRESH_SECRET_KEY`               | yes      |                         |
//! | `VERIFICATION_SECRET_KEY`          | yes      |                         |
//! | `LOANGUARD_BASE_URL`               | no       | `http://localhost:8080` |
//! | `LOANGUARD_ISSUER`                 | no       | none                    |
//! | `LOANGUARD_OPERATION_TIMEOUT_SECS` | no       | `10`                    |
use std::time::Duration;

use loanguard_core::{TokenConfig, error::ValidationError};

pub const ACCESS_SECRET_KEY: &str = "ACCESS_SECRET_KEY";
pub const REFRESH_SECRET_KEY: &str = "REFRESH_SECRET_KEY";
pub const VERIFICATION_SECRET_KEY: &str = "VERIFICATION_SECRET_KEY";
pub const BASE_URL: &str = "LOANGUARD_BASE_URL";
pub const ISSUER: &str = "LOANGUARD_ISSUER";
pub const OPERATION_TIMEOUT_SECS: &str = "LOANGUARD_OPERATION_TIMEOUT_SECS";

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("Invalid token configuration: {0}")]
    Tokens(#[from] ValidationError),
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secrets, lifetimes and issuer of the token classes
    pub tokens: TokenConfig,
    /// Prefix of the links sent in verification and password reset emails
    pub base_url: String,
    /// Upper bound on every facade operation
    pub operation_timeout: Duration,
}

impl AuthConfig {
    pub fn new(tokens: TokenConfig) -> Self {
        Self {
            tokens,
            base_url: DEFAULT_BASE_URL.to_string(),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let mut tokens = TokenConfig::new(
            secret(ACCESS_SECRET_KEY)?,
            secret(REFRESH_SECRET_KEY)?,
            secret(VERIFICATION_SECRET_KEY)?,
        );
        if let Some(issuer) = lookup(ISSUER).filter(|value| !value.is_empty()) {
            tokens = tokens.with_issuer(issuer);
        }
        tokens.validate()?;

        let mut config = Self::new(tokens);

        if let Some(base_url) = lookup(BASE_URL).filter(|value| !value.is_empty()) {
            config = config.with_base_url(base_url);
        }

        if let Some(raw) = lookup(OPERATION_TIMEOUT_SECS) {
            let secs: u64 = raw.parse().map_err(|e| ConfigError::Invalid {
                name: OPERATION_TIMEOUT_SECS,
                reason: format!("{e}"),
            })?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    name: OPERATION_TIMEOUT_SECS,
                    reason: "must be greater than zero".to_string(),
                });
            }
            config = config.with_operation_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
