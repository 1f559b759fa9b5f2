//! Builder for constructing [`LoanGuard`] instances
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use loanguard::{AuthConfig, LoanGuardBuilder, MemoryRepositoryProvider, TokenConfig};
//!
//! let config = AuthConfig::new(TokenConfig::new("access", "refresh", "verification"));
//! let guard = LoanGuardBuilder::new(Arc::new(MemoryRepositoryProvider::new()))
//!     .with_config(config)
//!     .build()
//!     .unwrap();
//! ```
use std::sync::Arc;

use loanguard_core::{
    repositories::RepositoryProvider,
    services::{Argon2PasswordHasher, Mailer, PasswordHasher},
};

use crate::{AuthConfig, ConfigError, LoanGuard, OutboxMailer};

/// Errors that can occur when building a LoanGuard instance.
#[derive(Debug, thiserror::Error)]
pub enum LoanGuardBuilderError {
    /// No configuration was given and the environment does not hold one
    #[error("Configuration failed: {0}")]
    Configuration(#[from] ConfigError),

    /// The token secrets were rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub struct LoanGuardBuilder<R: RepositoryProvider> {
    repositories: Arc<R>,
    config: Option<AuthConfig>,
    mailer: Option<Box<dyn Mailer>>,
    password_hasher: Option<Box<dyn PasswordHasher>>,
}

impl<R: RepositoryProvider> LoanGuardBuilder<R> {
    pub fn new(repositories: Arc<R>) -> Self {
        Self {
            repositories,
            config: None,
            mailer: None,
            password_hasher: None,
        }
    }

    /// Use this configuration instead of reading the environment
    pub fn with_config(mut self, config: AuthConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_mailer(mut self, mailer: impl Mailer) -> Self {
        self.mailer = Some(Box::new(mailer));
        self
    }

    pub fn with_password_hasher(mut self, hasher: impl PasswordHasher) -> Self {
        self.password_hasher = Some(Box::new(hasher));
        self
    }

    pub fn build(self) -> Result<LoanGuard<R>, LoanGuardBuilderError> {
        let config = match self.config {
            Some(config) => config,
            None => AuthConfig::from_env()?,
        };

        let mailer = self.mailer.unwrap_or_else(|| {
            tracing::warn!("No mailer configured; outbound emails are kept in an in-memory outbox");
            Box::new(OutboxMailer::new())
        });
        let password_hasher = self
            .password_hasher
            .unwrap_or_else(|| Box::new(Argon2PasswordHasher));

        LoanGuard::from_parts(self.repositories, config, mailer, password_hasher)
            .map_err(|e| LoanGuardBuilderError::InvalidConfiguration(e.to_string()))
    }
}
