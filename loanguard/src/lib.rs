//! # LoanGuard
//!
//! LoanGuard is the authorization core of a lending backend. It issues and
//! validates signed session credentials, rotates and revokes them, verifies
//! email addresses and runs password resets through short-lived one-time codes.
//!
//! The HTTP layer stays outside: it calls [`LoanGuard::authorize`] on every
//! protected request and the session operations on the auth routes.
//!
//! ## Storage Support
//!
//! Any [`RepositoryProvider`] works. The `memory` feature (on by default)
//! re-exports [`MemoryRepositoryProvider`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use loanguard::{LoanGuard, MemoryRepositoryProvider};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repositories = Arc::new(MemoryRepositoryProvider::new());
//!     let guard = LoanGuard::builder(repositories).build()?;
//!
//!     guard.register("borrower@example.com", "correcthorse9", None).await?;
//!     let tokens = guard.login("borrower@example.com", "correcthorse9").await?;
//!     let claims = guard.authorize(&format!("Bearer {}", tokens.access_token)).await?;
//!     println!("signed in as {}", claims.sub);
//!     Ok(())
//! }
//! ```
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use loanguard_core::{
    deadline::with_timeout,
    error::TokenError,
    repositories::{
        OtpRepositoryAdapter, RevocationStore, RevocationStoreAdapter, UserRepositoryAdapter,
    },
    services::{LinkBuilder, Mailer, PasswordHasher, SessionService, UserService},
    token::AccessClaims,
};

pub mod builder;
pub mod config;
pub mod mailer;

pub use builder::{LoanGuardBuilder, LoanGuardBuilderError};
pub use config::{AuthConfig, ConfigError};
pub use mailer::{EmailKind, OutboundEmail, OutboxMailer};

pub use loanguard_core::{
    Error, Profile, ProfileUpdate, Role, TokenConfig, TokenPair, TokenSigner, User, UserId,
    VerificationOutcome, repositories::RepositoryProvider,
};

#[cfg(feature = "memory")]
pub use loanguard_storage_memory::MemoryRepositoryProvider;

type Sessions<R> = SessionService<
    UserRepositoryAdapter<R>,
    RevocationStoreAdapter<R>,
    OtpRepositoryAdapter<R>,
    Box<dyn Mailer>,
    Box<dyn PasswordHasher>,
>;

/// The main coordinator for LoanGuard
///
/// Every operation runs under the configured operation timeout and fails with
/// [`Error::DeadlineExceeded`] when it elapses.
pub struct LoanGuard<R: RepositoryProvider> {
    repositories: Arc<R>,
    signer: Arc<TokenSigner>,
    session_service: Arc<Sessions<R>>,
    user_service: Arc<UserService<UserRepositoryAdapter<R>>>,
    revocation_store: Arc<RevocationStoreAdapter<R>>,
    operation_timeout: Duration,
}

impl<R: RepositoryProvider> LoanGuard<R> {
    /// Create a new LoanGuard instance with the default mailer and hasher
    ///
    /// Emails land in an [`OutboxMailer`]; passwords are hashed with argon2.
    pub fn new(repositories: Arc<R>, config: AuthConfig) -> Result<Self, LoanGuardBuilderError> {
        Self::builder(repositories).with_config(config).build()
    }

    pub fn builder(repositories: Arc<R>) -> LoanGuardBuilder<R> {
        LoanGuardBuilder::new(repositories)
    }

    pub(crate) fn from_parts(
        repositories: Arc<R>,
        config: AuthConfig,
        mailer: Box<dyn Mailer>,
        password_hasher: Box<dyn PasswordHasher>,
    ) -> Result<Self, Error> {
        let signer = Arc::new(TokenSigner::new(config.tokens)?);
        let user_repo = Arc::new(UserRepositoryAdapter::new(repositories.clone()));
        let revocation_store = Arc::new(RevocationStoreAdapter::new(repositories.clone()));

        let session_service = Arc::new(SessionService::new(
            signer.clone(),
            user_repo.clone(),
            revocation_store.clone(),
            Arc::new(OtpRepositoryAdapter::new(repositories.clone())),
            Arc::new(mailer),
            Arc::new(password_hasher),
            LinkBuilder::new(config.base_url),
        ));

        Ok(Self {
            repositories,
            signer,
            session_service,
            user_service: Arc::new(UserService::new(user_repo)),
            revocation_store,
            operation_timeout: config.operation_timeout,
        })
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    async fn run<T, F>(&self, future: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        with_timeout(self.operation_timeout, future).await
    }

    /// Health check for the storage backend
    pub async fn health_check(&self) -> Result<(), Error> {
        self.run(self.repositories.health_check()).await
    }

    /// Trust a bearer token only if it is a live, unrevoked access token
    ///
    /// Accepts the raw token or an `Authorization` header value with the
    /// `Bearer ` scheme.
    pub async fn authorize(&self, bearer: &str) -> Result<AccessClaims, Error> {
        let token = bearer.strip_prefix("Bearer ").unwrap_or(bearer).trim();

        self.run(async {
            let claims = self.signer.validate_access(token)?;
            if self.revocation_store.get(token).await?.is_some() {
                tracing::debug!(user_id = %claims.sub, "Rejected revoked access token");
                return Err(Error::Token(TokenError::Revoked));
            }
            Ok(claims)
        })
        .await
    }

    /// Register a user and send them a verification email
    ///
    /// The first user ever registered becomes an admin.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
    ) -> Result<User, Error> {
        self.run(self.session_service.register(email, password, name))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, Error> {
        self.run(self.session_service.login(email, password)).await
    }

    pub async fn logout(&self, access_token: &str) -> Result<(), Error> {
        self.run(self.session_service.logout(access_token)).await
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<String, Error> {
        self.run(self.session_service.refresh_token(refresh_token))
            .await
    }

    pub async fn send_verification(&self, user_id: &UserId) -> Result<(), Error> {
        self.run(self.session_service.send_verification(user_id))
            .await
    }

    pub async fn verify_email(&self, token: &str) -> Result<VerificationOutcome, Error> {
        self.run(self.session_service.verify_email(token)).await
    }

    /// Mail a password reset link to the owner of `email`
    pub async fn request_password_reset(&self, email: &str) -> Result<(), Error> {
        self.run(self.session_service.request_password_reset(email))
            .await
            .map(|_| ())
    }

    pub async fn reset_password(&self, code: &str, new_password: &str) -> Result<(), Error> {
        self.run(self.session_service.reset_password(code, new_password))
            .await
    }

    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Error> {
        self.run(self.user_service.get_user(user_id)).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.run(self.user_service.get_user_by_email(email)).await
    }

    pub async fn get_profile(&self, user_id: &UserId) -> Result<Profile, Error> {
        self.run(self.user_service.get_profile(user_id)).await
    }

    pub async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<Profile, Error> {
        self.run(self.user_service.update_profile(user_id, update))
            .await
    }

    /// Grant the admin role
    pub async fn promote(&self, user_id: &UserId) -> Result<User, Error> {
        self.run(self.user_service.promote(user_id)).await
    }

    /// Revoke the admin role
    pub async fn demote(&self, user_id: &UserId) -> Result<User, Error> {
        self.run(self.user_service.demote(user_id)).await
    }
}
