#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use loanguard::{
    AuthConfig, EmailKind, Error, LoanGuard, MemoryRepositoryProvider, OutboundEmail,
    OutboxMailer, TokenConfig,
};
use loanguard_core::services::Mailer;

pub const TEST_ACCESS_SECRET: &[u8] = b"test_access_secret_not_for_production_use";
pub const TEST_REFRESH_SECRET: &[u8] = b"test_refresh_secret_not_for_production_use";
pub const TEST_VERIFICATION_SECRET: &[u8] = b"test_verification_secret_not_for_production";

pub const PASSWORD: &str = "correcthorse9";

pub fn token_config() -> TokenConfig {
    TokenConfig::new(
        TEST_ACCESS_SECRET.to_vec(),
        TEST_REFRESH_SECRET.to_vec(),
        TEST_VERIFICATION_SECRET.to_vec(),
    )
}

pub struct Harness {
    pub guard: LoanGuard<MemoryRepositoryProvider>,
    pub repositories: Arc<MemoryRepositoryProvider>,
    pub outbox: Arc<OutboxMailer>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_tokens(token_config())
    }

    pub fn with_tokens(tokens: TokenConfig) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let repositories = Arc::new(MemoryRepositoryProvider::new());
        let outbox = Arc::new(OutboxMailer::new());
        let guard = LoanGuard::builder(repositories.clone())
            .with_config(AuthConfig::new(tokens).with_base_url("https://loans.example.com"))
            .with_mailer(outbox.clone())
            .build()
            .unwrap();

        Self {
            guard,
            repositories,
            outbox,
        }
    }

    pub async fn last_email(&self, to: &str) -> OutboundEmail {
        self.outbox.last_to(to).await.expect("no email sent")
    }

    /// Token from the latest verification email sent to `to`
    pub async fn verification_token(&self, to: &str) -> String {
        let email = self.last_email(to).await;
        assert_eq!(email.kind, EmailKind::Verification);
        email.query_param("token").unwrap().to_string()
    }

    /// Code from the latest password reset email sent to `to`
    pub async fn reset_code(&self, to: &str) -> String {
        let email = self.last_email(to).await;
        assert_eq!(email.kind, EmailKind::PasswordReset);
        email.query_param("otp").unwrap().to_string()
    }
}

/// Mailer that stalls before delivering
pub struct SlowMailer {
    pub delay: Duration,
}

#[async_trait]
impl Mailer for SlowMailer {
    async fn send_verification_email(
        &self,
        _to: &str,
        _verification_link: &str,
    ) -> Result<(), Error> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    async fn send_password_reset_email(&self, _to: &str, _reset_link: &str) -> Result<(), Error> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}
