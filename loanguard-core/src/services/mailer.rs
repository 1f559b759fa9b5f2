use crate::Error;
use async_trait::async_trait;
use std::sync::Arc;

/// Outbound email delivery
///
/// Implementations only deliver; the links are built by the caller.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send_verification_email(
        &self,
        to: &str,
        verification_link: &str,
    ) -> Result<(), Error>;

    async fn send_password_reset_email(&self, to: &str, reset_link: &str) -> Result<(), Error>;
}

#[async_trait]
impl Mailer for Box<dyn Mailer> {
    async fn send_verification_email(
        &self,
        to: &str,
        verification_link: &str,
    ) -> Result<(), Error> {
        (**self).send_verification_email(to, verification_link).await
    }

    async fn send_password_reset_email(&self, to: &str, reset_link: &str) -> Result<(), Error> {
        (**self).send_password_reset_email(to, reset_link).await
    }
}

#[async_trait]
impl<M: Mailer> Mailer for Arc<M> {
    async fn send_verification_email(
        &self,
        to: &str,
        verification_link: &str,
    ) -> Result<(), Error> {
        (**self).send_verification_email(to, verification_link).await
    }

    async fn send_password_reset_email(&self, to: &str, reset_link: &str) -> Result<(), Error> {
        (**self).send_password_reset_email(to, reset_link).await
    }
}

/// Builds the user-facing links embedded in outbound emails
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base_url: String,
}

impl LinkBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/users/verify-email?token={token}`
    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/users/verify-email?token={token}", self.base_url)
    }

    /// `{base}/users/password-update?otp={code}`
    pub fn password_reset_link(&self, code: &str) -> String {
        format!("{}/users/password-update?otp={code}", self.base_url)
    }
}

impl Default for LinkBuilder {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
