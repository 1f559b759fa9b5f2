//! Development mailer
//!
//! [`OutboxMailer`] keeps every outbound email in memory instead of sending
//! it. Links carry live credentials, so only the recipient and the kind of
//! email are logged.
use async_trait::async_trait;
use loanguard_core::{Error, services::Mailer};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    Verification,
    PasswordReset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub kind: EmailKind,
    pub to: String,
    pub link: String,
}

impl OutboundEmail {
    /// Value of a query parameter in the link, e.g. `token` or `otp`
    pub fn query_param(&self, name: &str) -> Option<&str> {
        let (_, query) = self.link.split_once('?')?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}

#[derive(Default)]
pub struct OutboxMailer {
    outbox: Mutex<Vec<OutboundEmail>>,
}

impl OutboxMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every email sent so far, oldest first
    pub async fn messages(&self) -> Vec<OutboundEmail> {
        self.outbox.lock().await.clone()
    }

    /// The most recent email sent to `to`
    pub async fn last_to(&self, to: &str) -> Option<OutboundEmail> {
        let outbox = self.outbox.lock().await;
        outbox.iter().rev().find(|email| email.to == to).cloned()
    }

    async fn push(&self, kind: EmailKind, to: &str, link: &str) {
        tracing::info!(to = %to, kind = ?kind, "Email queued in outbox");
        self.outbox.lock().await.push(OutboundEmail {
            kind,
            to: to.to_string(),
            link: link.to_string(),
        });
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn send_verification_email(
        &self,
        to: &str,
        verification_link: &str,
    ) -> Result<(), Error> {
        self.push(EmailKind::Verification, to, verification_link)
            .await;
        Ok(())
    }

    async fn send_password_reset_email(&self, to: &str, reset_link: &str) -> Result<(), Error> {
        self.push(EmailKind::PasswordReset, to, reset_link).await;
        Ok(())
    }
}
