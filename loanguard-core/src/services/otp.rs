use crate::{
    Error, UserId,
    error::{AuthError, OtpError},
    otp::OtpEntry,
    repositories::{OtpRepository, UserRepository},
    services::{LinkBuilder, Mailer, PasswordHasher},
    user::UserPatch,
    validation::validate_password,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Default lifetime of a password reset code
pub const DEFAULT_OTP_TTL_MINUTES: i64 = 10;

/// Service for password reset codes
///
/// Codes are bound to a single user and expire ten minutes after issue by
/// default. Validation does not consume a code; [`redeem`](OtpService::redeem)
/// claims it before touching the password, so a code resets a password once.
pub struct OtpService<U, O, M, H>
where
    U: UserRepository,
    O: OtpRepository,
    M: Mailer,
    H: PasswordHasher,
{
    user_repository: Arc<U>,
    otp_repository: Arc<O>,
    mailer: Arc<M>,
    hasher: Arc<H>,
    links: LinkBuilder,
    ttl: Duration,
}

impl<U, O, M, H> OtpService<U, O, M, H>
where
    U: UserRepository,
    O: OtpRepository,
    M: Mailer,
    H: PasswordHasher,
{
    pub fn new(
        user_repository: Arc<U>,
        otp_repository: Arc<O>,
        mailer: Arc<M>,
        hasher: Arc<H>,
        links: LinkBuilder,
    ) -> Self {
        Self {
            user_repository,
            otp_repository,
            mailer,
            hasher,
            links,
            ttl: Duration::minutes(DEFAULT_OTP_TTL_MINUTES),
        }
    }

    /// Mint a code for the user owning `email` and mail them a reset link
    ///
    /// The code is persisted before delivery. If delivery fails the error is
    /// returned and the stored code simply expires unused.
    pub async fn generate(&self, email: &str) -> Result<OtpEntry, Error> {
        let user = self
            .user_repository
            .find_by_email(email)
            .await?
            .ok_or(Error::Auth(AuthError::UserNotFound))?;

        let entry = OtpEntry::generate(user.id.clone(), self.ttl);
        self.otp_repository.save(&entry).await?;

        let link = self.links.password_reset_link(&entry.code);
        if let Err(e) = self.mailer.send_password_reset_email(&user.email, &link).await {
            tracing::error!(user_id = %user.id, error = %e, "Failed to send password reset email");
            return Err(e);
        }

        tracing::info!(user_id = %user.id, expires_at = %entry.expires_at, "Password reset code issued");
        Ok(entry)
    }

    /// Look up a code and check that it is still live
    pub async fn validate(&self, code: &str) -> Result<OtpEntry, Error> {
        self.validate_at(code, Utc::now()).await
    }

    pub(crate) async fn validate_at(&self, code: &str, now: DateTime<Utc>) -> Result<OtpEntry, Error> {
        let entry = self
            .otp_repository
            .find_by_code(code)
            .await?
            .ok_or(Error::Otp(OtpError::InvalidCode))?;

        if entry.is_expired_at(now) {
            return Err(Error::Otp(OtpError::Expired));
        }

        Ok(entry)
    }

    /// Hash and store a new password for the user
    pub async fn complete_password_reset(
        &self,
        user_id: &UserId,
        new_password: &str,
    ) -> Result<(), Error> {
        validate_password(new_password)?;

        let password_hash = self.hasher.hash(new_password)?;
        self.user_repository
            .update_fields(user_id, UserPatch::new().password_hash(password_hash))
            .await?;

        tracing::info!(user_id = %user_id, "Password reset completed");
        Ok(())
    }

    /// Delete a code so it cannot be used again
    ///
    /// Returns whether this call was the one that removed it.
    pub async fn consume(&self, code: &str) -> Result<bool, Error> {
        self.otp_repository.delete(code).await
    }

    /// Validate a live code and take it out of the store
    ///
    /// Of several callers racing on the same code only one gets the entry;
    /// the rest see `InvalidCode`.
    pub async fn claim(&self, code: &str) -> Result<OtpEntry, Error> {
        let entry = self.validate(code).await?;
        if !self.consume(code).await? {
            return Err(Error::Otp(OtpError::InvalidCode));
        }
        Ok(entry)
    }

    /// Reset a password with a code, using the code up
    ///
    /// A password that fails the policy leaves the code untouched. If storing
    /// the new password fails the claimed code is put back.
    pub async fn redeem(&self, code: &str, new_password: &str) -> Result<UserId, Error> {
        validate_password(new_password)?;

        let entry = self.claim(code).await?;
        if let Err(e) = self
            .complete_password_reset(&entry.user_id, new_password)
            .await
        {
            tracing::warn!(user_id = %entry.user_id, error = %e, "Password reset failed; restoring code");
            self.otp_repository.save(&entry).await?;
            return Err(e);
        }

        Ok(entry.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mocks::{
        MockHasher, MockMailer, MockOtpRepository, MockUserRepository, SentEmail, query_param,
    };
    use crate::user::NewUser;
    use std::sync::atomic::Ordering;

    type TestOtpService = OtpService<MockUserRepository, MockOtpRepository, MockMailer, MockHasher>;

    struct Fixture {
        service: TestOtpService,
        users: Arc<MockUserRepository>,
        mailer: Arc<MockMailer>,
        user_id: UserId,
    }

    async fn fixture() -> Fixture {
        let users = Arc::new(MockUserRepository::default());
        let mailer = Arc::new(MockMailer::default());
        let user = users
            .create(
                NewUser::builder()
                    .email("borrower@example.com".to_string())
                    .password_hash(MockHasher.hash("oldpassword1").unwrap())
                    .build()
                    .unwrap(),
            )
            .await
            .unwrap();

        let service = OtpService::new(
            users.clone(),
            Arc::new(MockOtpRepository::default()),
            mailer.clone(),
            Arc::new(MockHasher),
            LinkBuilder::new("http://localhost:8080"),
        );

        Fixture {
            service,
            users,
            mailer,
            user_id: user.id,
        }
    }

    #[tokio::test]
    async fn test_generate_sends_reset_link() {
        let f = fixture().await;

        let entry = f.service.generate("borrower@example.com").await.unwrap();
        assert_eq!(entry.user_id, f.user_id);
        assert_eq!(entry.expires_at - entry.created_at, Duration::minutes(10));

        let sent = f.mailer.sent.lock().await.clone();
        assert_eq!(
            sent,
            vec![SentEmail::PasswordReset {
                to: "borrower@example.com".to_string(),
                link: format!(
                    "http://localhost:8080/users/password-update?otp={}",
                    entry.code
                ),
            }]
        );
    }

    #[tokio::test]
    async fn test_generate_unknown_email() {
        let f = fixture().await;

        let result = f.service.generate("nobody@example.com").await;
        assert!(matches!(result, Err(Error::Auth(AuthError::UserNotFound))));
        assert_eq!(f.mailer.count().await, 0);
    }

    #[tokio::test]
    async fn test_generate_delivery_failure_keeps_code() {
        let f = fixture().await;
        f.mailer.fail.store(true, Ordering::SeqCst);

        let result = f.service.generate("borrower@example.com").await;
        assert!(matches!(result, Err(Error::Delivery(_))));
    }

    #[tokio::test]
    async fn test_validate() {
        let f = fixture().await;
        f.service.generate("borrower@example.com").await.unwrap();
        let code = query_param(&f.mailer.last_link().await.unwrap(), "otp").unwrap();

        let entry = f.service.validate(&code).await.unwrap();
        assert_eq!(entry.user_id, f.user_id);

        // Validation alone does not consume the code
        assert!(f.service.validate(&code).await.is_ok());
    }

    #[tokio::test]
    async fn test_validate_unknown_code() {
        let f = fixture().await;

        let result = f.service.validate("ZZZZZZZZ").await;
        assert!(matches!(result, Err(Error::Otp(OtpError::InvalidCode))));
    }

    #[tokio::test]
    async fn test_validate_at_expiry_boundary() {
        let f = fixture().await;
        let entry = f.service.generate("borrower@example.com").await.unwrap();

        let just_before = entry.expires_at - Duration::milliseconds(1);
        assert!(f.service.validate_at(&entry.code, just_before).await.is_ok());

        let result = f.service.validate_at(&entry.code, entry.expires_at).await;
        assert!(matches!(result, Err(Error::Otp(OtpError::Expired))));
    }

    #[tokio::test]
    async fn test_complete_password_reset() {
        let f = fixture().await;

        f.service
            .complete_password_reset(&f.user_id, "newpassword2")
            .await
            .unwrap();

        let user = f.users.find_by_id(&f.user_id).await.unwrap().unwrap();
        assert!(MockHasher.verify(&user.password_hash, "newpassword2").unwrap());
    }

    #[tokio::test]
    async fn test_complete_password_reset_rejects_weak_password() {
        let f = fixture().await;

        let result = f.service.complete_password_reset(&f.user_id, "short").await;
        assert!(matches!(result, Err(Error::Validation(_))));

        let user = f.users.find_by_id(&f.user_id).await.unwrap().unwrap();
        assert!(MockHasher.verify(&user.password_hash, "oldpassword1").unwrap());
    }

    #[tokio::test]
    async fn test_consume() {
        let f = fixture().await;
        let entry = f.service.generate("borrower@example.com").await.unwrap();

        assert!(f.service.consume(&entry.code).await.unwrap());
        let result = f.service.validate(&entry.code).await;
        assert!(matches!(result, Err(Error::Otp(OtpError::InvalidCode))));
        assert!(!f.service.consume(&entry.code).await.unwrap());
    }

    #[tokio::test]
    async fn test_claim_succeeds_once() {
        let f = fixture().await;
        let entry = f.service.generate("borrower@example.com").await.unwrap();

        let (a, b) = tokio::join!(f.service.claim(&entry.code), f.service.claim(&entry.code));
        let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        assert!(
            [a, b]
                .into_iter()
                .any(|r| matches!(r, Err(Error::Otp(OtpError::InvalidCode))))
        );
    }

    #[tokio::test]
    async fn test_redeem_with_weak_password_keeps_code() {
        let f = fixture().await;
        let entry = f.service.generate("borrower@example.com").await.unwrap();

        let result = f.service.redeem(&entry.code, "weak").await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(f.service.validate(&entry.code).await.is_ok());

        let user_id = f.service.redeem(&entry.code, "newpassword2").await.unwrap();
        assert_eq!(user_id, f.user_id);
        assert!(f.service.validate(&entry.code).await.is_err());
    }
}
