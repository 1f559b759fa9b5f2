//! Session lifecycle
//!
//! [`SessionService`] ties the token signer, the user directory, the revocation
//! store and the one-time code service together:
//!
//! - **Sessions** move `Anonymous -> Authenticated -> Revoked`. Login issues an
//!   access/refresh pair and stores the refresh token on the user; refreshing
//!   requires the presented token to match the stored one; logout denylists the
//!   access token for the rest of its lifetime and clears the stored refresh token.
//! - **Verification** moves `Unverified -> VerificationSent -> Verified`.
//!   Redeeming an expired verification token sends a fresh one instead of
//!   failing, and the user stays in `VerificationSent`.
//! - **Password reset** goes through [`OtpService`]; a code is consumed once the
//!   new password is stored.
//!
//! Concurrent mutations of the same user are last-writer-wins.
use crate::{
    Error, User, UserId,
    crypto::constant_time_compare,
    error::{AuthError, TokenError},
    otp::OtpEntry,
    repositories::{OtpRepository, REVOKED_SENTINEL, RevocationStore, UserRepository},
    services::{LinkBuilder, Mailer, OtpService, PasswordHasher},
    token::{TokenPair, TokenSigner, extract_unverified_claims, remaining_lifetime},
    user::{NewUser, UserPatch},
    validation::{validate_email, validate_name, validate_password},
};
use chrono::Duration;
use std::sync::Arc;

/// Result of redeeming a verification token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The email is now verified and the user is signed in
    Verified(TokenPair),

    /// The token had expired; a new verification email went out
    Resent { user_id: UserId },
}

impl VerificationOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationOutcome::Verified(_))
    }

    /// User-facing summary of the outcome
    pub fn message(&self) -> &'static str {
        match self {
            VerificationOutcome::Verified(_) => "email verified",
            VerificationOutcome::Resent { .. } => {
                "verification token expired. A new verification email has been sent"
            }
        }
    }
}

/// Service orchestrating login, logout, refresh, verification and password reset
pub struct SessionService<U, R, O, M, H>
where
    U: UserRepository,
    R: RevocationStore,
    O: OtpRepository,
    M: Mailer,
    H: PasswordHasher,
{
    signer: Arc<TokenSigner>,
    user_repository: Arc<U>,
    revocation_store: Arc<R>,
    otp_service: Arc<OtpService<U, O, M, H>>,
    mailer: Arc<M>,
    hasher: Arc<H>,
    links: LinkBuilder,
}

impl<U, R, O, M, H> SessionService<U, R, O, M, H>
where
    U: UserRepository,
    R: RevocationStore,
    O: OtpRepository,
    M: Mailer,
    H: PasswordHasher,
{
    pub fn new(
        signer: Arc<TokenSigner>,
        user_repository: Arc<U>,
        revocation_store: Arc<R>,
        otp_repository: Arc<O>,
        mailer: Arc<M>,
        hasher: Arc<H>,
        links: LinkBuilder,
    ) -> Self {
        let otp_service = Arc::new(OtpService::new(
            user_repository.clone(),
            otp_repository,
            mailer.clone(),
            hasher.clone(),
            links.clone(),
        ));

        Self {
            signer,
            user_repository,
            revocation_store,
            otp_service,
            mailer,
            hasher,
            links,
        }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    pub fn otp_service(&self) -> &OtpService<U, O, M, H> {
        &self.otp_service
    }

    /// Create an unverified user and send them a verification email
    ///
    /// The directory decides the role: the first user ever registered becomes
    /// an admin.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
    ) -> Result<User, Error> {
        validate_email(email)?;
        validate_password(password)?;
        validate_name(name.as_deref())?;

        if self.user_repository.find_by_email(email).await?.is_some() {
            return Err(Error::Auth(AuthError::UserAlreadyExists));
        }

        let password_hash = self.hasher.hash(password)?;
        let new_user = NewUser::builder()
            .id(UserId::new_random())
            .email(email.to_string())
            .name(name)
            .password_hash(password_hash)
            .build()?;

        let user = self.user_repository.create(new_user).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User registered");

        self.issue_verification(&user).await
    }

    /// Check credentials and start a session
    ///
    /// A successful login replaces any refresh token issued earlier.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, Error> {
        validate_email(email)?;

        let user = self
            .user_repository
            .find_by_email(email)
            .await?
            .ok_or(Error::Auth(AuthError::InvalidCredentials))?;

        if !self.hasher.verify(&user.password_hash, password)? {
            tracing::warn!(user_id = %user.id, "Login rejected: password mismatch");
            return Err(Error::Auth(AuthError::InvalidCredentials));
        }

        let pair = self.issue_session(&user, UserPatch::new()).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(pair)
    }

    /// Denylist the access token for the rest of its lifetime and end the session
    pub async fn logout(&self, access_token: &str) -> Result<(), Error> {
        let claims = self.signer.validate_access(access_token)?;

        let remaining = remaining_lifetime(&claims);
        if remaining <= Duration::zero() {
            return Err(Error::Token(TokenError::Expired));
        }

        if let Err(e) = self
            .revocation_store
            .put(access_token, REVOKED_SENTINEL, remaining)
            .await
        {
            tracing::error!(user_id = %claims.sub, error = %e, "Failed to revoke access token");
            return Err(e);
        }

        self.user_repository
            .update_fields(&claims.sub, UserPatch::new().refresh_token(None))
            .await?;

        tracing::info!(user_id = %claims.sub, "User logged out");
        Ok(())
    }

    /// Exchange a live refresh token for a new access token
    ///
    /// The refresh token itself is not rotated.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<String, Error> {
        let claims = self.signer.validate_refresh(refresh_token)?;

        let user = self
            .user_repository
            .find_by_id(&claims.sub)
            .await?
            .ok_or(Error::Auth(AuthError::UserNotFound))?;

        let matches = user
            .refresh_token
            .as_deref()
            .is_some_and(|stored| {
                constant_time_compare(stored.as_bytes(), refresh_token.as_bytes())
            });
        if !matches {
            tracing::warn!(user_id = %user.id, "Refresh rejected: token superseded or revoked");
            return Err(Error::Token(TokenError::InvalidToken));
        }

        self.signer.issue_access(&user.id, user.role)
    }

    /// Send a fresh verification email to an unverified user
    pub async fn send_verification(&self, user_id: &UserId) -> Result<(), Error> {
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(Error::Auth(AuthError::UserNotFound))?;

        if user.is_verified {
            return Err(Error::Auth(AuthError::AlreadyVerified));
        }

        self.issue_verification(&user).await?;
        Ok(())
    }

    /// Redeem a verification token
    ///
    /// An expired token is recovered from: a new token is stored and mailed and
    /// [`VerificationOutcome::Resent`] is returned. Every other validation
    /// failure is reported as `InvalidToken`.
    pub async fn verify_email(&self, token: &str) -> Result<VerificationOutcome, Error> {
        let user_id = match self.signer.validate_verification(token) {
            Ok(user_id) => user_id,
            Err(Error::Token(TokenError::Expired)) => return self.resend_expired(token).await,
            Err(Error::Token(_)) => return Err(Error::Token(TokenError::InvalidToken)),
            Err(e) => return Err(e),
        };

        let user = self
            .user_repository
            .find_by_id(&user_id)
            .await?
            .ok_or(Error::Token(TokenError::InvalidToken))?;

        if user.is_verified {
            return Err(Error::Auth(AuthError::AlreadyVerified));
        }

        let matches = user
            .verification_token
            .as_deref()
            .is_some_and(|pending| constant_time_compare(pending.as_bytes(), token.as_bytes()));
        if !matches {
            return Err(Error::Token(TokenError::InvalidToken));
        }

        let pair = self
            .issue_session(
                &user,
                UserPatch::new().verified(true).verification_token(None),
            )
            .await?;

        tracing::info!(user_id = %user.id, "Email verified");
        Ok(VerificationOutcome::Verified(pair))
    }

    /// Mail a password reset code to the owner of `email`
    pub async fn request_password_reset(&self, email: &str) -> Result<OtpEntry, Error> {
        self.otp_service.generate(email).await
    }

    /// Set a new password using a reset code
    ///
    /// The code is claimed before the password is written, so concurrent
    /// resets with one code cannot both succeed.
    pub async fn reset_password(&self, code: &str, new_password: &str) -> Result<(), Error> {
        self.otp_service.redeem(code, new_password).await.map(|_| ())
    }

    /// Signature checks run before expiry checks, so only a token we signed
    /// gets here. Its subject is still reloaded from the directory.
    async fn resend_expired(&self, token: &str) -> Result<VerificationOutcome, Error> {
        let claims =
            extract_unverified_claims(token).ok_or(Error::Token(TokenError::InvalidToken))?;

        let user = self
            .user_repository
            .find_by_id(&claims.sub)
            .await?
            .ok_or(Error::Token(TokenError::InvalidToken))?;

        if user.is_verified {
            return Err(Error::Auth(AuthError::AlreadyVerified));
        }

        self.issue_verification(&user).await?;
        tracing::info!(user_id = %user.id, "Verification token expired; sent a new one");

        Ok(VerificationOutcome::Resent { user_id: user.id })
    }

    async fn issue_verification(&self, user: &User) -> Result<User, Error> {
        let token = self.signer.issue_verification(&user.id)?;
        let updated = self
            .user_repository
            .update_fields(
                &user.id,
                UserPatch::new().verification_token(Some(token.clone())),
            )
            .await?;

        let link = self.links.verification_link(&token);
        if let Err(e) = self.mailer.send_verification_email(&user.email, &link).await {
            tracing::error!(user_id = %user.id, error = %e, "Failed to send verification email");
            return Err(e);
        }

        Ok(updated)
    }

    /// Issue an access/refresh pair and store the refresh token along with `patch`
    async fn issue_session(&self, user: &User, patch: UserPatch) -> Result<TokenPair, Error> {
        let access_token = self.signer.issue_access(&user.id, user.role)?;
        let refresh_token = self.signer.issue_refresh(&user.id, user.role)?;

        self.user_repository
            .update_fields(&user.id, patch.refresh_token(Some(refresh_token.clone())))
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
