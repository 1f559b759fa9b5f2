//! Signed session credentials
//!
//! Three token classes are issued, each signed with HS256 under its own secret
//! and carrying its own lifetime:
//!
//! | Class          | Default lifetime | Claims                              |
//! | -------------- | ---------------- | ----------------------------------- |
//! | `access`       | 15 minutes       | `sub`, `role`, `iat`, `exp`, `jti`  |
//! | `refresh`      | 24 hours         | `sub`, `role`, `iat`, `exp`, `jti`  |
//! | `verification` | 24 hours         | `sub`, `iat`, `exp`, `jti`          |
//!
//! A token signed for one class never validates as another, because the
//! secrets differ. When an issuer is configured every class also carries `iss`.
//!
//! See [`TokenSigner`] for issuing and validating tokens.

pub mod signer;

pub use signer::TokenSigner;

use crate::{Role, UserId, error::ValidationError};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::HashSet;

/// The three credential classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Access,
    Refresh,
    Verification,
}

impl TokenClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenClass::Access => "access",
            TokenClass::Refresh => "refresh",
            TokenClass::Verification => "verification",
        }
    }
}

impl std::fmt::Display for TokenClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behaviour shared by the claim sets of every class
pub trait TokenClaims: Serialize + DeserializeOwned + Send + Sync {
    /// The class these claims belong to
    const CLASS: TokenClass;

    fn subject(&self) -> &UserId;

    /// Absolute expiry as a unix timestamp in seconds
    fn expires_at_timestamp(&self) -> i64;

    fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.expires_at_timestamp(), 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// First instant at which validation rejects the token
    ///
    /// Expiry is compared in whole seconds, so a token is still accepted
    /// throughout the second named by `exp`.
    fn rejected_from(&self) -> DateTime<Utc> {
        self.expires_at() + Duration::seconds(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: UserId,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: UserId,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationClaims {
    pub sub: UserId,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl TokenClaims for AccessClaims {
    const CLASS: TokenClass = TokenClass::Access;

    fn subject(&self) -> &UserId {
        &self.sub
    }

    fn expires_at_timestamp(&self) -> i64 {
        self.exp
    }
}

impl TokenClaims for RefreshClaims {
    const CLASS: TokenClass = TokenClass::Refresh;

    fn subject(&self) -> &UserId {
        &self.sub
    }

    fn expires_at_timestamp(&self) -> i64 {
        self.exp
    }
}

impl TokenClaims for VerificationClaims {
    const CLASS: TokenClass = TokenClass::Verification;

    fn subject(&self) -> &UserId {
        &self.sub
    }

    fn expires_at_timestamp(&self) -> i64 {
        self.exp
    }
}

/// Time left before the token carrying these claims stops validating
///
/// Millisecond precision, measured up to [`TokenClaims::rejected_from`], so
/// a denylist entry kept this long outlives the token. Negative or zero once
/// the token is rejected.
pub fn remaining_lifetime(claims: &impl TokenClaims) -> Duration {
    remaining_lifetime_at(claims, Utc::now())
}

pub(crate) fn remaining_lifetime_at(claims: &impl TokenClaims, now: DateTime<Utc>) -> Duration {
    claims.rejected_from() - now
}

/// Access and refresh tokens handed out together on login and verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Claims read from a token WITHOUT checking its signature or expiry
///
/// Nothing in here is authoritative: anyone can forge a token that yields any
/// subject. The only legitimate use is addressing a fresh verification email
/// to the owner of an expired verification token, where the subject is then
/// reloaded from the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnverifiedClaims {
    pub sub: UserId,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Parse the payload of a token without verifying it
///
/// Returns `None` when the token is not a structurally valid JWT or has no
/// subject. See [`UnverifiedClaims`] for the caveats.
pub fn extract_unverified_claims(token: &str) -> Option<UnverifiedClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims = HashSet::new();

    decode::<UnverifiedClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}

/// Secrets, lifetimes and issuer for the token classes
#[derive(Clone)]
pub struct TokenConfig {
    pub access_secret: Vec<u8>,
    pub refresh_secret: Vec<u8>,
    pub verification_secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub verification_ttl: Duration,
    /// Issuer claim
    pub issuer: Option<String>,
}

impl TokenConfig {
    /// Create a configuration with the default lifetimes
    pub fn new(
        access_secret: impl Into<Vec<u8>>,
        refresh_secret: impl Into<Vec<u8>>,
        verification_secret: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            verification_secret: verification_secret.into(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::hours(24),
            verification_ttl: Duration::hours(24),
            issuer: None,
        }
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    pub fn with_verification_ttl(mut self, ttl: Duration) -> Self {
        self.verification_ttl = ttl;
        self
    }

    /// Set the issuer claim
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn secret(&self, class: TokenClass) -> &[u8] {
        match class {
            TokenClass::Access => &self.access_secret,
            TokenClass::Refresh => &self.refresh_secret,
            TokenClass::Verification => &self.verification_secret,
        }
    }

    pub fn ttl(&self, class: TokenClass) -> Duration {
        match class {
            TokenClass::Access => self.access_ttl,
            TokenClass::Refresh => self.refresh_ttl,
            TokenClass::Verification => self.verification_ttl,
        }
    }

    /// Every class needs its own non-empty secret
    pub fn validate(&self) -> Result<(), ValidationError> {
        let classes = [
            TokenClass::Access,
            TokenClass::Refresh,
            TokenClass::Verification,
        ];

        for class in classes {
            if self.secret(class).is_empty() {
                return Err(ValidationError::MissingField(format!(
                    "{class} token secret is required"
                )));
            }
        }

        for (i, a) in classes.iter().enumerate() {
            for b in &classes[i + 1..] {
                if self.secret(*a) == self.secret(*b) {
                    return Err(ValidationError::InvalidField(format!(
                        "{a} and {b} tokens must use different secrets"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("verification_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("verification_ttl", &self.verification_ttl)
            .field("issuer", &self.issuer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TokenConfig {
        TokenConfig::new("access-secret", "refresh-secret", "verification-secret")
    }

    #[test]
    fn test_default_lifetimes() {
        let config = config();
        assert_eq!(config.ttl(TokenClass::Access), Duration::minutes(15));
        assert_eq!(config.ttl(TokenClass::Refresh), Duration::hours(24));
        assert_eq!(config.ttl(TokenClass::Verification), Duration::hours(24));
    }

    #[test]
    fn test_validate_rejects_shared_secret() {
        let config = TokenConfig::new("same", "same", "verification-secret");
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidField(_))
        ));

        let config = TokenConfig::new("access", "refresh", "access");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_secret() {
        let config = TokenConfig::new("access", "", "verification");
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingField(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("access-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_extract_unverified_claims_rejects_garbage() {
        assert!(extract_unverified_claims("not-a-token").is_none());
        assert!(extract_unverified_claims("a.b.c").is_none());
        assert!(extract_unverified_claims("").is_none());
    }

    fn claims_expiring_at(exp: i64) -> VerificationClaims {
        VerificationClaims {
            sub: UserId::new_random(),
            iat: exp - 90,
            exp,
            jti: "jti".to_string(),
            iss: None,
        }
    }

    #[test]
    fn test_remaining_lifetime_at() {
        let exp = 1_700_000_090;
        let claims = claims_expiring_at(exp);
        let at = |secs: i64, nanos: u32| DateTime::from_timestamp(secs, nanos).unwrap();

        // Sub-second precision is kept on the clock side
        let now = at(exp - 90, 900_000_000);
        assert_eq!(remaining_lifetime_at(&claims, now), Duration::milliseconds(90_100));

        // The whole `exp` second is still covered
        assert_eq!(
            remaining_lifetime_at(&claims, at(exp, 999_000_000)),
            Duration::milliseconds(1)
        );
        assert_eq!(remaining_lifetime_at(&claims, at(exp + 1, 0)), Duration::zero());
        assert!(remaining_lifetime_at(&claims, at(exp + 2, 0)) < Duration::zero());
    }

    #[test]
    fn test_remaining_lifetime_outlasts_validation_window() {
        let exp = 1_700_000_000;
        let claims = claims_expiring_at(exp);

        for millis in [0, 1, 250, 500, 999] {
            let now = DateTime::from_timestamp(exp - 1, millis * 1_000_000).unwrap();
            let denylisted_until = now + remaining_lifetime_at(&claims, now);
            assert!(denylisted_until > claims.expires_at());
            assert_eq!(denylisted_until, claims.rejected_from());
        }
    }
}
