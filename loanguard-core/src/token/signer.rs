//! HS256 signer for the three token classes

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use uuid::Uuid;

use crate::{Error, Role, UserId, error::TokenError};

use super::{AccessClaims, RefreshClaims, TokenClaims, TokenClass, TokenConfig, VerificationClaims};

#[derive(Clone)]
struct ClassKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl ClassKeys {
    fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Issues and validates access, refresh and verification tokens
///
/// Keys are derived once at construction. Validation uses zero leeway, so a
/// token is rejected as soon as its `exp` is in the past.
#[derive(Clone)]
pub struct TokenSigner {
    config: TokenConfig,
    access: ClassKeys,
    refresh: ClassKeys,
    verification: ClassKeys,
}

impl TokenSigner {
    /// Create a signer, rejecting configurations with empty or shared secrets
    pub fn new(config: TokenConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            access: ClassKeys::from_secret(&config.access_secret),
            refresh: ClassKeys::from_secret(&config.refresh_secret),
            verification: ClassKeys::from_secret(&config.verification_secret),
            config,
        })
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    pub fn issue_access(&self, subject: &UserId, role: Role) -> Result<String, Error> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: subject.clone(),
            role,
            iat: now.timestamp(),
            exp: (now + self.config.access_ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
            iss: self.config.issuer.clone(),
        };
        self.sign(&claims)
    }

    pub fn issue_refresh(&self, subject: &UserId, role: Role) -> Result<String, Error> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: subject.clone(),
            role,
            iat: now.timestamp(),
            exp: (now + self.config.refresh_ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
            iss: self.config.issuer.clone(),
        };
        self.sign(&claims)
    }

    pub fn issue_verification(&self, subject: &UserId) -> Result<String, Error> {
        let now = Utc::now();
        let claims = VerificationClaims {
            sub: subject.clone(),
            iat: now.timestamp(),
            exp: (now + self.config.verification_ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
            iss: self.config.issuer.clone(),
        };
        self.sign(&claims)
    }

    pub fn validate_access(&self, token: &str) -> Result<AccessClaims, Error> {
        self.verify(token)
    }

    pub fn validate_refresh(&self, token: &str) -> Result<RefreshClaims, Error> {
        self.verify(token)
    }

    /// Validate a verification token and return its subject
    pub fn validate_verification(&self, token: &str) -> Result<UserId, Error> {
        self.verify::<VerificationClaims>(token)
            .map(|claims| claims.sub)
    }

    fn keys(&self, class: TokenClass) -> &ClassKeys {
        match class {
            TokenClass::Access => &self.access,
            TokenClass::Refresh => &self.refresh,
            TokenClass::Verification => &self.verification,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        if let Some(issuer) = &self.config.issuer {
            validation.set_issuer(&[issuer]);
            validation.set_required_spec_claims(&["exp", "iss"]);
        }
        validation
    }

    fn sign<C: TokenClaims>(&self, claims: &C) -> Result<String, Error> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, claims, &self.keys(C::CLASS).encoding).map_err(|e| {
            tracing::error!(class = %C::CLASS, error = %e, "Failed to sign token");
            TokenError::Signing(e.to_string()).into()
        })
    }

    fn verify<C: TokenClaims>(&self, token: &str) -> Result<C, Error> {
        decode::<C>(token, &self.keys(C::CLASS).decoding, &self.validation())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(class = %C::CLASS, error = %e, "Token validation failed");
                classify_decode_error(e).into()
            })
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn classify_decode_error(error: jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        _ => TokenError::Malformed(error.to_string()),
    }
}
