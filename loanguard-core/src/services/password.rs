use crate::{Error, error::AuthError};

/// Password hashing capability
///
/// Hashing is CPU-bound and synchronous.
pub trait PasswordHasher: Send + Sync + 'static {
    fn hash(&self, password: &str) -> Result<String, Error>;

    /// `Ok(false)` on a mismatch, `Err` only when the digest cannot be parsed
    fn verify(&self, password_hash: &str, password: &str) -> Result<bool, Error>;
}

impl PasswordHasher for Box<dyn PasswordHasher> {
    fn hash(&self, password: &str) -> Result<String, Error> {
        (**self).hash(password)
    }

    fn verify(&self, password_hash: &str, password: &str) -> Result<bool, Error> {
        (**self).verify(password_hash, password)
    }
}

/// Argon2 hashing through `password-auth`
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, Error> {
        Ok(password_auth::generate_hash(password))
    }

    fn verify(&self, password_hash: &str, password: &str) -> Result<bool, Error> {
        match password_auth::verify_password(password, password_hash) {
            Ok(()) => Ok(true),
            Err(password_auth::VerifyError::PasswordInvalid) => Ok(false),
            Err(e) => {
                tracing::error!(error = %e, "Stored password hash could not be parsed");
                Err(AuthError::PasswordHash(e.to_string()).into())
            }
        }
    }
}
