use crate::{Error, otp::OtpEntry};
use async_trait::async_trait;

/// Repository for password reset codes
#[async_trait]
pub trait OtpRepository: Send + Sync + 'static {
    /// Persist a freshly generated entry
    async fn save(&self, entry: &OtpEntry) -> Result<(), Error>;

    /// Look up an entry by its code, expired or not
    async fn find_by_code(&self, code: &str) -> Result<Option<OtpEntry>, Error>;

    /// Remove an entry, reporting whether this call removed it
    ///
    /// Exactly one of several concurrent deletes of the same code sees `true`.
    /// Removing a missing code is not an error.
    async fn delete(&self, code: &str) -> Result<bool, Error>;
}
