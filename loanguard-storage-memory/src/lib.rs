//! In-memory storage backend for LoanGuard
//!
//! Concurrent maps stand in for the user directory, the revocation store and
//! the password reset code store. Nothing is persisted; the provider suits a
//! single process, development and tests.
//!
//! ```rust
//! use std::sync::Arc;
//! use loanguard_storage_memory::MemoryRepositoryProvider;
//!
//! let repositories = Arc::new(MemoryRepositoryProvider::new());
//! ```

pub mod repositories;

pub use repositories::{MemoryOtpRepository, MemoryRevocationStore, MemoryUserRepository};

use async_trait::async_trait;
use loanguard_core::{
    Error,
    repositories::{
        OtpRepositoryProvider, RepositoryProvider, RevocationStoreProvider, UserRepositoryProvider,
    },
};

/// Repository provider implementation for in-memory storage
#[derive(Default)]
pub struct MemoryRepositoryProvider {
    user: MemoryUserRepository,
    revocation: MemoryRevocationStore,
    otp: MemoryOtpRepository,
}

impl MemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepositoryProvider for MemoryRepositoryProvider {
    type UserRepo = MemoryUserRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.user
    }
}

impl RevocationStoreProvider for MemoryRepositoryProvider {
    type RevocationRepo = MemoryRevocationStore;

    fn revocation(&self) -> &Self::RevocationRepo {
        &self.revocation
    }
}

impl OtpRepositoryProvider for MemoryRepositoryProvider {
    type OtpRepo = MemoryOtpRepository;

    fn otp(&self) -> &Self::OtpRepo {
        &self.otp
    }
}

#[async_trait]
impl RepositoryProvider for MemoryRepositoryProvider {
    async fn health_check(&self) -> Result<(), Error> {
        self.revocation.purge_expired();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use loanguard_core::repositories::RevocationStore;

    #[tokio::test]
    async fn test_health_check_purges_expired_revocations() {
        let provider = MemoryRepositoryProvider::new();
        provider
            .revocation()
            .put("token", "blacklisted", Duration::milliseconds(10))
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(30)).await;

        provider.health_check().await.unwrap();
        assert!(provider.revocation().is_empty());
    }
}
