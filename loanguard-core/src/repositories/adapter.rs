use crate::{
    Error, User, UserId,
    otp::OtpEntry,
    repositories::{OtpRepository, RepositoryProvider, RevocationStore, UserRepository},
    user::{NewUser, UserPatch},
};
use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;

/// Adapter that wraps a RepositoryProvider and implements individual repository traits
pub struct UserRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> UserRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> UserRepository for UserRepositoryAdapter<R> {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        self.provider.user().create(user).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.provider.user().find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.provider.user().find_by_email(email).await
    }

    async fn update_fields(&self, id: &UserId, patch: UserPatch) -> Result<User, Error> {
        self.provider.user().update_fields(id, patch).await
    }
}

pub struct RevocationStoreAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> RevocationStoreAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> RevocationStore for RevocationStoreAdapter<R> {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), Error> {
        self.provider.revocation().put(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        self.provider.revocation().get(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.provider.revocation().delete(key).await
    }
}

pub struct OtpRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> OtpRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> OtpRepository for OtpRepositoryAdapter<R> {
    async fn save(&self, entry: &OtpEntry) -> Result<(), Error> {
        self.provider.otp().save(entry).await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<OtpEntry>, Error> {
        self.provider.otp().find_by_code(code).await
    }

    async fn delete(&self, code: &str) -> Result<bool, Error> {
        self.provider.otp().delete(code).await
    }
}
