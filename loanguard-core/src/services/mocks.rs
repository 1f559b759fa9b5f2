//! In-memory collaborators shared by the service tests

use crate::{
    Error, Role, User, UserId,
    error::{AuthError, DeliveryError},
    otp::OtpEntry,
    repositories::{OtpRepository, RevocationStore, UserRepository},
    services::{Mailer, PasswordHasher},
    user::{NewUser, UserPatch},
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MockUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        let mut users = self.users.lock().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(Error::Auth(AuthError::UserAlreadyExists));
        }
        let role = if users.is_empty() {
            Role::Admin
        } else {
            Role::User
        };
        let user = user.into_user(role);
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        Ok(self.users.lock().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn update_fields(&self, id: &UserId, patch: UserPatch) -> Result<User, Error> {
        let mut users = self.users.lock().await;
        let user = users
            .get_mut(id)
            .ok_or(Error::Auth(AuthError::UserNotFound))?;
        patch.apply_to(user);
        Ok(user.clone())
    }
}

#[derive(Default)]
pub struct MockRevocationStore {
    entries: Mutex<HashMap<String, (String, DateTime<Utc>)>>,
    pub fail_writes: AtomicBool,
}

impl MockRevocationStore {
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.lock().await;
        entries.get(key).map(|(_, expires_at)| *expires_at - Utc::now())
    }
}

#[async_trait]
impl RevocationStore for MockRevocationStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), Error> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Storage(crate::error::StorageError::Connection(
                "revocation store unavailable".to_string(),
            )));
        }
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (value.to_string(), Utc::now() + ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let entries = self.entries.lock().await;
        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > Utc::now())
            .map(|(value, _)| value.clone()))
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockOtpRepository {
    entries: Mutex<HashMap<String, OtpEntry>>,
}

#[async_trait]
impl OtpRepository for MockOtpRepository {
    async fn save(&self, entry: &OtpEntry) -> Result<(), Error> {
        self.entries
            .lock()
            .await
            .insert(entry.code.clone(), entry.clone());
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<OtpEntry>, Error> {
        Ok(self.entries.lock().await.get(code).cloned())
    }

    async fn delete(&self, code: &str) -> Result<bool, Error> {
        Ok(self.entries.lock().await.remove(code).is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentEmail {
    Verification { to: String, link: String },
    PasswordReset { to: String, link: String },
}

#[derive(Default)]
pub struct MockMailer {
    pub sent: Mutex<Vec<SentEmail>>,
    pub fail: AtomicBool,
}

impl MockMailer {
    pub async fn last_link(&self) -> Option<String> {
        self.sent.lock().await.last().map(|email| match email {
            SentEmail::Verification { link, .. } | SentEmail::PasswordReset { link, .. } => {
                link.clone()
            }
        })
    }

    pub async fn count(&self) -> usize {
        self.sent.lock().await.len()
    }

    fn check(&self) -> Result<(), Error> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::Send("smtp unavailable".to_string()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send_verification_email(&self, to: &str, verification_link: &str) -> Result<(), Error> {
        self.check()?;
        self.sent.lock().await.push(SentEmail::Verification {
            to: to.to_string(),
            link: verification_link.to_string(),
        });
        Ok(())
    }

    async fn send_password_reset_email(&self, to: &str, reset_link: &str) -> Result<(), Error> {
        self.check()?;
        self.sent.lock().await.push(SentEmail::PasswordReset {
            to: to.to_string(),
            link: reset_link.to_string(),
        });
        Ok(())
    }
}

/// Reversible "hash" so tests don't pay for argon2
#[derive(Default)]
pub struct MockHasher;

impl PasswordHasher for MockHasher {
    fn hash(&self, password: &str) -> Result<String, Error> {
        Ok(format!("hashed:{password}"))
    }

    fn verify(&self, password_hash: &str, password: &str) -> Result<bool, Error> {
        Ok(password_hash == format!("hashed:{password}"))
    }
}

/// Extract the value of a query parameter from a link
pub fn query_param(link: &str, name: &str) -> Option<String> {
    let query = link.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
