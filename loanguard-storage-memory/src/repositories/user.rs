use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use loanguard_core::{
    Error, Role, User, UserId,
    error::AuthError,
    repositories::UserRepository,
    user::{NewUser, UserPatch},
};
use std::sync::atomic::{AtomicBool, Ordering};

/// User directory backed by concurrent maps
///
/// Emails are unique. The first successful insert is made an admin; the
/// decision is taken while the email slot is held, so two concurrent first
/// registrations cannot both become admin.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: DashMap<UserId, User>,
    emails: DashMap<String, UserId>,
    admin_assigned: AtomicBool,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(Error::Auth(AuthError::UserAlreadyExists)),
            Entry::Vacant(slot) => {
                let role = if self.admin_assigned.swap(true, Ordering::SeqCst) {
                    Role::User
                } else {
                    Role::Admin
                };

                let user = user.into_user(role);
                self.users.insert(user.id.clone(), user.clone());
                slot.insert(user.id.clone());

                tracing::debug!(user_id = %user.id, role = %role, "Inserted user");
                Ok(user)
            }
        }
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        Ok(self.users.get(id).map(|user| user.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let Some(id) = self.emails.get(email).map(|id| id.value().clone()) else {
            return Ok(None);
        };
        self.find_by_id(&id).await
    }

    async fn update_fields(&self, id: &UserId, patch: UserPatch) -> Result<User, Error> {
        let mut user = self
            .users
            .get_mut(id)
            .ok_or(Error::Auth(AuthError::UserNotFound))?;
        patch.apply_to(user.value_mut());
        Ok(user.value().clone())
    }
}
