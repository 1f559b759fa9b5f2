use crate::{
    Error, Role, User, UserId,
    error::AuthError,
    repositories::UserRepository,
    user::{Profile, ProfileUpdate, UserPatch},
    validation::validate_name,
};
use std::sync::Arc;

/// Service for user lookup and role management
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new UserService with the given repository
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Error> {
        self.repository.find_by_id(user_id).await
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.repository.find_by_email(email).await
    }

    /// Get a user by ID, failing with `UserNotFound` when absent
    pub async fn require_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.repository
            .find_by_id(user_id)
            .await?
            .ok_or(Error::Auth(AuthError::UserNotFound))
    }

    /// The caller's own profile
    pub async fn get_profile(&self, user_id: &UserId) -> Result<Profile, Error> {
        self.require_user(user_id).await.map(|user| Profile::from(&user))
    }

    /// Change name, phone number or bio; blank values keep the stored ones
    pub async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<Profile, Error> {
        let patch = update.into_patch();
        validate_name(patch.name.as_deref())?;

        if patch.is_empty() {
            return self.get_profile(user_id).await;
        }

        let user = self.repository.update_fields(user_id, patch).await?;
        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(Profile::from(&user))
    }

    /// Grant the admin role
    pub async fn promote(&self, user_id: &UserId) -> Result<User, Error> {
        self.set_role(user_id, Role::Admin).await
    }

    /// Revoke the admin role
    pub async fn demote(&self, user_id: &UserId) -> Result<User, Error> {
        self.set_role(user_id, Role::User).await
    }

    pub async fn set_role(&self, user_id: &UserId, role: Role) -> Result<User, Error> {
        let user = self
            .repository
            .update_fields(user_id, UserPatch::new().role(role))
            .await?;

        tracing::info!(user_id = %user.id, role = %role, "User role changed");
        Ok(user)
    }
}
