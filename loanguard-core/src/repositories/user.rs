use crate::{Error, User, UserId, user::{NewUser, UserPatch}};
use async_trait::async_trait;

/// Repository for user data access
///
/// This is the user directory contract: the authorization core never deletes
/// users and never overwrites a whole record.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Insert a new user
    ///
    /// The first user ever created is assigned [`Role::Admin`](crate::Role::Admin),
    /// every later one [`Role::User`](crate::Role::User). Implementations must make
    /// that decision atomically with the insert. Fails with
    /// `AuthError::UserAlreadyExists` when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, Error>;

    /// Find a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    /// Apply a partial update and return the updated user
    ///
    /// Fails with `AuthError::UserNotFound` when no such user exists.
    async fn update_fields(&self, id: &UserId, patch: UserPatch) -> Result<User, Error>;
}
