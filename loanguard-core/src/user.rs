//! Users as seen by the authorization core
//!
//! The user record is owned by the user directory; this core only reads it and
//! mutates the session-related fields through [`UserPatch`]:
//!
//! | Field                | Type             | Description                                              |
//! | -------------------- | ---------------- | -------------------------------------------------------- |
//! | `id`                 | `UserId`         | Opaque, `usr_`-prefixed identifier.                      |
//! | `name`               | `Option<String>` | Display name.                                            |
//! | `phone_number`       | `Option<String>` | Contact number shown on the profile.                     |
//! | `bio`                | `Option<String>` | Free-form profile text.                                  |
//! | `email`              | `String`         | Unique login email.                                      |
//! | `password_hash`      | `String`         | Digest produced by the password hasher.                  |
//! | `role`               | `Role`           | `ADMIN` or `USER`.                                       |
//! | `is_verified`        | `bool`           | Whether the email address has been confirmed.            |
//! | `verification_token` | `Option<String>` | Pending verification token, if one is outstanding.       |
//! | `refresh_token`      | `Option<String>` | The single live refresh token for the user, if any.      |
//! | `created_at`         | `DateTime`       | When the user was created.                               |
//! | `updated_at`         | `DateTime`       | When the user was last updated.                          |
use crate::{
    Error,
    error::utilities::RequiredFieldExt,
    id::{generate_prefixed_id, validate_prefixed_id},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unique, stable identifier for a specific user
/// This value should be treated as opaque
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: &str) -> Self {
        UserId(id.to_string())
    }

    pub fn new_random() -> Self {
        UserId(generate_prefixed_id("usr"))
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this ID has the correct format for a user ID
    pub fn is_valid(&self) -> bool {
        validate_prefixed_id(&self.0, "usr")
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authorization role carried in access and refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    pub name: Option<String>,

    pub email: String,

    #[serde(default)]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub bio: Option<String>,

    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub role: Role,

    pub is_verified: bool,

    #[serde(skip_serializing, default)]
    pub verification_token: Option<String>,

    #[serde(skip_serializing, default)]
    pub refresh_token: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn builder() -> UserBuilder {
        UserBuilder::default()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Default)]
pub struct UserBuilder {
    id: Option<UserId>,
    name: Option<String>,
    email: Option<String>,
    phone_number: Option<String>,
    bio: Option<String>,
    password_hash: Option<String>,
    role: Option<Role>,
    is_verified: bool,
    verification_token: Option<String>,
    refresh_token: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl UserBuilder {
    pub fn id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    pub fn phone_number(mut self, phone_number: Option<String>) -> Self {
        self.phone_number = phone_number;
        self
    }

    pub fn bio(mut self, bio: Option<String>) -> Self {
        self.bio = bio;
        self
    }

    pub fn password_hash(mut self, password_hash: String) -> Self {
        self.password_hash = Some(password_hash);
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn is_verified(mut self, is_verified: bool) -> Self {
        self.is_verified = is_verified;
        self
    }

    pub fn verification_token(mut self, token: Option<String>) -> Self {
        self.verification_token = token;
        self
    }

    pub fn refresh_token(mut self, token: Option<String>) -> Self {
        self.refresh_token = token;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    pub fn build(self) -> Result<User, Error> {
        let now = Utc::now();
        Ok(User {
            id: self.id.unwrap_or_default(),
            name: self.name,
            email: self.email.require_field("Email")?,
            phone_number: self.phone_number,
            bio: self.bio,
            password_hash: self.password_hash.require_field("Password hash")?,
            role: self.role.unwrap_or(Role::User),
            is_verified: self.is_verified,
            verification_token: self.verification_token,
            refresh_token: self.refresh_token,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        })
    }
}

/// A user about to be inserted into the directory
///
/// There is no role here: the directory assigns it on insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
}

impl NewUser {
    pub fn builder() -> NewUserBuilder {
        NewUserBuilder::default()
    }

    /// Materialize the stored record with the role chosen by the directory
    pub fn into_user(self, role: Role) -> User {
        let now = Utc::now();
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            phone_number: None,
            bio: None,
            password_hash: self.password_hash,
            role,
            is_verified: false,
            verification_token: None,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Default)]
pub struct NewUserBuilder {
    id: Option<UserId>,
    email: Option<String>,
    name: Option<String>,
    password_hash: Option<String>,
}

impl NewUserBuilder {
    pub fn id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    pub fn name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn password_hash(mut self, password_hash: String) -> Self {
        self.password_hash = Some(password_hash);
        self
    }

    pub fn build(self) -> Result<NewUser, Error> {
        Ok(NewUser {
            id: self.id.unwrap_or_default(),
            email: self.email.require_field("Email")?,
            name: self.name,
            password_hash: self.password_hash.require_field("Password hash")?,
        })
    }
}

/// The public face of a user: no credentials, no pending tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
}

impl From<&User> for Profile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            phone_number: user.phone_number.clone(),
            bio: user.bio.clone(),
        }
    }
}

/// Self-service profile edit
///
/// Blank values mean "keep what is stored", so a profile field can be
/// changed but not cleared through this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    pub fn bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn into_patch(self) -> UserPatch {
        fn present(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        UserPatch {
            name: present(self.name),
            phone_number: present(self.phone_number),
            bio: present(self.bio),
            ..UserPatch::default()
        }
    }
}

/// Field-level partial update of a user record
///
/// Unset fields are left untouched by the directory. The token fields are
/// doubly optional: `None` leaves the stored value alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub is_verified: Option<bool>,
    pub verification_token: Option<Option<String>>,
    pub refresh_token: Option<Option<String>>,
}

impl UserPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn password_hash(mut self, password_hash: impl Into<String>) -> Self {
        self.password_hash = Some(password_hash.into());
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn verified(mut self, is_verified: bool) -> Self {
        self.is_verified = Some(is_verified);
        self
    }

    pub fn verification_token(mut self, token: Option<String>) -> Self {
        self.verification_token = Some(token);
        self
    }

    pub fn refresh_token(mut self, token: Option<String>) -> Self {
        self.refresh_token = Some(token);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the patch to an in-memory record, bumping `updated_at`
    ///
    /// Storage backends that hold whole records use this to stay consistent
    /// with backends that translate the patch into column updates.
    pub fn apply_to(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = Some(name);
        }
        if let Some(phone_number) = self.phone_number {
            user.phone_number = Some(phone_number);
        }
        if let Some(bio) = self.bio {
            user.bio = Some(bio);
        }
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(is_verified) = self.is_verified {
            user.is_verified = is_verified;
        }
        if let Some(token) = self.verification_token {
            user.verification_token = token;
        }
        if let Some(token) = self.refresh_token {
            user.refresh_token = token;
        }
        user.updated_at = Utc::now();
    }
}
