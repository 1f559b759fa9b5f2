//! Repository traits for data access layer
//!
//! This module defines the repository interfaces that services use to interact with storage.
//!
//! # Trait Hierarchy
//!
//! - Individual repository traits ([`UserRepository`], [`RevocationStore`],
//!   [`OtpRepository`]) define the operations for each data domain
//! - Individual `*Provider` traits provide access to each repository type
//! - [`RepositoryProvider`] is a supertrait combining all provider traits plus a health check
//!
//! Services hold repositories behind `Arc`. The adapters in [`adapter`] turn a
//! shared provider into individual repositories so one backend can feed every
//! service.

pub mod adapter;
pub mod otp;
pub mod revocation;
pub mod user;

pub use adapter::{OtpRepositoryAdapter, RevocationStoreAdapter, UserRepositoryAdapter};
pub use otp::OtpRepository;
pub use revocation::{REVOKED_SENTINEL, RevocationStore};
pub use user::UserRepository;

use async_trait::async_trait;

use crate::Error;

/// Provider trait for user directory access.
pub trait UserRepositoryProvider: Send + Sync + 'static {
    /// The user repository implementation type
    type UserRepo: UserRepository;

    /// Get the user repository
    fn user(&self) -> &Self::UserRepo;
}

/// Provider trait for revocation store access.
pub trait RevocationStoreProvider: Send + Sync + 'static {
    /// The revocation store implementation type
    type RevocationRepo: RevocationStore;

    /// Get the revocation store
    fn revocation(&self) -> &Self::RevocationRepo;
}

/// Provider trait for one-time code storage access.
pub trait OtpRepositoryProvider: Send + Sync + 'static {
    /// The OTP repository implementation type
    type OtpRepo: OtpRepository;

    /// Get the OTP repository
    fn otp(&self) -> &Self::OtpRepo;
}

/// Provider trait that storage implementations must implement to provide all repositories.
///
/// # Implementing a Custom Storage Backend
///
/// ```rust,ignore
/// use loanguard_core::repositories::*;
///
/// struct MyStorage { /* ... */ }
///
/// impl UserRepositoryProvider for MyStorage {
///     type UserRepo = MyUserRepository;
///     fn user(&self) -> &Self::UserRepo { &self.user_repo }
/// }
///
/// // ... implement the other provider traits ...
///
/// #[async_trait]
/// impl RepositoryProvider for MyStorage {
///     async fn health_check(&self) -> Result<(), Error> { /* ... */ }
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider:
    UserRepositoryProvider + RevocationStoreProvider + OtpRepositoryProvider
{
    /// Health check for all repositories
    async fn health_check(&self) -> Result<(), Error>;
}
