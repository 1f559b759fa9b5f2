//! Core functionality for LoanGuard
//!
//! This crate contains the authorization core of the LoanGuard lending backend:
//! the signed credential classes, the session lifecycle, password reset codes
//! and the storage contracts they depend on.
//!
//! See [`token::TokenSigner`] for issuing and validating tokens,
//! [`services::SessionService`] for the session lifecycle and
//! [`repositories::RepositoryProvider`] for what a storage backend implements.
//!
pub mod crypto;
pub mod deadline;
pub mod error;
pub mod id;
pub mod otp;
pub mod repositories;
pub mod services;
pub mod token;
pub mod user;
pub mod validation;

pub use error::Error;
pub use otp::OtpEntry;
pub use services::{SessionService, VerificationOutcome};
pub use token::{TokenConfig, TokenPair, TokenSigner};
pub use user::{NewUser, Profile, ProfileUpdate, Role, User, UserId, UserPatch};
