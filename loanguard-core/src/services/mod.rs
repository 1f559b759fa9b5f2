//! Service layer for business logic
//!
//! Services are generic over the repository and collaborator traits and hold
//! them behind `Arc`, so one set of stores can back every service.

pub mod mailer;
pub mod otp;
pub mod password;
pub mod session;
pub mod user;

#[cfg(test)]
mod mocks;

pub use mailer::{LinkBuilder, Mailer};
pub use otp::OtpService;
pub use password::{Argon2PasswordHasher, PasswordHasher};
pub use session::{SessionService, VerificationOutcome};
pub use user::UserService;
