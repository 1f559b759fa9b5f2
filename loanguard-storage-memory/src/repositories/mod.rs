//! Repository implementations for in-memory storage

pub mod otp;
pub mod revocation;
pub mod user;

pub use otp::MemoryOtpRepository;
pub use revocation::MemoryRevocationStore;
pub use user::MemoryUserRepository;
