//! Randomness and comparison helpers for credential handling
//!
//! Stored refresh and verification tokens are compared with the presented
//! value in constant time so the comparison does not leak how many leading
//! bytes matched.

use rand::{TryRngCore, rngs::OsRng};
use subtle::ConstantTimeEq;

/// Alphabet for one-time codes: uppercase letters and digits without the
/// easily confused `I`, `O`, `0` and `1`. Exactly 32 symbols, so a byte
/// reduced modulo the length is unbiased.
const OTP_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of generated one-time codes
pub const OTP_CODE_LENGTH: usize = 8;

/// Generate a one-time code of [`OTP_CODE_LENGTH`] characters.
///
/// # Panics
///
/// Panics if the OS random number generator fails. There is no safe fallback
/// for a security-sensitive code.
pub fn generate_otp_code() -> String {
    let mut bytes = [0u8; OTP_CODE_LENGTH];
    OsRng
        .try_fill_bytes(&mut bytes)
        .expect("OS RNG failure - system entropy source unavailable");

    bytes
        .iter()
        .map(|b| OTP_ALPHABET[(*b as usize) % OTP_ALPHABET.len()] as char)
        .collect()
}

/// Perform constant-time comparison of two byte slices.
///
/// Slices of different length compare unequal immediately; the length of a
/// signed token is not secret.
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
