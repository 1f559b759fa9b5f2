use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{UserId, crypto::generate_otp_code};

/// A one-time code authorizing a password reset for a single user
///
/// Entries expire by wall-clock comparison only; nothing sweeps them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpEntry {
    pub code: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OtpEntry {
    /// Mint a fresh random code for the user, valid for `ttl`
    pub fn generate(user_id: UserId, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            code: generate_otp_code(),
            user_id,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    /// An entry expiring at exactly `now` is already expired
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
