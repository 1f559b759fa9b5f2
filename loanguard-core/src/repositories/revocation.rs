use crate::Error;
use async_trait::async_trait;
use chrono::Duration;

/// Value stored against a revoked access token
pub const REVOKED_SENTINEL: &str = "blacklisted";

/// TTL-keyed denylist
///
/// An entry must never be reported by [`get`](RevocationStore::get) once its
/// TTL has elapsed. Failures are returned to the caller, never swallowed.
#[async_trait]
pub trait RevocationStore: Send + Sync + 'static {
    /// Store `value` under `key` for `ttl`, replacing any existing entry
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), Error>;

    /// Get the live value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Remove `key`; removing a missing key is not an error
    async fn delete(&self, key: &str) -> Result<(), Error>;
}
