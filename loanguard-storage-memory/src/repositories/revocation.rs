use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use loanguard_core::{Error, repositories::RevocationStore};

#[derive(Debug, Clone)]
struct RevocationEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl RevocationEntry {
    fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// TTL-keyed denylist held in process memory
///
/// Expired entries are dropped lazily on read; [`purge_expired`] sweeps the
/// rest.
///
/// [`purge_expired`]: MemoryRevocationStore::purge_expired
#[derive(Default)]
pub struct MemoryRevocationStore {
    entries: DashMap<String, RevocationEntry>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining lifetime of a live entry
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Utc::now();
        self.entries
            .get(key)
            .filter(|entry| entry.is_live_at(now))
            .map(|entry| entry.expires_at - now)
    }

    /// Drop every expired entry and return how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live_at(now));
        let purged = before.saturating_sub(self.entries.len());

        if purged > 0 {
            tracing::debug!(purged, "Purged expired revocation entries");
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), Error> {
        // A non-positive TTL would be dead on arrival
        if ttl <= Duration::zero() {
            self.entries.remove(key);
            return Ok(());
        }

        self.entries.insert(
            key.to_string(),
            RevocationEntry {
                value: value.to_string(),
                expires_at: Utc::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let now = Utc::now();
        let live = match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) if entry.is_live_at(now) => Some(entry.value.clone()),
            Some(_) => None,
        };

        if live.is_none() {
            self.entries.remove_if(key, |_, entry| !entry.is_live_at(now));
        }
        Ok(live)
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.entries.remove(key);
        Ok(())
    }
}
