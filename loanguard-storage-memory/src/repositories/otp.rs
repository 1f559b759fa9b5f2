use async_trait::async_trait;
use dashmap::DashMap;
use loanguard_core::{Error, otp::OtpEntry, repositories::OtpRepository};

/// Password reset codes keyed by code
///
/// Entries are kept until deleted; expiry is judged by the caller.
#[derive(Default)]
pub struct MemoryOtpRepository {
    entries: DashMap<String, OtpEntry>,
}

impl MemoryOtpRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OtpRepository for MemoryOtpRepository {
    async fn save(&self, entry: &OtpEntry) -> Result<(), Error> {
        self.entries.insert(entry.code.clone(), entry.clone());
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<OtpEntry>, Error> {
        Ok(self.entries.get(code).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, code: &str) -> Result<bool, Error> {
        Ok(self.entries.remove(code).is_some())
    }
}
