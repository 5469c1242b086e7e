use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::error::ServiceResult;

/// Records redeemed reset tokens so that each can be used once.
#[async_trait]
pub trait ResetTokenLedger: Send + Sync {
    /// Marks `jti` as used until `expires_at`. Returns false when it was
    /// already used.
    async fn consume(&self, jti: &str, expires_at: DateTime<Utc>) -> ServiceResult<bool>;
}

#[derive(Default)]
pub struct MemoryResetLedger {
    used: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl MemoryResetLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResetTokenLedger for MemoryResetLedger {
    async fn consume(&self, jti: &str, expires_at: DateTime<Utc>) -> ServiceResult<bool> {
        let now = Utc::now();
        let mut used = self.used.lock().await;
        used.retain(|_, expiry| *expiry > now);
        if used.contains_key(jti) {
            return Ok(false);
        }
        used.insert(jti.to_string(), expires_at);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn second_consume_fails() {
        let ledger = MemoryResetLedger::new();
        let expires = Utc::now() + Duration::minutes(10);
        assert!(ledger.consume("jti-1", expires).await.unwrap());
        assert!(!ledger.consume("jti-1", expires).await.unwrap());
        assert!(ledger.consume("jti-2", expires).await.unwrap());
    }
}
