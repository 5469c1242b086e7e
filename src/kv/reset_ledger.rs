use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::Client as RedisClient;

use super::keys::reset_token_key;
use crate::credentials::ResetTokenLedger;
use crate::error::{ServiceError, ServiceResult};

pub struct RedisResetLedger {
    redis: Arc<RedisClient>,
}

impl RedisResetLedger {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl ResetTokenLedger for RedisResetLedger {
    async fn consume(&self, jti: &str, expires_at: DateTime<Utc>) -> ServiceResult<bool> {
        let mut conn = self
            .redis
            .get_multiplexed_async_connection()
            .await
            .map_err(ServiceError::internal)?;

        // Keep the marker until the token itself expires; at least one second.
        let ttl = (expires_at - Utc::now()).num_seconds().max(1);
        let set: Option<String> = redis::cmd("SET")
            .arg(reset_token_key(jti))
            .arg(Utc::now().timestamp())
            .arg("NX")
            .arg("EX")
            .arg(ttl)
            .query_async(&mut conn)
            .await
            .map_err(ServiceError::internal)?;

        Ok(set.is_some())
    }
}
