use std::sync::Arc;
use std::time::Duration;

use redis::{AsyncCommands, Client as RedisClient};

use super::keys::rate_limit_key;

/// Fixed-window request counter per client.
pub struct RateCounter {
    redis: Arc<RedisClient>,
    window: Duration,
}

impl RateCounter {
    pub fn new(redis: Arc<RedisClient>, window: Duration) -> Self {
        Self { redis, window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Counts one request and returns the total for the current window.
    pub async fn hit(&self, client: &str) -> Result<i64, redis::RedisError> {
        let key = rate_limit_key(client);
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let count: i64 = conn.incr(&key, 1).await?;
        if count == 1 {
            let _: () = conn.expire(&key, self.window.as_secs() as i64).await?;
        }
        Ok(count)
    }
}
