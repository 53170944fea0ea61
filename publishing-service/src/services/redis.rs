use crate::config::RedisConfig;
use redis::{aio::ConnectionManager, Client, RedisError, Script};
use std::time::Duration;

/// Deletes the key only while it still holds the presented value, so two
/// deliveries of the same callback cannot both succeed.
const COMPARE_AND_DELETE: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
else
    return 0
end
"#;

const STATE_KEY_PREFIX: &str = "oauth_state";

/// Redis holding pending OAuth state, one key per owner.
#[derive(Clone)]
pub struct RedisService {
    manager: ConnectionManager,
    consume_script: Script,
}

impl RedisService {
    pub async fn new(config: &RedisConfig) -> Result<Self, anyhow::Error> {
        tracing::info!("Connecting to Redis");
        let client = Client::open(config.url.as_str())?;

        // ConnectionManager reconnects on its own after transient failures.
        let manager = client.get_connection_manager().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to get Redis connection manager");
            anyhow::anyhow!("Failed to connect to Redis: {}", e)
        })?;

        tracing::info!("Redis connection manager ready");

        Ok(Self {
            manager,
            consume_script: Script::new(COMPARE_AND_DELETE),
        })
    }

    fn state_key(owner_id: &str) -> String {
        format!("{}:{}", STATE_KEY_PREFIX, owner_id)
    }

    /// Overwrites the owner's pending state; the key expires after `ttl`.
    pub async fn put_state(
        &self,
        owner_id: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), RedisError> {
        let mut conn = self.manager.clone();
        redis::cmd("SET")
            .arg(Self::state_key(owner_id))
            .arg(value)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await
    }

    /// True when `value` was the owner's pending state and has now been removed.
    pub async fn take_state(&self, owner_id: &str, value: &str) -> Result<bool, RedisError> {
        let mut conn = self.manager.clone();
        let deleted: i64 = self
            .consume_script
            .key(Self::state_key(owner_id))
            .arg(value)
            .invoke_async(&mut conn)
            .await?;
        Ok(deleted == 1)
    }

    pub async fn ping(&self) -> Result<(), RedisError> {
        let mut conn = self.manager.clone();
        redis::cmd("PING").query_async::<_, ()>(&mut conn).await
    }
}
