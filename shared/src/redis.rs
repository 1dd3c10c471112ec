use std::time::Duration;

use async_trait::async_trait;
use redis::{Client, Script};
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::lock::{JobLock, LockToken};

pub type Redis = Client;

pub fn get_redis_client(redis_url: &str) -> Result<Redis> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Deletes the key only while it still holds the caller's token.
const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

/// `SET NX PX` lock shared by every worker pointed at the same Redis.
pub struct RedisJobLock {
    client: Redis,
    prefix: String,
}

impl RedisJobLock {
    pub fn new(client: Redis) -> Self {
        Self {
            client,
            prefix: "neo-deals:lock:".to_string(),
        }
    }

    fn key(&self, job: &str) -> String {
        format!("{}{}", self.prefix, job)
    }
}

#[async_trait]
impl JobLock for RedisJobLock {
    async fn try_acquire(&self, job: &str, ttl: Duration) -> Result<Option<LockToken>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let token = Uuid::new_v4().to_string();
        let ttl_ms = ttl.as_millis().max(1) as u64;

        let reply: Option<String> = redis::cmd("SET")
            .arg(self.key(job))
            .arg(&token)
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await?;

        debug!(job, acquired = reply.is_some(), "Redis lock attempt");
        Ok(reply.map(|_| LockToken {
            job: job.to_string(),
            token,
        }))
    }

    async fn release(&self, token: &LockToken) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: i64 = Script::new(RELEASE_SCRIPT)
            .key(self.key(&token.job))
            .arg(&token.token)
            .invoke_async(&mut conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_keys_are_namespaced() {
        let client = get_redis_client("redis://127.0.0.1:6379").unwrap();
        let lock = RedisJobLock::new(client);
        assert_eq!(lock.key("reconcile"), "neo-deals:lock:reconcile");
    }
}
