//! Fleet-wide mutual exclusion for scheduled jobs.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::Result;

/// Proof of holding the lock for `job`. Release it with the lock that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken {
    pub job: String,
    pub token: String,
}

#[async_trait]
pub trait JobLock: Send + Sync {
    /// Take the lock for `job` for at most `ttl`. `None` when another holder
    /// has it.
    async fn try_acquire(&self, job: &str, ttl: Duration) -> Result<Option<LockToken>>;

    /// Release a held lock. Releasing an expired or foreign token is a no-op.
    async fn release(&self, token: &LockToken) -> Result<()>;
}

/// Lock scoped to this process, for single-node deployments and tests.
#[derive(Default)]
pub struct LocalJobLock {
    held: Mutex<HashMap<String, (String, Instant)>>,
}

impl LocalJobLock {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobLock for LocalJobLock {
    async fn try_acquire(&self, job: &str, ttl: Duration) -> Result<Option<LockToken>> {
        let mut held = self.held.lock().await;
        let now = Instant::now();
        held.retain(|_, (_, expires)| *expires > now);

        if held.contains_key(job) {
            return Ok(None);
        }

        let token = Uuid::new_v4().to_string();
        held.insert(job.to_string(), (token.clone(), now + ttl));
        Ok(Some(LockToken {
            job: job.to_string(),
            token,
        }))
    }

    async fn release(&self, token: &LockToken) -> Result<()> {
        let mut held = self.held.lock().await;
        if matches!(held.get(&token.job), Some((current, _)) if *current == token.token) {
            held.remove(&token.job);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_acquire_is_refused_until_release() {
        let lock = LocalJobLock::new();
        let first = lock.try_acquire("reconcile", Duration::from_secs(60)).await.unwrap();
        assert!(first.is_some());
        assert!(lock.try_acquire("reconcile", Duration::from_secs(60)).await.unwrap().is_none());

        // other jobs are independent
        assert!(lock.try_acquire("price_refresh", Duration::from_secs(60)).await.unwrap().is_some());

        lock.release(&first.unwrap()).await.unwrap();
        assert!(lock.try_acquire("reconcile", Duration::from_secs(60)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expired_lock_can_be_taken_over() {
        let lock = LocalJobLock::new();
        let stale = lock.try_acquire("reconcile", Duration::from_millis(0)).await.unwrap().unwrap();
        let fresh = lock.try_acquire("reconcile", Duration::from_secs(60)).await.unwrap();
        assert!(fresh.is_some());

        // the previous holder's release must not free the new holder's lock
        lock.release(&stale).await.unwrap();
        assert!(lock.try_acquire("reconcile", Duration::from_secs(60)).await.unwrap().is_none());
    }
}
