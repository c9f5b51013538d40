//! Redis-backed distributed `LockService`, using a `SET key token NX PX`
//! lease and a compare-and-delete Lua script on release.

use crate::traits::{LockHandle, LockService};
use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, Script};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

const LOCK_PREFIX: &str = "resource:lock:";
const LEASE_MS: usize = 30_000;
const RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Compare-and-delete: only unlocks if the caller's token still owns the key,
/// so a handle can never release a lease another caller has since acquired.
const RELEASE_SCRIPT: &str = r"
if redis.call('get', KEYS[1]) == ARGV[1] then
    return redis.call('del', KEYS[1])
else
    return 0
end
";

pub struct RedisLockService {
    conn_manager: ConnectionManager,
}

impl RedisLockService {
    /// # Errors
    ///
    /// Returns an error if the client cannot be created or the initial
    /// connection cannot be established.
    pub async fn new() -> Result<Self> {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        Self::with_url(&redis_url).await
    }

    /// # Errors
    ///
    /// Returns an error if the client cannot be created or the initial
    /// connection cannot be established.
    pub async fn with_url(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .with_context(|| format!("failed to create Redis client with URL: {redis_url}"))?;
        let conn_manager = ConnectionManager::new(client)
            .await
            .context("failed to establish Redis connection manager")?;
        Ok(Self { conn_manager })
    }

    async fn try_acquire(&self, key: &str, token: &str) -> Result<bool> {
        let mut conn = self.conn_manager.clone();
        let acquired: bool = redis::cmd("SET")
            .arg(lock_key(key))
            .arg(token)
            .arg("NX")
            .arg("PX")
            .arg(LEASE_MS)
            .query_async::<Option<String>>(&mut conn)
            .await?
            .is_some();
        Ok(acquired)
    }
}

fn lock_key(key: &str) -> String {
    format!("{LOCK_PREFIX}{key}")
}

/// Holds a lease token; releases it with a detached, fire-and-forget task on
/// drop, since `Drop` cannot run the async release call inline.
struct RedisLockHandle {
    conn_manager: ConnectionManager,
    key: String,
    token: String,
}

impl LockHandle for RedisLockHandle {}

impl Drop for RedisLockHandle {
    fn drop(&mut self) {
        let mut conn = self.conn_manager.clone();
        let key = lock_key(&self.key);
        let token = self.token.clone();
        tokio::spawn(async move {
            let script = Script::new(RELEASE_SCRIPT);
            if let Err(err) = script.key(key).arg(token).invoke_async::<i64>(&mut conn).await {
                warn!(error = %err, "failed to release redis lock lease");
            }
        });
    }
}

#[async_trait]
impl LockService for RedisLockService {
    async fn lock(&self, key: &str) -> Result<Box<dyn LockHandle>> {
        let token = Uuid::new_v4().to_string();
        loop {
            if self.try_acquire(key, &token).await? {
                debug!(key, "acquired redis lock");
                return Ok(Box::new(RedisLockHandle {
                    conn_manager: self.conn_manager.clone(),
                    key: key.to_string(),
                    token,
                }));
            }
            tokio::time::sleep(RETRY_INTERVAL).await;
        }
    }

    async fn try_lock(&self, key: &str) -> Result<Option<Box<dyn LockHandle>>> {
        let token = Uuid::new_v4().to_string();
        if self.try_acquire(key, &token).await? {
            Ok(Some(Box::new(RedisLockHandle {
                conn_manager: self.conn_manager.clone(),
                key: key.to_string(),
                token,
            })))
        } else {
            Ok(None)
        }
    }
}
