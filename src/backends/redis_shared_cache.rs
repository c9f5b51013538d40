//! Redis-backed `SharedCache`.
//!
//! Hashes store a resource's five fields; a single sorted set (`resource:queue`)
//! holds keys pending background sync, scored by due-at epoch milliseconds.

use crate::traits::SharedCache;
use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::collections::HashMap;
use tracing::{debug, info};

pub struct RedisSharedCache {
    conn_manager: ConnectionManager,
}

impl RedisSharedCache {
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
        info!(redis_url = %redis_url, "connecting shared cache to Redis");

        let client = Client::open(redis_url)
            .with_context(|| format!("failed to create Redis client with URL: {redis_url}"))?;
        let conn_manager = ConnectionManager::new(client)
            .await
            .context("failed to establish Redis connection manager")?;

        Ok(Self { conn_manager })
    }
}

#[async_trait]
impl SharedCache for RedisSharedCache {
    async fn hash_get_all(&self, key: &str) -> Result<Option<HashMap<String, String>>> {
        let mut conn = self.conn_manager.clone();
        let fields: HashMap<String, String> = conn.hgetall(key).await?;
        if fields.is_empty() {
            Ok(None)
        } else {
            Ok(Some(fields))
        }
    }

    async fn hash_set(&self, key: &str, fields: &[(&str, &str)]) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let _: () = conn.hset_multiple(key, fields).await?;
        debug!(key, "[Redis] hash_set");
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_ms: Option<u64>) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        match ttl_ms {
            Some(ms) => {
                let _: () = conn.pexpire(key, i64::try_from(ms).unwrap_or(i64::MAX)).await?;
            }
            None => {
                let _: () = conn.persist(key).await?;
            }
        }
        Ok(())
    }

    async fn expire_if_unset(&self, key: &str, ttl_ms: u64) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let ms = i64::try_from(ttl_ms).unwrap_or(i64::MAX);
        let _: () = redis::cmd("PEXPIRE").arg(key).arg(ms).arg("NX").query_async(&mut conn).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn zadd(&self, set: &str, member: &str, score: f64) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let _: () = conn.zadd(set, member, score).await?;
        Ok(())
    }

    async fn zrem(&self, set: &str, member: &str) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let _: () = conn.zrem(set, member).await?;
        Ok(())
    }

    async fn zrange_by_score(&self, set: &str, max_score: f64, limit: usize) -> Result<Vec<String>> {
        let mut conn = self.conn_manager.clone();
        let members: Vec<String> = conn
            .zrangebyscore_limit(set, "-inf", max_score, 0, i64::try_from(limit).unwrap_or(i64::MAX))
            .await?;
        Ok(members)
    }
}
