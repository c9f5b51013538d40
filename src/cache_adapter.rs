//! Translates between the shared cache's hash/sorted-set protocol and
//! [`ResourceRecord`]s, and maintains the sync queue.
//!
//! The queue-before-write ordering in [`CacheTier::put`] is load-bearing for
//! crash safety: a crash between the two writes leaves a queue entry whose
//! key is not yet cached, which the scheduler treats as an immediate no-op
//! on its next tick (see [`crate::scheduler`]).

use crate::error::ResourceCacheError;
use crate::model::ResourceRecord;
use crate::traits::SharedCache;
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

pub const SYNC_QUEUE: &str = "resource:queue";

const FIELD_BODY: &str = "body";
const FIELD_CREATED_AT: &str = "created_at";
const FIELD_UPDATED_AT: &str = "updated_at";
const FIELD_SYNCED: &str = "synced";
const FIELD_EXISTS: &str = "exists";

/// Adapter over a [`SharedCache`] exposing `Result`-shaped operations instead
/// of raw hash fields.
pub struct CacheTier<C: SharedCache + ?Sized> {
    cache: Arc<C>,
    cache_expiration_ms: u64,
    sync_delay_ms: u64,
}

impl<C: SharedCache + ?Sized> CacheTier<C> {
    pub fn new(cache: Arc<C>, cache_expiration_ms: u64, sync_delay_ms: u64) -> Self {
        Self {
            cache,
            cache_expiration_ms,
            sync_delay_ms,
        }
    }

    /// Read the cache hash at `key`. Returns `None` if uncached.
    pub async fn get(&self, key: &str, with_body: bool) -> Result<Option<ResourceRecord>> {
        let Some(fields) = self.cache.hash_get_all(key).await? else {
            return Ok(None);
        };
        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(record_from_fields(key, &fields, with_body)?))
    }

    /// Write `record` to the cache hash at `key`, queuing it for sync first
    /// unless it is already synced.
    pub async fn put(&self, key: &str, record: &ResourceRecord, now_ms: i64) -> Result<()> {
        if !record.synced {
            self.cache.zadd(SYNC_QUEUE, key, (now_ms + self.sync_delay_ms as i64) as f64).await?;
        }

        let created_at = record.created_at.map_or(String::new(), |v| v.to_string());
        let updated_at = record.updated_at.map_or(String::new(), |v| v.to_string());
        let body = record.body.as_deref().unwrap_or_default();
        let synced = record.synced.to_string();
        let exists = record.exists.to_string();

        self.cache
            .hash_set(
                key,
                &[
                    (FIELD_BODY, body),
                    (FIELD_CREATED_AT, &created_at),
                    (FIELD_UPDATED_AT, &updated_at),
                    (FIELD_SYNCED, &synced),
                    (FIELD_EXISTS, &exists),
                ],
            )
            .await?;

        if record.synced {
            self.cache.expire(key, Some(self.cache_expiration_ms)).await?;
            self.cache.zrem(SYNC_QUEUE, key).await?;
        } else {
            self.cache.expire(key, None).await?;
        }

        debug!(key, synced = record.synced, "cache write");
        Ok(())
    }

    /// Mark the cache entry at `key` synced, refresh its TTL, and dequeue it.
    /// No-op beyond the TTL/dequeue if the hash is missing (it may have expired already).
    pub async fn mark_synced(&self, key: &str) -> Result<()> {
        if let Some(fields) = self.cache.hash_get_all(key).await? {
            if !fields.is_empty() {
                self.cache.hash_set(key, &[(FIELD_SYNCED, "true")]).await?;
            }
        }
        self.cache.expire(key, Some(self.cache_expiration_ms)).await?;
        self.cache.zrem(SYNC_QUEUE, key).await?;
        Ok(())
    }

    /// Dequeue a key the scheduler picked up but found already reconciled
    /// (missing, or already `synced`). Unlike `mark_synced`, this leaves an
    /// existing TTL lease alone rather than resetting it.
    pub async fn dequeue_already_synced(&self, key: &str) -> Result<()> {
        self.cache.expire_if_unset(key, self.cache_expiration_ms).await?;
        self.cache.zrem(SYNC_QUEUE, key).await?;
        Ok(())
    }

    /// Pull up to `limit` keys due at or before `now_ms` from the sync queue.
    pub async fn due_keys(&self, now_ms: i64, limit: usize) -> Result<Vec<String>> {
        self.cache.zrange_by_score(SYNC_QUEUE, now_ms as f64, limit).await
    }
}

fn record_from_fields(
    key: &str,
    fields: &std::collections::HashMap<String, String>,
    with_body: bool,
) -> Result<ResourceRecord> {
    let get = |name: &'static str| -> Result<&String> {
        fields.get(name).ok_or_else(|| {
            ResourceCacheError::MalformedCacheEntry {
                key: key.to_string(),
                field: name,
            }
            .into()
        })
    };

    let synced = parse_bool(key, FIELD_SYNCED, get(FIELD_SYNCED)?)?;
    let exists = parse_bool(key, FIELD_EXISTS, get(FIELD_EXISTS)?)?;
    let created_at = parse_opt_i64(get(FIELD_CREATED_AT)?);
    let updated_at = parse_opt_i64(get(FIELD_UPDATED_AT)?);
    let body = if with_body {
        Some(get(FIELD_BODY)?.clone())
    } else {
        None
    };

    Ok(ResourceRecord {
        body,
        created_at,
        updated_at,
        synced,
        exists,
    })
}

fn parse_bool(key: &str, field: &'static str, raw: &str) -> Result<bool> {
    raw.parse().map_err(|_| {
        ResourceCacheError::MalformedCacheEntry {
            key: key.to_string(),
            field,
        }
        .into()
    })
}

fn parse_opt_i64(raw: &str) -> Option<i64> {
    if raw.is_empty() {
        None
    } else {
        raw.parse().ok()
    }
}
