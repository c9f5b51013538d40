//! In-memory `SharedCache` reference backend.
//!
//! A lightweight concurrent implementation using `DashMap`, in the same
//! spirit as a Redis hash + sorted set but entirely process-local. Intended
//! for tests and for documenting the trait's contract; production
//! deployments should use [`super::redis_shared_cache::RedisSharedCache`].

use crate::traits::SharedCache;
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub struct MemorySharedCache {
    hashes: DashMap<String, HashMap<String, String>>,
    expirations: DashMap<String, Instant>,
    sorted_sets: DashMap<String, DashMap<String, f64>>,
}

impl MemorySharedCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            hashes: DashMap::new(),
            expirations: DashMap::new(),
            sorted_sets: DashMap::new(),
        }
    }

    fn is_expired(&self, key: &str) -> bool {
        self.expirations
            .get(key)
            .is_some_and(|deadline| Instant::now() > *deadline)
    }
}

impl Default for MemorySharedCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SharedCache for MemorySharedCache {
    async fn hash_get_all(&self, key: &str) -> Result<Option<HashMap<String, String>>> {
        if self.is_expired(key) {
            self.hashes.remove(key);
            self.expirations.remove(key);
            return Ok(None);
        }
        Ok(self.hashes.get(key).map(|entry| entry.clone()))
    }

    async fn hash_set(&self, key: &str, fields: &[(&str, &str)]) -> Result<()> {
        let mut entry = self.hashes.entry(key.to_string()).or_default();
        for (field, value) in fields {
            entry.insert((*field).to_string(), (*value).to_string());
        }
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_ms: Option<u64>) -> Result<()> {
        match ttl_ms {
            Some(ms) => {
                self.expirations.insert(key.to_string(), Instant::now() + Duration::from_millis(ms));
            }
            None => {
                self.expirations.remove(key);
            }
        }
        Ok(())
    }

    async fn expire_if_unset(&self, key: &str, ttl_ms: u64) -> Result<()> {
        self.expirations.entry(key.to_string()).or_insert_with(|| Instant::now() + Duration::from_millis(ttl_ms));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.hashes.remove(key);
        self.expirations.remove(key);
        Ok(())
    }

    async fn zadd(&self, set: &str, member: &str, score: f64) -> Result<()> {
        self.sorted_sets
            .entry(set.to_string())
            .or_default()
            .insert(member.to_string(), score);
        Ok(())
    }

    async fn zrem(&self, set: &str, member: &str) -> Result<()> {
        if let Some(members) = self.sorted_sets.get(set) {
            members.remove(member);
        }
        Ok(())
    }

    async fn zrange_by_score(&self, set: &str, max_score: f64, limit: usize) -> Result<Vec<String>> {
        let Some(members) = self.sorted_sets.get(set) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<(String, f64)> = members
            .iter()
            .filter(|entry| *entry.value() <= max_score)
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(limit);

        Ok(scored.into_iter().map(|(member, _)| member).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_round_trips() {
        let cache = MemorySharedCache::new();
        cache.hash_set("k", &[("a", "1"), ("b", "2")]).await.unwrap();
        let fields = cache.hash_get_all("k").await.unwrap().unwrap();
        assert_eq!(fields.get("a"), Some(&"1".to_string()));
    }

    #[tokio::test]
    async fn expire_none_clears_ttl() {
        let cache = MemorySharedCache::new();
        cache.hash_set("k", &[("a", "1")]).await.unwrap();
        cache.expire("k", Some(10)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.hash_get_all("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expire_if_unset_leaves_an_existing_ttl_alone() {
        let cache = MemorySharedCache::new();
        cache.hash_set("k", &[("a", "1")]).await.unwrap();
        cache.expire("k", Some(10)).await.unwrap();
        cache.expire_if_unset("k", 10_000).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.hash_get_all("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn zrange_returns_ascending_due_members() {
        let cache = MemorySharedCache::new();
        cache.zadd("q", "a", 100.0).await.unwrap();
        cache.zadd("q", "b", 50.0).await.unwrap();
        cache.zadd("q", "c", 200.0).await.unwrap();

        let due = cache.zrange_by_score("q", 150.0, 10).await.unwrap();
        assert_eq!(due, vec!["b".to_string(), "a".to_string()]);
    }
}
