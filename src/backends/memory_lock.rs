//! In-memory `LockService` reference backend.
//!
//! Per-key mutual exclusion via a `DashMap` of owned mutexes, the same
//! stampede-protection shape used elsewhere in this codebase for in-flight
//! request tracking. Releases synchronously on drop since there is no
//! network round-trip involved. Production deployments should use
//! [`super::redis_lock::RedisLockService`] for cross-process locking.

use crate::traits::{LockHandle, LockService};
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

pub struct MemoryLockService {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl MemoryLockService {
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
        }
    }

    fn mutex_for(&self, key: &str) -> Arc<Mutex<()>> {
        Arc::clone(
            self.locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }
}

impl Default for MemoryLockService {
    fn default() -> Self {
        Self::new()
    }
}

struct MemoryLockHandle {
    _guard: OwnedMutexGuard<()>,
}

impl LockHandle for MemoryLockHandle {}

#[async_trait]
impl LockService for MemoryLockService {
    async fn lock(&self, key: &str) -> Result<Box<dyn LockHandle>> {
        let mutex = self.mutex_for(key);
        let guard = mutex.lock_owned().await;
        Ok(Box::new(MemoryLockHandle { _guard: guard }))
    }

    async fn try_lock(&self, key: &str) -> Result<Option<Box<dyn LockHandle>>> {
        let mutex = self.mutex_for(key);
        match mutex.try_lock_owned() {
            Ok(guard) => Ok(Some(Box::new(MemoryLockHandle { _guard: guard }))),
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn try_lock_fails_while_held() {
        let locks = MemoryLockService::new();
        let held = locks.lock("k").await.unwrap();
        assert!(locks.try_lock("k").await.unwrap().is_none());
        drop(held);
        assert!(locks.try_lock("k").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn distinct_keys_do_not_contend() {
        let locks = MemoryLockService::new();
        let _a = locks.lock("a").await.unwrap();
        assert!(locks.try_lock("b").await.unwrap().is_some());
    }
}
