//! Builder for assembling a [`ResourceCache`] from its three collaborators
//! and a [`Config`].
//!
//! # Example
//!
//! ```rust,no_run
//! use resource_tier_cache::{Config, ResourceCacheBuilder};
//! use resource_tier_cache::backends::{MemoryBlobStore, MemorySharedCache, MemoryLockService};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config {
//!     max_size: 10 * 1024 * 1024,
//!     sync_period_ms: 1000,
//!     sync_delay_ms: 200,
//!     sync_batch: 50,
//!     cache_expiration_ms: 60_000,
//!     compression_min_size: 1024,
//! };
//!
//! let cache = ResourceCacheBuilder::new(config)
//!     .with_blob_store(Arc::new(MemoryBlobStore::new()))
//!     .with_shared_cache(Arc::new(MemorySharedCache::new()))
//!     .with_lock_service(Arc::new(MemoryLockService::new()))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use crate::config::Config;
use crate::service::ResourceService;
use crate::traits::{BlobStore, LockService, SharedCache};
use crate::ResourceCache;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Builder for [`ResourceCache`]. All three backends must be supplied.
pub struct ResourceCacheBuilder<B: ?Sized, C: ?Sized, L: ?Sized> {
    config: Config,
    blob_store: Option<Arc<B>>,
    shared_cache: Option<Arc<C>>,
    lock_service: Option<Arc<L>>,
}

impl<B: BlobStore + ?Sized, C: SharedCache + ?Sized, L: LockService + ?Sized> ResourceCacheBuilder<B, C, L> {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            blob_store: None,
            shared_cache: None,
            lock_service: None,
        }
    }

    #[must_use]
    pub fn with_blob_store(mut self, store: Arc<B>) -> Self {
        self.blob_store = Some(store);
        self
    }

    #[must_use]
    pub fn with_shared_cache(mut self, cache: Arc<C>) -> Self {
        self.shared_cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_lock_service(mut self, locks: Arc<L>) -> Self {
        self.lock_service = Some(locks);
        self
    }

    /// Assemble the cache and start its background sync scheduler.
    ///
    /// # Errors
    ///
    /// Returns an error if a required backend was never supplied.
    pub fn build(self) -> Result<ResourceCache<B, C, L>>
    where
        B: 'static,
        C: 'static,
        L: 'static,
    {
        let blob_store = self.blob_store.context("blob_store is required")?;
        let shared_cache = self.shared_cache.context("shared_cache is required")?;
        let lock_service = self.lock_service.context("lock_service is required")?;

        let service = Arc::new(ResourceService::new(
            blob_store,
            shared_cache,
            lock_service,
            self.config.max_size,
            self.config.cache_expiration_ms,
            self.config.sync_delay_ms,
            self.config.compression_min_size,
        ));

        Ok(ResourceCache::from_service(
            service,
            self.config.sync_period_ms,
            self.config.sync_batch,
        ))
    }
}
