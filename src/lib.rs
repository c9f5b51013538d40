//! Write-back resource cache
//!
//! Fronts a durable blob store with a fast shared cache and reconciles the
//! two on a deferred schedule. Reads and writes are absorbed by the cache
//! tier; a background scheduler drains a per-key sync queue and persists
//! mutations to the blob tier, under a per-key distributed lock shared with
//! the foreground API.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use resource_tier_cache::backends::{MemoryBlobStore, MemoryLockService, MemorySharedCache};
//! use resource_tier_cache::{Config, PathDescriptor, ResourceCacheBuilder};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config {
//!         max_size: 10 * 1024 * 1024,
//!         sync_period_ms: 1000,
//!         sync_delay_ms: 200,
//!         sync_batch: 50,
//!         cache_expiration_ms: 60_000,
//!         compression_min_size: 1024,
//!     };
//!
//!     let cache = ResourceCacheBuilder::new(config)
//!         .with_blob_store(Arc::new(MemoryBlobStore::new()))
//!         .with_shared_cache(Arc::new(MemorySharedCache::new()))
//!         .with_lock_service(Arc::new(MemoryLockService::new()))
//!         .build()?;
//!
//!     let doc = PathDescriptor::item("document", "reports/q3");
//!     cache.put_resource(&doc, "hello".to_string()).await?;
//!     assert_eq!(cache.get_resource(&doc).await?, Some("hello".to_string()));
//!
//!     cache.close();
//!     Ok(())
//! }
//! ```

pub mod backends;
mod blob_adapter;
mod builder;
mod cache_adapter;
pub mod config;
pub mod descriptor;
pub mod error;
mod keys;
pub mod model;
mod scheduler;
mod service;
mod time;
pub mod traits;

pub use builder::ResourceCacheBuilder;
pub use config::{Config, ConfigBuilder};
pub use descriptor::{PathDescriptor, ResourceDescriptor};
pub use error::ResourceCacheError;
pub use model::{FolderEntry, FolderMetadata, ItemMetadata, ResourceMetadata, ResourceRecord};
pub use traits::{BlobStore, LockHandle, LockService, SharedCache};

use crate::scheduler::SyncScheduler;
use crate::service::ResourceService;
use anyhow::Result;
use std::sync::Arc;

/// The assembled cache: a [`ResourceService`] plus the background scheduler
/// reconciling it. Share it across tasks behind an `Arc`; [`ResourceCache::close`]
/// stops the scheduler for all holders at once.
pub struct ResourceCache<B: BlobStore + ?Sized, C: SharedCache + ?Sized, L: LockService + ?Sized> {
    service: Arc<ResourceService<B, C, L>>,
    scheduler: SyncScheduler,
}

impl<B: BlobStore + ?Sized + 'static, C: SharedCache + ?Sized + 'static, L: LockService + ?Sized + 'static>
    ResourceCache<B, C, L>
{
    pub(crate) fn from_service(service: Arc<ResourceService<B, C, L>>, sync_period_ms: u64, sync_batch: usize) -> Self {
        let scheduler = SyncScheduler::start(Arc::clone(&service), sync_period_ms, sync_batch);
        Self { service, scheduler }
    }

    /// Metadata for a folder listing or a single item, depending on the
    /// descriptor. Returns `None` for a missing item or a non-root folder
    /// with no children.
    ///
    /// # Errors
    ///
    /// Returns an error on a backend I/O failure or a malformed cache entry.
    pub async fn get_metadata<D: ResourceDescriptor>(
        &self,
        descriptor: &D,
        page_token: Option<&str>,
        limit: usize,
    ) -> Result<Option<ResourceMetadata>> {
        self.service.get_metadata(descriptor, page_token, limit).await
    }

    /// The resource's text body, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error on a backend I/O failure or a malformed cache entry.
    pub async fn get_resource<D: ResourceDescriptor>(&self, descriptor: &D) -> Result<Option<String>> {
        self.service.get_resource(descriptor).await
    }

    /// Write `body`, absorbed by the cache tier and queued for sync.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` exceeds the configured `max_size`, or on a
    /// backend I/O failure.
    pub async fn put_resource<D: ResourceDescriptor>(&self, descriptor: &D, body: String) -> Result<ItemMetadata> {
        self.service.put_resource(descriptor, body).await
    }

    /// Delete the resource, returning `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error on a backend I/O failure.
    pub async fn delete_resource<D: ResourceDescriptor>(&self, descriptor: &D) -> Result<bool> {
        self.service.delete_resource(descriptor).await
    }

    /// Stop the background sync scheduler. Already-dispatched reconciliation
    /// work is allowed to complete; this does not block on it.
    pub fn close(&self) {
        self.scheduler.shutdown();
    }
}
