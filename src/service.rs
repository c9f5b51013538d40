//! The public resource API: `get_metadata`, `get_resource`, `put_resource`,
//! and `delete_resource`, each running the cache/blob protocol under the
//! resource's per-key lock.

use crate::blob_adapter::BlobTier;
use crate::cache_adapter::CacheTier;
use crate::descriptor::ResourceDescriptor;
use crate::error::ResourceCacheError;
use crate::keys;
use crate::model::{FolderEntry, FolderMetadata, ItemMetadata, ResourceMetadata, ResourceRecord};
use crate::time::now_ms;
use crate::traits::{BlobEntryKind, BlobStore, LockService, SharedCache};
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// Implements the cache/blob read-write protocol for one pair of backends.
/// Cheaply cloneable: everything it owns is `Arc`-wrapped, the same shape
/// the background scheduler shares.
pub struct ResourceService<B: BlobStore + ?Sized, C: SharedCache + ?Sized, L: LockService + ?Sized> {
    pub(crate) blob: BlobTier<B>,
    pub(crate) cache: CacheTier<C>,
    locks: Arc<L>,
    max_size: usize,
}

impl<B: BlobStore + ?Sized, C: SharedCache + ?Sized, L: LockService + ?Sized> ResourceService<B, C, L> {
    pub fn new(
        blob_store: Arc<B>,
        shared_cache: Arc<C>,
        locks: Arc<L>,
        max_size: usize,
        cache_expiration_ms: u64,
        sync_delay_ms: u64,
        compression_min_size: usize,
    ) -> Self {
        Self {
            blob: BlobTier::new(blob_store, compression_min_size),
            cache: CacheTier::new(shared_cache, cache_expiration_ms, sync_delay_ms),
            locks,
            max_size,
        }
    }

    /// Metadata for a folder listing or a single item, depending on the
    /// descriptor. Never mutates the cache.
    pub async fn get_metadata<D: ResourceDescriptor>(
        &self,
        descriptor: &D,
        page_token: Option<&str>,
        limit: usize,
    ) -> Result<Option<ResourceMetadata>> {
        if descriptor.is_folder() {
            self.get_folder_metadata(descriptor, page_token, limit).await
        } else {
            self.get_item_metadata(descriptor).await
        }
    }

    async fn get_folder_metadata<D: ResourceDescriptor>(
        &self,
        descriptor: &D,
        page_token: Option<&str>,
        limit: usize,
    ) -> Result<Option<ResourceMetadata>> {
        let prefix = keys::blob_key(descriptor);
        let page = self.blob.list(&prefix, page_token, limit).await?;

        if page.entries.is_empty() && !descriptor.is_root_folder() {
            return Ok(None);
        }

        let mut entries = Vec::with_capacity(page.entries.len());
        for entry in page.entries {
            let relative = strip_prefix(&entry.key, &prefix);
            match entry.kind {
                BlobEntryKind::Folder => {
                    entries.push(FolderEntry::Folder { name: relative });
                }
                BlobEntryKind::Object => {
                    let name = keys::path_from_blob_key(&relative);
                    let created_at = entry
                        .user_metadata
                        .get("created_at")
                        .and_then(|v| v.parse().ok())
                        .or(entry.created_at_ms)
                        .or(entry.last_modified_ms)
                        .unwrap_or_default();
                    let updated_at = entry
                        .user_metadata
                        .get("updated_at")
                        .and_then(|v| v.parse().ok())
                        .or(entry.last_modified_ms)
                        .unwrap_or(created_at);
                    entries.push(FolderEntry::Item {
                        name,
                        metadata: ItemMetadata { created_at, updated_at },
                    });
                }
            }
        }

        Ok(Some(ResourceMetadata::Folder(FolderMetadata {
            entries,
            next_token: page.next_token,
        })))
    }

    async fn get_item_metadata<D: ResourceDescriptor>(&self, descriptor: &D) -> Result<Option<ResourceMetadata>> {
        let cache_key = keys::cache_key(descriptor);
        let record = match self.cache.get(&cache_key, false).await? {
            Some(r) => r,
            None => self.blob.get(&keys::blob_key(descriptor), false).await?,
        };

        if !record.exists {
            return Ok(None);
        }
        Ok(Some(ResourceMetadata::Item(ItemMetadata {
            created_at: record.created_at.unwrap_or_default(),
            updated_at: record.updated_at.unwrap_or_default(),
        })))
    }

    /// Double-checked cache populate: a hit never touches the lock.
    pub async fn get_resource<D: ResourceDescriptor>(&self, descriptor: &D) -> Result<Option<String>> {
        let cache_key = keys::cache_key(descriptor);

        if let Some(record) = self.cache.get(&cache_key, true).await? {
            return Ok(extract_body(&record));
        }

        let _guard = self.locks.lock(&cache_key).await?;

        if let Some(record) = self.cache.get(&cache_key, true).await? {
            return Ok(extract_body(&record));
        }

        let blob_key = keys::blob_key(descriptor);
        let record = self.blob.get(&blob_key, true).await?;
        self.cache.put(&cache_key, &record, now_ms()).await?;
        Ok(extract_body(&record))
    }

    /// Write-absorbing put: the body is durable in the cache (and queued)
    /// before this call returns; the blob write happens on the next sync.
    pub async fn put_resource<D: ResourceDescriptor>(
        &self,
        descriptor: &D,
        body: String,
    ) -> Result<ItemMetadata> {
        if body.len() > self.max_size {
            return Err(ResourceCacheError::BodyTooLarge {
                size: body.len(),
                max: self.max_size,
            }
            .into());
        }

        let cache_key = keys::cache_key(descriptor);
        let blob_key = keys::blob_key(descriptor);
        let _guard = self.locks.lock(&cache_key).await?;

        let existing = match self.cache.get(&cache_key, false).await? {
            Some(r) => r,
            None => self.blob.get(&blob_key, false).await?,
        };

        let now = now_ms();
        let created_at = if existing.exists {
            existing.created_at.unwrap_or(now)
        } else {
            now
        };
        let updated_at = now;

        let record = ResourceRecord::present(body, created_at, updated_at, false);
        self.cache.put(&cache_key, &record, now).await?;

        if !existing.exists {
            self.blob.put(&blob_key, "", created_at, updated_at).await?;
            debug!(key = %cache_key, "created placeholder blob object for new resource");
        }

        Ok(ItemMetadata { created_at, updated_at })
    }

    /// Write-through delete: the blob object is removed synchronously; the
    /// queue entry written beforehand guarantees a retry if that fails.
    pub async fn delete_resource<D: ResourceDescriptor>(&self, descriptor: &D) -> Result<bool> {
        let cache_key = keys::cache_key(descriptor);
        let blob_key = keys::blob_key(descriptor);
        let _guard = self.locks.lock(&cache_key).await?;

        let existed = match self.cache.get(&cache_key, false).await? {
            Some(r) => r.exists,
            None => self.blob.exists(&blob_key).await?,
        };

        if !existed {
            return Ok(false);
        }

        self.cache.put(&cache_key, &ResourceRecord::tombstone(), now_ms()).await?;
        self.blob.delete(&blob_key).await?;
        self.cache.mark_synced(&cache_key).await?;
        Ok(true)
    }

    /// Reconcile one key: used both by `delete_resource`'s follow-up and the
    /// background scheduler. See [`crate::scheduler`].
    pub(crate) async fn sync_one(&self, cache_key: &str) -> Result<()> {
        let Some(record) = self.cache.get(cache_key, false).await? else {
            self.cache.dequeue_already_synced(cache_key).await?;
            return Ok(());
        };
        if record.synced {
            self.cache.dequeue_already_synced(cache_key).await?;
            return Ok(());
        }

        let blob_key = keys::blob_key_from_cache_key(cache_key);
        if record.exists {
            let with_body = self.cache.get(cache_key, true).await?.unwrap_or(record);
            let body = with_body.body.as_deref().unwrap_or_default();
            self.blob
                .put(
                    &blob_key,
                    body,
                    with_body.created_at.unwrap_or_else(now_ms),
                    with_body.updated_at.unwrap_or_else(now_ms),
                )
                .await?;
        } else {
            self.blob.delete(&blob_key).await?;
        }

        self.cache.mark_synced(cache_key).await?;
        Ok(())
    }

    pub(crate) fn locks(&self) -> &Arc<L> {
        &self.locks
    }
}

fn extract_body(record: &ResourceRecord) -> Option<String> {
    if record.exists {
        Some(record.body.clone().unwrap_or_default())
    } else {
        None
    }
}

fn strip_prefix(key: &str, prefix: &str) -> String {
    let stripped = key.strip_prefix(prefix).unwrap_or(key);
    stripped.trim_start_matches('/').trim_end_matches('/').to_string()
}
