//! Collaborator traits: the blob store, shared cache, and lock service this
//! crate is built against. Implement these to plug in a custom backend; see
//! `backends::memory_blob_store`, `backends::memory_shared_cache`, and
//! `backends::memory_lock` for reference implementations, and
//! `backends::s3_blob_store`, `backends::redis_shared_cache`, and
//! `backends::redis_lock` for the production wiring.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// One page of a blob listing.
#[derive(Debug, Clone, Default)]
pub struct BlobListPage {
    pub entries: Vec<BlobEntry>,
    pub next_token: Option<String>,
}

/// Whether a listed blob entry is an object or a common prefix (folder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobEntryKind {
    Object,
    Folder,
}

/// One entry returned from `BlobStore::list`.
#[derive(Debug, Clone)]
pub struct BlobEntry {
    pub key: String,
    pub kind: BlobEntryKind,
    /// User metadata attached at `store` time (e.g. `created_at`/`updated_at`).
    pub user_metadata: HashMap<String, String>,
    pub created_at_ms: Option<i64>,
    pub last_modified_ms: Option<i64>,
}

/// A loaded object's body and metadata.
#[derive(Debug, Clone)]
pub struct BlobObject {
    pub bytes: Vec<u8>,
    pub content_encoding: Option<String>,
    pub user_metadata: HashMap<String, String>,
    pub last_modified_ms: Option<i64>,
}

/// Metadata-only view of an object, without its body.
#[derive(Debug, Clone)]
pub struct BlobMeta {
    pub user_metadata: HashMap<String, String>,
    pub last_modified_ms: Option<i64>,
}

/// The durable object store backing this cache. Production wiring targets
/// an S3-compatible store; see `backends::s3_blob_store::S3BlobStore`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool>;

    async fn load(&self, key: &str) -> Result<Option<BlobObject>>;

    async fn meta(&self, key: &str) -> Result<Option<BlobMeta>>;

    /// Write `bytes` under `key` with the given content type, optional
    /// content encoding, and user metadata (decimal-string timestamps go here).
    async fn store(
        &self,
        key: &str,
        content_type: &str,
        content_encoding: Option<&str>,
        user_metadata: HashMap<String, String>,
        bytes: Vec<u8>,
    ) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// List objects/prefixes under `prefix`, paginated.
    async fn list(
        &self,
        prefix: &str,
        page_token: Option<&str>,
        limit: usize,
    ) -> Result<BlobListPage>;
}

/// The shared, networked key-value store fronting the blob tier. Production
/// wiring targets Redis; see `backends::redis_shared_cache::RedisSharedCache`.
///
/// Hash fields and the sync queue member/score semantics are exactly the
/// layout the cache tier adapter relies on — implementations should not
/// reinterpret them.
#[async_trait]
pub trait SharedCache: Send + Sync {
    /// Read every field of the hash at `key`, or `None` if the hash does not exist.
    async fn hash_get_all(&self, key: &str) -> Result<Option<HashMap<String, String>>>;

    /// Overwrite the given fields of the hash at `key`, creating it if absent.
    async fn hash_set(&self, key: &str, fields: &[(&str, &str)]) -> Result<()>;

    /// Apply a TTL to `key`. `None` removes any existing TTL (`PERSIST`).
    async fn expire(&self, key: &str, ttl_ms: Option<u64>) -> Result<()>;

    /// Apply a TTL to `key` only if it does not already have one. A no-op on
    /// a key that already carries a lease, unlike [`SharedCache::expire`].
    async fn expire_if_unset(&self, key: &str, ttl_ms: u64) -> Result<()>;

    /// Delete the hash at `key` outright (used for tests and cleanup, not on the hot path).
    async fn delete(&self, key: &str) -> Result<()>;

    /// Add `member` to the sorted set `set` with `score`, or update its score if present.
    async fn zadd(&self, set: &str, member: &str, score: f64) -> Result<()>;

    /// Remove `member` from the sorted set `set`.
    async fn zrem(&self, set: &str, member: &str) -> Result<()>;

    /// Members of `set` with score in `(-inf, max_score]`, ascending, capped at `limit`.
    async fn zrange_by_score(&self, set: &str, max_score: f64, limit: usize) -> Result<Vec<String>>;
}

/// A held per-key lock. Releases when dropped.
pub trait LockHandle: Send {}

/// The distributed per-key mutual exclusion service. Production wiring
/// targets a Redis lease; see `backends::redis_lock::RedisLockService`.
#[async_trait]
pub trait LockService: Send + Sync {
    /// Block until the lock for `key` is held.
    async fn lock(&self, key: &str) -> Result<Box<dyn LockHandle>>;

    /// Attempt to acquire the lock for `key` without blocking.
    async fn try_lock(&self, key: &str) -> Result<Option<Box<dyn LockHandle>>>;
}
