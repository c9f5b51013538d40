//! Backend implementations of the collaborator traits in [`crate::traits`].
//!
//! `memory_*` backends are process-local reference implementations used by
//! this crate's own test suite; `redis_shared_cache`/`redis_lock`/`s3_blob_store`
//! are the production wiring.

pub mod memory_blob_store;
pub mod memory_lock;
pub mod memory_shared_cache;
pub mod redis_lock;
pub mod redis_shared_cache;
pub mod s3_blob_store;

pub use memory_blob_store::MemoryBlobStore;
pub use memory_lock::MemoryLockService;
pub use memory_shared_cache::MemorySharedCache;
pub use redis_lock::RedisLockService;
pub use redis_shared_cache::RedisSharedCache;
pub use s3_blob_store::S3BlobStore;
