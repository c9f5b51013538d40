//! Common test infrastructure: an in-memory `ResourceCache` so the full
//! put/get/delete/sync lifecycle runs deterministically without a live
//! Redis instance or S3 bucket.

use resource_tier_cache::backends::{MemoryBlobStore, MemoryLockService, MemorySharedCache};
use resource_tier_cache::{Config, ResourceCache, ResourceCacheBuilder};
use std::sync::Arc;

pub type TestCache = ResourceCache<MemoryBlobStore, MemorySharedCache, MemoryLockService>;

/// A cache plus direct handles to its in-memory backends, so tests can
/// inspect blob-tier state the public API doesn't expose (e.g. whether an
/// object has been reconciled yet).
pub struct TestHarness {
    pub cache: TestCache,
    pub blob: Arc<MemoryBlobStore>,
}

/// Initialize `tracing` output for test runs, gated by `RUST_LOG`. Safe to
/// call from every test; only the first call takes effect.
fn init_test_logging() {
    let _ = tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).try_init();
}

/// Build a cache with the given tuning knobs over fresh in-memory backends.
pub fn setup_cache(config: Config) -> TestHarness {
    init_test_logging();
    let blob = Arc::new(MemoryBlobStore::new());
    let cache = ResourceCacheBuilder::new(config)
        .with_blob_store(Arc::clone(&blob))
        .with_shared_cache(Arc::new(MemorySharedCache::new()))
        .with_lock_service(Arc::new(MemoryLockService::new()))
        .build()
        .expect("in-memory backends are always sufficient to build a cache");

    TestHarness { cache, blob }
}

/// A cache tuned for fast, deterministic sync-timing assertions in tests.
pub fn setup_fast_sync_cache() -> TestHarness {
    setup_cache(Config {
        max_size: 10 * 1024 * 1024,
        sync_period_ms: 20,
        sync_delay_ms: 10,
        sync_batch: 50,
        cache_expiration_ms: 60_000,
        compression_min_size: 1024,
    })
}

/// Poll an async `condition` until it returns true or `timeout_ms` elapses.
pub async fn wait_for<F, Fut>(mut condition: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    use tokio::time::{sleep, Duration};

    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    while start.elapsed() < timeout {
        if condition().await {
            return true;
        }
        sleep(Duration::from_millis(5)).await;
    }

    false
}
