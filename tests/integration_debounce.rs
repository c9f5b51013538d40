//! Covers the debounced double-write scenario: two quick successive writes
//! to the same key should reconcile to exactly the final body, with
//! `created_at` pinned to the first write and `updated_at` to the last.

mod common;

use common::{setup_cache, wait_for};
use resource_tier_cache::{BlobStore, Config, PathDescriptor};
use tokio::time::{sleep, Duration};

#[tokio::test]
async fn second_write_wins_and_created_at_is_preserved() {
    let harness = setup_cache(Config {
        max_size: 1024 * 1024,
        sync_period_ms: 50,
        sync_delay_ms: 100,
        sync_batch: 50,
        cache_expiration_ms: 60_000,
        compression_min_size: 1024 * 1024,
    });
    let doc = PathDescriptor::item("document", "versioned");

    let first = harness.cache.put_resource(&doc, "v1".to_string()).await.unwrap();
    sleep(Duration::from_millis(10)).await;
    let second = harness.cache.put_resource(&doc, "v2".to_string()).await.unwrap();

    assert_eq!(first.created_at, second.created_at);
    assert!(second.updated_at >= first.updated_at);

    let synced = wait_for(
        || async { harness.blob.load("versioned.json").await.unwrap().is_some_and(|o| o.bytes == b"v2") },
        1000,
    )
    .await;
    assert!(synced, "expected exactly the final write to reach the blob tier");

    harness.cache.close();
}
