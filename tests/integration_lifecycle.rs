//! Covers the put/get/delete lifecycle end-to-end, including eventual
//! reconciliation to the blob tier.

mod common;

use common::{setup_cache, setup_fast_sync_cache, wait_for};
use resource_tier_cache::{BlobStore, Config, PathDescriptor};

#[tokio::test]
async fn put_then_immediate_get_returns_the_written_body() {
    let harness = setup_fast_sync_cache();
    let doc = PathDescriptor::item("document", "greeting");

    harness.cache.put_resource(&doc, "hi".to_string()).await.unwrap();
    let body = harness.cache.get_resource(&doc).await.unwrap();

    assert_eq!(body, Some("hi".to_string()));
}

#[tokio::test]
async fn put_eventually_reconciles_to_the_blob_tier() {
    let harness = setup_fast_sync_cache();
    let doc = PathDescriptor::item("document", "greeting");

    harness.cache.put_resource(&doc, "hi".to_string()).await.unwrap();

    let synced = wait_for(|| async { harness.blob.load("greeting.json").await.unwrap().is_some_and(|o| o.bytes == b"hi") }, 500).await;
    assert!(synced, "expected blob object to reflect the written body after sync");

    harness.cache.close();
}

#[tokio::test]
async fn put_then_immediate_delete_returns_true_and_clears_blob() {
    let harness = setup_fast_sync_cache();
    let doc = PathDescriptor::item("document", "scratch");

    harness.cache.put_resource(&doc, "x".to_string()).await.unwrap();
    let deleted = harness.cache.delete_resource(&doc).await.unwrap();

    assert!(deleted);
    assert_eq!(harness.cache.get_resource(&doc).await.unwrap(), None);
    assert!(!harness.blob.exists("scratch.json").await.unwrap());
    harness.cache.close();
}

#[tokio::test]
async fn deleting_a_never_existing_key_returns_false() {
    let harness = setup_fast_sync_cache();
    let doc = PathDescriptor::item("document", "never-existed");

    let deleted = harness.cache.delete_resource(&doc).await.unwrap();

    assert!(!deleted);
    harness.cache.close();
}

#[tokio::test]
async fn first_put_creates_a_placeholder_blob_object_synchronously() {
    let harness = setup_cache(Config {
        max_size: 1024 * 1024,
        sync_period_ms: 10_000,
        sync_delay_ms: 10_000,
        sync_batch: 50,
        cache_expiration_ms: 60_000,
        compression_min_size: 1024,
    });
    let doc = PathDescriptor::item("document", "placeholder");

    harness.cache.put_resource(&doc, "body".to_string()).await.unwrap();

    assert!(harness.blob.exists("placeholder.json").await.unwrap());
    harness.cache.close();
}

#[tokio::test]
async fn put_rejects_a_body_larger_than_max_size() {
    let harness = setup_cache(Config {
        max_size: 4,
        sync_period_ms: 10_000,
        sync_delay_ms: 10_000,
        sync_batch: 50,
        cache_expiration_ms: 60_000,
        compression_min_size: 1024,
    });
    let doc = PathDescriptor::item("document", "too-big");

    let err = harness.cache.put_resource(&doc, "too long".to_string()).await.unwrap_err();
    assert!(err.downcast_ref::<resource_tier_cache::ResourceCacheError>().is_some());
    harness.cache.close();
}
