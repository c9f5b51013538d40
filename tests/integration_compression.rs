//! Covers the compression-threshold boundary behavior and round-trip.

mod common;

use common::{setup_fast_sync_cache, wait_for};
use resource_tier_cache::{BlobStore, PathDescriptor};

#[tokio::test]
async fn large_body_is_compressed_on_sync_and_decodes_back_identical() {
    let harness = setup_fast_sync_cache();
    let doc = PathDescriptor::item("document", "big");
    let body = "a".repeat(4096);

    harness.cache.put_resource(&doc, body.clone()).await.unwrap();

    let synced = wait_for(|| async { harness.blob.exists("big.json").await.unwrap() }, 500).await;
    assert!(synced);

    let object = harness.blob.load("big.json").await.unwrap().unwrap();
    assert_eq!(object.content_encoding.as_deref(), Some("gzip"));
    assert!(object.bytes.len() < body.len());

    let reloaded = harness.cache.get_resource(&doc).await.unwrap();
    assert_eq!(reloaded, Some(body));
    harness.cache.close();
}

#[tokio::test]
async fn small_body_is_stored_without_encoding() {
    let harness = setup_fast_sync_cache();
    let doc = PathDescriptor::item("document", "small");

    harness.cache.put_resource(&doc, "hi".to_string()).await.unwrap();

    let synced = wait_for(|| async { harness.blob.exists("small.json").await.unwrap() }, 500).await;
    assert!(synced);

    let object = harness.blob.load("small.json").await.unwrap().unwrap();
    assert!(object.content_encoding.is_none());
    assert_eq!(object.bytes, b"hi");
    harness.cache.close();
}
