//! Covers `get_metadata`'s folder-listing boundary behaviors.

mod common;

use common::{setup_cache, setup_fast_sync_cache};
use resource_tier_cache::{Config, PathDescriptor, ResourceMetadata};

#[tokio::test]
async fn root_folder_on_empty_store_is_an_empty_folder_not_missing() {
    let harness = setup_fast_sync_cache();
    let root = PathDescriptor::folder("document", "");

    let metadata = harness.cache.get_metadata(&root, None, 100).await.unwrap();

    match metadata {
        Some(ResourceMetadata::Folder(folder)) => assert!(folder.entries.is_empty()),
        other => panic!("expected an empty folder, got {other:?}"),
    }
}

#[tokio::test]
async fn non_root_folder_with_no_children_is_missing() {
    let harness = setup_fast_sync_cache();
    let empty = PathDescriptor::folder("document", "nothing-here");

    let metadata = harness.cache.get_metadata(&empty, None, 100).await.unwrap();

    assert!(metadata.is_none());
}

#[tokio::test]
async fn folder_listing_distinguishes_items_from_subfolders() {
    let harness = setup_cache(Config {
        max_size: 1024 * 1024,
        sync_period_ms: 10_000,
        sync_delay_ms: 10_000,
        sync_batch: 50,
        cache_expiration_ms: 60_000,
        compression_min_size: 1024,
    });

    let reports = PathDescriptor::folder("document", "reports");
    harness
        .cache
        .put_resource(&reports.child_item("q3"), "q3 body".to_string())
        .await
        .unwrap();
    harness
        .cache
        .put_resource(&reports.child_item("archive/q1"), "q1 body".to_string())
        .await
        .unwrap();

    let metadata = harness.cache.get_metadata(&reports, None, 100).await.unwrap();

    let Some(ResourceMetadata::Folder(folder)) = metadata else {
        panic!("expected a folder listing");
    };
    assert_eq!(folder.entries.len(), 2);

    harness.cache.close();
}

#[tokio::test]
async fn get_metadata_of_a_missing_item_is_none() {
    let harness = setup_fast_sync_cache();
    let missing = PathDescriptor::item("document", "ghost");

    assert!(harness.cache.get_metadata(&missing, None, 100).await.unwrap().is_none());
}
