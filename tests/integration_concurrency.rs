//! Covers concurrent writers to the same key: both complete, and the final
//! state is one of the two bodies with a single shared `created_at`.

mod common;

use common::setup_fast_sync_cache;
use resource_tier_cache::PathDescriptor;
use std::sync::Arc;

#[tokio::test]
async fn concurrent_puts_to_the_same_key_leave_a_consistent_final_state() {
    let harness = Arc::new(setup_fast_sync_cache());
    let doc = PathDescriptor::item("document", "contended");

    let (a, b) = tokio::join!(
        {
            let harness = Arc::clone(&harness);
            let doc = doc.clone();
            async move { harness.cache.put_resource(&doc, "from-a".to_string()).await.unwrap() }
        },
        {
            let harness = Arc::clone(&harness);
            let doc = doc.clone();
            async move { harness.cache.put_resource(&doc, "from-b".to_string()).await.unwrap() }
        }
    );

    assert_eq!(a.created_at, b.created_at);

    let final_body = harness.cache.get_resource(&doc).await.unwrap();
    assert!(final_body == Some("from-a".to_string()) || final_body == Some("from-b".to_string()));

    harness.cache.close();
}
