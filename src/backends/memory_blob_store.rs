//! In-memory `BlobStore` reference backend.
//!
//! Stores objects in a `DashMap` and emulates the prefix/delimiter listing
//! semantics of an S3-style store closely enough to exercise folder
//! metadata without a live bucket. Intended for tests; production
//! deployments should use [`super::s3_blob_store::S3BlobStore`].

use crate::traits::{BlobEntry, BlobEntryKind, BlobListPage, BlobMeta, BlobObject, BlobStore};
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::{BTreeSet, HashMap};

struct StoredObject {
    bytes: Vec<u8>,
    content_encoding: Option<String>,
    user_metadata: HashMap<String, String>,
    last_modified_ms: i64,
}

pub struct MemoryBlobStore {
    objects: DashMap<String, StoredObject>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: DashMap::new(),
        }
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.contains_key(key))
    }

    async fn load(&self, key: &str) -> Result<Option<BlobObject>> {
        Ok(self.objects.get(key).map(|o| BlobObject {
            bytes: o.bytes.clone(),
            content_encoding: o.content_encoding.clone(),
            user_metadata: o.user_metadata.clone(),
            last_modified_ms: Some(o.last_modified_ms),
        }))
    }

    async fn meta(&self, key: &str) -> Result<Option<BlobMeta>> {
        Ok(self.objects.get(key).map(|o| BlobMeta {
            user_metadata: o.user_metadata.clone(),
            last_modified_ms: Some(o.last_modified_ms),
        }))
    }

    async fn store(
        &self,
        key: &str,
        _content_type: &str,
        content_encoding: Option<&str>,
        user_metadata: HashMap<String, String>,
        bytes: Vec<u8>,
    ) -> Result<()> {
        self.objects.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_encoding: content_encoding.map(str::to_string),
                user_metadata,
                last_modified_ms: crate::time::now_ms(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str, page_token: Option<&str>, limit: usize) -> Result<BlobListPage> {
        let search_prefix = if prefix.is_empty() {
            String::new()
        } else {
            format!("{prefix}/")
        };

        let mut object_keys = BTreeSet::new();
        let mut folder_names = BTreeSet::new();

        for entry in &self.objects {
            let Some(remainder) = entry.key().strip_prefix(&search_prefix) else {
                continue;
            };
            if remainder.is_empty() {
                continue;
            }
            match remainder.find('/') {
                Some(idx) => {
                    folder_names.insert(remainder[..idx].to_string());
                }
                None => {
                    object_keys.insert(entry.key().clone());
                }
            }
        }

        let mut names: Vec<(String, bool)> = folder_names
            .into_iter()
            .map(|n| (n, true))
            .chain(object_keys.into_iter().map(|k| (k, false)))
            .collect();
        names.sort_by(|a, b| a.0.cmp(&b.0));

        let start = page_token
            .and_then(|token| names.iter().position(|(name, _)| name.as_str() > token))
            .unwrap_or(0);
        let page: Vec<_> = names.into_iter().skip(start).take(limit).collect();
        let next_token = if page.len() == limit {
            page.last().map(|(name, _)| name.clone())
        } else {
            None
        };

        let mut entries = Vec::with_capacity(page.len());
        for (name, is_folder) in page {
            if is_folder {
                entries.push(BlobEntry {
                    key: format!("{search_prefix}{name}"),
                    kind: BlobEntryKind::Folder,
                    user_metadata: HashMap::new(),
                    created_at_ms: None,
                    last_modified_ms: None,
                });
            } else if let Some(object) = self.objects.get(&name) {
                entries.push(BlobEntry {
                    key: name.clone(),
                    kind: BlobEntryKind::Object,
                    user_metadata: object.user_metadata.clone(),
                    created_at_ms: None,
                    last_modified_ms: Some(object.last_modified_ms),
                });
            }
        }

        Ok(BlobListPage { entries, next_token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_then_load_round_trips() {
        let store = MemoryBlobStore::new();
        store
            .store("a.json", "application/json", None, HashMap::new(), b"hi".to_vec())
            .await
            .unwrap();
        let loaded = store.load("a.json").await.unwrap().unwrap();
        assert_eq!(loaded.bytes, b"hi");
    }

    #[tokio::test]
    async fn list_distinguishes_folders_from_objects() {
        let store = MemoryBlobStore::new();
        store
            .store("reports/q3.json", "application/json", None, HashMap::new(), b"x".to_vec())
            .await
            .unwrap();
        store
            .store("reports/archive/old.json", "application/json", None, HashMap::new(), b"y".to_vec())
            .await
            .unwrap();

        let page = store.list("reports", None, 10).await.unwrap();
        assert_eq!(page.entries.len(), 2);
        assert!(page.entries.iter().any(|e| e.kind == BlobEntryKind::Folder));
        assert!(page.entries.iter().any(|e| e.kind == BlobEntryKind::Object));
    }

    #[tokio::test]
    async fn missing_key_returns_none() {
        let store = MemoryBlobStore::new();
        assert!(store.load("missing.json").await.unwrap().is_none());
    }
}
