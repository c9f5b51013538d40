//! Translates between the blob store's raw object protocol and
//! [`ResourceRecord`]s, applying compression transparently.

use crate::compression;
use crate::model::ResourceRecord;
use crate::traits::{BlobListPage, BlobStore};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

const CONTENT_TYPE: &str = "application/json";
const CREATED_AT_KEY: &str = "created_at";
const UPDATED_AT_KEY: &str = "updated_at";

/// Adapter over a [`BlobStore`] exposing the `Result`-shaped operations the
/// resource API and scheduler need, instead of the store's raw object API.
pub struct BlobTier<B: BlobStore + ?Sized> {
    store: Arc<B>,
    compression_min_size: usize,
}

impl<B: BlobStore + ?Sized> BlobTier<B> {
    pub fn new(store: Arc<B>, compression_min_size: usize) -> Self {
        Self {
            store,
            compression_min_size,
        }
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        self.store.exists(key).await
    }

    /// Load a resource, optionally skipping the body for a metadata-only read.
    pub async fn get(&self, key: &str, with_body: bool) -> Result<ResourceRecord> {
        if with_body {
            let Some(object) = self.store.load(key).await? else {
                debug!(key, "blob miss");
                return Ok(ResourceRecord::absent_synced());
            };
            let body = compression::decode(key, &object.bytes, object.content_encoding.as_deref())?;
            Ok(record_from_metadata(&object.user_metadata, body, object.last_modified_ms))
        } else {
            let Some(meta) = self.store.meta(key).await? else {
                debug!(key, "blob miss");
                return Ok(ResourceRecord::absent_synced());
            };
            Ok(record_from_metadata(&meta.user_metadata, String::new(), meta.last_modified_ms).without_body())
        }
    }

    /// Write `body` to `key`, tagging it with the resource's creation and update times.
    pub async fn put(&self, key: &str, body: &str, created_at: i64, updated_at: i64) -> Result<()> {
        let encoded = compression::encode(body, self.compression_min_size)?;
        let mut user_metadata = HashMap::with_capacity(2);
        user_metadata.insert(CREATED_AT_KEY.to_string(), created_at.to_string());
        user_metadata.insert(UPDATED_AT_KEY.to_string(), updated_at.to_string());

        self.store
            .store(key, CONTENT_TYPE, encoded.encoding, user_metadata, encoded.bytes)
            .await?;
        debug!(key, body_len = body.len(), "blob write");
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        self.store.delete(key).await?;
        debug!(key, "blob delete");
        Ok(())
    }

    pub async fn list(&self, prefix: &str, page_token: Option<&str>, limit: usize) -> Result<BlobListPage> {
        self.store.list(prefix, page_token, limit).await
    }
}

fn record_from_metadata(
    user_metadata: &HashMap<String, String>,
    body: String,
    last_modified_ms: Option<i64>,
) -> ResourceRecord {
    let created_at = user_metadata
        .get(CREATED_AT_KEY)
        .and_then(|v| v.parse().ok())
        .or(last_modified_ms);
    let updated_at = user_metadata
        .get(UPDATED_AT_KEY)
        .and_then(|v| v.parse().ok())
        .or(last_modified_ms);

    ResourceRecord {
        body: Some(body),
        created_at,
        updated_at,
        synced: true,
        exists: true,
    }
}
