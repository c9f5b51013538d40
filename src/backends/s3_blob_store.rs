//! S3-backed `BlobStore`.

use crate::traits::{BlobEntry, BlobEntryKind, BlobListPage, BlobMeta, BlobObject, BlobStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::collections::HashMap;
use tracing::debug;

const DELIMITER: &str = "/";

pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    #[must_use]
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a store from the ambient AWS configuration (`AWS_REGION`,
    /// credentials chain, etc.) and an explicit bucket name.
    ///
    /// # Errors
    ///
    /// This constructor itself cannot fail; errors surface on first use if
    /// the bucket or credentials are misconfigured.
    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(Client::new(&config), bucket)
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        match self.client.head_object().bucket(&self.bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(err) if is_not_found(&err) => Ok(false),
            Err(err) => Err(err).context("S3 head_object failed"),
        }
    }

    async fn load(&self, key: &str) -> Result<Option<BlobObject>> {
        let response = match self.client.get_object().bucket(&self.bucket).key(key).send().await {
            Ok(response) => response,
            Err(err) if is_not_found(&err) => return Ok(None),
            Err(err) => return Err(err).context("S3 get_object failed"),
        };

        let content_encoding = response.content_encoding().map(str::to_string);
        let last_modified_ms = response.last_modified().and_then(|t| t.to_millis().ok());
        let user_metadata = response.metadata().cloned().unwrap_or_default();
        let bytes = response
            .body
            .collect()
            .await
            .context("failed to read S3 object body")?
            .into_bytes()
            .to_vec();

        Ok(Some(BlobObject {
            bytes,
            content_encoding,
            user_metadata,
            last_modified_ms,
        }))
    }

    async fn meta(&self, key: &str) -> Result<Option<BlobMeta>> {
        let response = match self.client.head_object().bucket(&self.bucket).key(key).send().await {
            Ok(response) => response,
            Err(err) if is_not_found(&err) => return Ok(None),
            Err(err) => return Err(err).context("S3 head_object failed"),
        };

        let last_modified_ms = response.last_modified().and_then(|t| t.to_millis().ok());
        let user_metadata = response.metadata().cloned().unwrap_or_default();

        Ok(Some(BlobMeta {
            user_metadata,
            last_modified_ms,
        }))
    }

    async fn store(
        &self,
        key: &str,
        content_type: &str,
        content_encoding: Option<&str>,
        user_metadata: HashMap<String, String>,
        bytes: Vec<u8>,
    ) -> Result<()> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .set_metadata(Some(user_metadata));

        if let Some(encoding) = content_encoding {
            request = request.content_encoding(encoding);
        }

        request.send().await.context("S3 put_object failed")?;
        debug!(key, "[S3] stored object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context("S3 delete_object failed")?;
        Ok(())
    }

    async fn list(&self, prefix: &str, page_token: Option<&str>, limit: usize) -> Result<BlobListPage> {
        let search_prefix = if prefix.is_empty() {
            String::new()
        } else {
            format!("{prefix}{DELIMITER}")
        };

        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&search_prefix)
            .delimiter(DELIMITER)
            .max_keys(i32::try_from(limit).unwrap_or(i32::MAX));

        if let Some(token) = page_token {
            request = request.continuation_token(token);
        }

        let response = request.send().await.context("S3 list_objects_v2 failed")?;

        let mut entries = Vec::new();
        for common_prefix in response.common_prefixes() {
            if let Some(p) = common_prefix.prefix() {
                entries.push(BlobEntry {
                    key: p.trim_end_matches(DELIMITER).to_string(),
                    kind: BlobEntryKind::Folder,
                    user_metadata: HashMap::new(),
                    created_at_ms: None,
                    last_modified_ms: None,
                });
            }
        }
        for object in response.contents() {
            let Some(key) = object.key() else { continue };
            entries.push(BlobEntry {
                key: key.to_string(),
                kind: BlobEntryKind::Object,
                user_metadata: HashMap::new(),
                created_at_ms: None,
                last_modified_ms: object.last_modified().and_then(|t| t.to_millis().ok()),
            });
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        let next_token = response.next_continuation_token().map(str::to_string);
        Ok(BlobListPage { entries, next_token })
    }
}

fn is_not_found(err: &aws_sdk_s3::error::SdkError<impl std::fmt::Debug>) -> bool {
    matches!(
        err,
        aws_sdk_s3::error::SdkError::ServiceError(service_err)
            if format!("{service_err:?}").contains("NotFound") || format!("{service_err:?}").contains("NoSuchKey")
    )
}
