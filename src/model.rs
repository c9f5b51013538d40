//! Plain data types shared by the blob tier, cache tier, and resource API.

use serde::{Deserialize, Serialize};

/// Materialized view of one resource across both tiers.
///
/// `created_at` / `updated_at` are `None` exactly when the resource does not
/// exist; `exists = false` with `synced = true` is the canonical
/// "definitely absent, nothing to reconcile" value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub body: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub synced: bool,
    pub exists: bool,
}

impl ResourceRecord {
    /// The value used when a probe (blob or cache) found nothing to reconcile.
    #[must_use]
    pub fn absent_synced() -> Self {
        Self {
            body: Some(String::new()),
            created_at: None,
            updated_at: None,
            synced: true,
            exists: false,
        }
    }

    /// A tombstone written by `delete_resource` before the blob delete runs.
    #[must_use]
    pub fn tombstone() -> Self {
        Self {
            body: Some(String::new()),
            created_at: None,
            updated_at: None,
            synced: false,
            exists: false,
        }
    }

    #[must_use]
    pub fn present(body: String, created_at: i64, updated_at: i64, synced: bool) -> Self {
        Self {
            body: Some(body),
            created_at: Some(created_at),
            updated_at: Some(updated_at),
            synced,
            exists: true,
        }
    }

    /// Same record with the body dropped, for metadata-only reads.
    #[must_use]
    pub fn without_body(mut self) -> Self {
        self.body = None;
        self
    }
}

/// Metadata view of a single item, returned by `get_metadata` and `put_resource`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub created_at: i64,
    pub updated_at: i64,
}

/// One entry in a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FolderEntry {
    Item { name: String, metadata: ItemMetadata },
    Folder { name: String },
}

/// Metadata view of a folder, returned by `get_metadata`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FolderMetadata {
    pub entries: Vec<FolderEntry>,
    pub next_token: Option<String>,
}

/// Polymorphic result of `get_metadata`, since a descriptor may name either
/// an item or a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceMetadata {
    Item(ItemMetadata),
    Folder(FolderMetadata),
}
