//! Key derivation between resource descriptors, blob object keys, and
//! shared-cache keys. See the data model for the exact layout each key
//! space follows.

use crate::descriptor::ResourceDescriptor;

/// Object key a descriptor maps to in the blob tier.
///
/// Items get a `.json` suffix; folders are addressed by their bare path,
/// used as a listing prefix.
#[must_use]
pub fn blob_key<D: ResourceDescriptor>(descriptor: &D) -> String {
    if descriptor.is_folder() {
        descriptor.path().to_string()
    } else {
        format!("{}.json", descriptor.path())
    }
}

/// Shared-cache hash key a descriptor maps to, namespaced by resource type.
#[must_use]
pub fn cache_key<D: ResourceDescriptor>(descriptor: &D) -> String {
    format!("{}:{}", descriptor.resource_type().to_lowercase(), descriptor.path())
}

/// Recover the blob object key from a cache key, stripping the `type:` prefix.
#[must_use]
pub fn blob_key_from_cache_key(cache_key: &str) -> String {
    let path = cache_key.split_once(':').map_or(cache_key, |(_, rest)| rest);
    format!("{path}.json")
}

/// Recover a folder-relative path from a blob object key, stripping `.json`.
#[must_use]
pub fn path_from_blob_key(blob_key: &str) -> String {
    blob_key.strip_suffix(".json").unwrap_or(blob_key).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PathDescriptor;

    #[test]
    fn item_key_has_json_suffix() {
        let d = PathDescriptor::item("document", "reports/q3");
        assert_eq!(blob_key(&d), "reports/q3.json");
    }

    #[test]
    fn folder_key_has_no_suffix() {
        let d = PathDescriptor::folder("document", "reports");
        assert_eq!(blob_key(&d), "reports");
    }

    #[test]
    fn cache_key_is_namespaced_and_lowercased() {
        let d = PathDescriptor::item("Document", "reports/q3");
        assert_eq!(cache_key(&d), "document:reports/q3");
    }

    #[test]
    fn round_trips_through_cache_key() {
        let d = PathDescriptor::item("document", "reports/q3");
        let ck = cache_key(&d);
        assert_eq!(blob_key_from_cache_key(&ck), blob_key(&d));
    }

    #[test]
    fn path_from_blob_key_strips_suffix() {
        assert_eq!(path_from_blob_key("reports/q3.json"), "reports/q3");
        assert_eq!(path_from_blob_key("reports"), "reports");
    }
}
