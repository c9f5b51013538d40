//! Error taxonomy for the resource cache
//!
//! Foreground operations return `anyhow::Result`, matching the rest of the
//! crate's API surface, but the underlying cause is always one of the
//! variants below when it originates inside this crate. Callers that need
//! to distinguish a size violation from a transient backend failure can
//! `downcast_ref::<ResourceCacheError>()` on the returned error.

use thiserror::Error;

/// Errors raised by the cache's own logic, as opposed to errors bubbled up
/// unchanged from a backend (`BlobStore`, `SharedCache`, `LockService`).
#[derive(Debug, Error)]
pub enum ResourceCacheError {
    /// `putResource` was called with a body larger than `max_size`.
    #[error("resource body of {size} bytes exceeds max_size of {max} bytes")]
    BodyTooLarge { size: usize, max: usize },

    /// A cache hash was present but missing or malformed a required field.
    #[error("cache entry for key {key:?} is missing or has a malformed field {field:?}")]
    MalformedCacheEntry { key: String, field: &'static str },

    /// An object carried a content-encoding this crate does not know how to decode.
    #[error("unsupported content-encoding {encoding:?} on object {key:?}")]
    UnsupportedEncoding { key: String, encoding: String },
}
