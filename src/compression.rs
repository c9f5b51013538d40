//! Size-threshold gzip compression for resource bodies.
//!
//! Bodies at or above `min_size` bytes are stored gzip-compressed with a
//! `gzip` content-encoding tag; smaller bodies are stored raw with no tag.
//! Reads decompress transparently based on the stored tag, and fail on any
//! encoding this module doesn't recognize.

use crate::error::ResourceCacheError;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// The only content-encoding this crate writes or understands on read.
pub const GZIP_ENCODING: &str = "gzip";

/// Bytes ready to hand to the blob tier, plus the encoding tag (if any) to
/// store alongside them.
pub struct EncodedBody {
    pub bytes: Vec<u8>,
    pub encoding: Option<&'static str>,
}

/// Compress `body` iff it is at least `min_size` bytes.
pub fn encode(body: &str, min_size: usize) -> Result<EncodedBody> {
    if body.len() < min_size {
        return Ok(EncodedBody {
            bytes: body.as_bytes().to_vec(),
            encoding: None,
        });
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(body.as_bytes())
        .context("gzip compression failed")?;
    let bytes = encoder.finish().context("gzip compression failed")?;

    Ok(EncodedBody {
        bytes,
        encoding: Some(GZIP_ENCODING),
    })
}

/// Decode bytes read from the blob tier back into UTF-8 text, decompressing
/// iff `encoding` names gzip. Any other non-empty encoding is rejected.
pub fn decode(key: &str, bytes: &[u8], encoding: Option<&str>) -> Result<String> {
    match encoding {
        None | Some("") => {
            String::from_utf8(bytes.to_vec()).context("stored object was not valid UTF-8")
        }
        Some(GZIP_ENCODING) => {
            let mut decoder = GzDecoder::new(bytes);
            let mut out = String::new();
            decoder
                .read_to_string(&mut out)
                .context("gzip decompression failed")?;
            Ok(out)
        }
        Some(other) => Err(ResourceCacheError::UnsupportedEncoding {
            key: key.to_string(),
            encoding: other.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_body_is_stored_raw() {
        let encoded = encode("hi", 1024).unwrap();
        assert!(encoded.encoding.is_none());
        assert_eq!(encoded.bytes, b"hi");
    }

    #[test]
    fn large_body_is_compressed_and_tagged() {
        let body = "a".repeat(4096);
        let encoded = encode(&body, 1024).unwrap();
        assert_eq!(encoded.encoding, Some(GZIP_ENCODING));
        assert!(encoded.bytes.len() < body.len());
    }

    #[test]
    fn round_trips_through_gzip() {
        let body = "a".repeat(4096);
        let encoded = encode(&body, 1024).unwrap();
        let decoded = decode("key", &encoded.bytes, encoded.encoding).unwrap();
        assert_eq!(decoded, body);
    }

    #[test]
    fn round_trips_raw() {
        let encoded = encode("hi", 1024).unwrap();
        let decoded = decode("key", &encoded.bytes, encoded.encoding).unwrap();
        assert_eq!(decoded, "hi");
    }

    #[test]
    fn unknown_encoding_fails() {
        let err = decode("key", b"whatever", Some("br")).unwrap_err();
        assert!(err.downcast_ref::<ResourceCacheError>().is_some());
    }
}
