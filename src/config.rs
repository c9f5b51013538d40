//! Cache configuration.

use anyhow::{bail, Result};

/// Tuning knobs for the resource cache. All fields are required; construct
/// via [`ConfigBuilder`], which validates the tuple before producing a `Config`.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Maximum accepted body size, in bytes.
    pub max_size: usize,
    /// Interval between background sync sweeps, in milliseconds.
    pub sync_period_ms: u64,
    /// Debounce: delay between a mutation and its eligibility for sync, in milliseconds.
    pub sync_delay_ms: u64,
    /// Maximum keys reconciled per sweep.
    pub sync_batch: usize,
    /// TTL applied to a cache hash once it is known synced, in milliseconds.
    pub cache_expiration_ms: u64,
    /// Minimum body size, in bytes, at which gzip compression is applied.
    pub compression_min_size: usize,
}

/// Builder for [`Config`], validating the tuple at `build()` time rather than
/// deferring an inconsistency to the first cache operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigBuilder {
    max_size: Option<usize>,
    sync_period_ms: Option<u64>,
    sync_delay_ms: Option<u64>,
    sync_batch: Option<usize>,
    cache_expiration_ms: Option<u64>,
    compression_min_size: Option<usize>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_size(mut self, bytes: usize) -> Self {
        self.max_size = Some(bytes);
        self
    }

    #[must_use]
    pub fn sync_period_ms(mut self, ms: u64) -> Self {
        self.sync_period_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn sync_delay_ms(mut self, ms: u64) -> Self {
        self.sync_delay_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn sync_batch(mut self, count: usize) -> Self {
        self.sync_batch = Some(count);
        self
    }

    #[must_use]
    pub fn cache_expiration_ms(mut self, ms: u64) -> Self {
        self.cache_expiration_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn compression_min_size(mut self, bytes: usize) -> Self {
        self.compression_min_size = Some(bytes);
        self
    }

    /// # Errors
    ///
    /// Returns an error if a required field was never set, or if the
    /// resulting tuple is internally inconsistent (`compression_min_size`
    /// greater than `max_size`).
    pub fn build(self) -> Result<Config> {
        let Some(max_size) = self.max_size else {
            bail!("max_size is required");
        };
        let Some(sync_period_ms) = self.sync_period_ms else {
            bail!("sync_period_ms is required");
        };
        let Some(sync_delay_ms) = self.sync_delay_ms else {
            bail!("sync_delay_ms is required");
        };
        let Some(sync_batch) = self.sync_batch else {
            bail!("sync_batch is required");
        };
        let Some(cache_expiration_ms) = self.cache_expiration_ms else {
            bail!("cache_expiration_ms is required");
        };
        let Some(compression_min_size) = self.compression_min_size else {
            bail!("compression_min_size is required");
        };

        if compression_min_size > max_size {
            bail!(
                "compression_min_size ({compression_min_size}) cannot exceed max_size ({max_size})"
            );
        }
        if sync_batch == 0 {
            bail!("sync_batch must be at least 1");
        }

        Ok(Config {
            max_size,
            sync_period_ms,
            sync_delay_ms,
            sync_batch,
            cache_expiration_ms,
            compression_min_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_builder() -> ConfigBuilder {
        ConfigBuilder::new()
            .max_size(1_000_000)
            .sync_period_ms(1000)
            .sync_delay_ms(200)
            .sync_batch(50)
            .cache_expiration_ms(60_000)
            .compression_min_size(1024)
    }

    #[test]
    fn builds_with_all_fields_set() {
        assert!(valid_builder().build().is_ok());
    }

    #[test]
    fn rejects_missing_field() {
        let builder = ConfigBuilder::new().max_size(1024);
        assert!(builder.build().is_err());
    }

    #[test]
    fn rejects_compression_min_size_above_max_size() {
        let builder = valid_builder().max_size(512).compression_min_size(1024);
        assert!(builder.build().is_err());
    }

    #[test]
    fn rejects_zero_sync_batch() {
        let builder = valid_builder().sync_batch(0);
        assert!(builder.build().is_err());
    }
}
