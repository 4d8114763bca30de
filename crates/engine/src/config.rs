//! `EngineConfig`: the serde-deserializable configuration surface, loadable
//! from TOML, covering every row documented in the external-interfaces
//! configuration table. Every field is optional at the TOML level and falls
//! back to the documented default via `#[serde(default = ...)]`.

use serde::Deserialize;

fn default_page_size() -> u32 {
    16384
}

fn default_buffer_hit_ratio() -> f64 {
    0.8
}

fn default_histogram_buckets() -> usize {
    64
}

fn default_stats_expiration_secs() -> u64 {
    24 * 3600
}

fn default_stats_update_interval_secs() -> u64 {
    3600
}

fn default_sample_rate() -> f64 {
    0.1
}

fn default_cancel_check_stride() -> u32 {
    1024
}

/// Engine-wide configuration. Deserializes from TOML with every option
/// optional; missing keys fall back to the documented default.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Row-size / page-count conversions.
    pub page_size: u32,
    /// Scales down I/O cost to account for buffer-pool hits.
    pub buffer_hit_ratio: f64,
    /// Column histogram resolution.
    pub histogram_buckets: usize,
    /// Statistics cache entry lifetime, in seconds.
    pub stats_expiration_secs: u64,
    /// Background statistics refresh period, in seconds.
    pub stats_update_interval_secs: u64,
    /// Fraction of rows sampled during statistics collection.
    pub sample_rate: f64,
    /// Rows between cancellation checks in long-running operators.
    pub cancel_check_stride: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            buffer_hit_ratio: default_buffer_hit_ratio(),
            histogram_buckets: default_histogram_buckets(),
            stats_expiration_secs: default_stats_expiration_secs(),
            stats_update_interval_secs: default_stats_update_interval_secs(),
            sample_rate: default_sample_rate(),
            cancel_check_stride: default_cancel_check_stride(),
        }
    }
}

impl EngineConfig {
    /// Parses an `EngineConfig` from TOML text, defaulting every field the
    /// document omits.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub(crate) fn stats_store_config(&self) -> cynos_stats::StatsStoreConfig {
        cynos_stats::StatsStoreConfig {
            expiration_secs: self.stats_expiration_secs,
            refresh_interval_secs: self.stats_update_interval_secs,
            update_queue_capacity: 256,
            histogram_buckets: self.histogram_buckets,
            sample_rate: self.sample_rate,
        }
    }

    pub(crate) fn cost_model(&self) -> cynos_stats::CostModel {
        cynos_stats::CostModel { buffer_hit_ratio: self.buffer_hit_ratio, page_size: self.page_size as u64, ..Default::default() }
    }
}
