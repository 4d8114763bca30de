//! Cost model: pure parameterized cost functions with no state of their own.
//!
//! Tuned defaults are illustrative, not measured; callers are expected to
//! override them from `EngineConfig` when real hardware numbers are known.

/// Tunable cost-model parameters.
#[derive(Clone, Copy, Debug)]
pub struct CostModel {
    pub disk_seek: f64,
    pub disk_read_per_page: f64,
    pub disk_write_per_page: f64,
    pub cpu_operator_per_call: f64,
    pub cpu_tuple_per_row: f64,
    pub cpu_index_per_lookup: f64,
    pub cpu_eval_per_expr: f64,
    pub mem_tuple: f64,
    pub mem_hash: f64,
    pub mem_sort: f64,
    pub buffer_hit_ratio: f64,
    pub page_size: u64,
    /// Default selectivity used for LIKE patterns that are not a bare
    /// prefix match (no histogram available to estimate from). Exposed as
    /// a parameter rather than hardcoded, per the ambiguity this crate
    /// resolves.
    pub like_default_selectivity: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            disk_seek: 10.0,
            disk_read_per_page: 1.0,
            disk_write_per_page: 2.0,
            cpu_operator_per_call: 0.1,
            cpu_tuple_per_row: 0.01,
            cpu_index_per_lookup: 0.05,
            cpu_eval_per_expr: 0.02,
            mem_tuple: 1.0,
            mem_hash: 1.5,
            mem_sort: 1.2,
            buffer_hit_ratio: 0.8,
            page_size: 16384,
            like_default_selectivity: 0.3,
        }
    }
}

impl CostModel {
    pub fn pages_for(&self, row_count: u64, avg_row_size: u64) -> u64 {
        if avg_row_size == 0 || row_count == 0 {
            return 0;
        }
        let bytes = row_count * avg_row_size;
        (bytes + self.page_size - 1) / self.page_size
    }

    /// I/O cost of reading `pages` pages, scaled down by the buffer hit
    /// ratio and with one seek charged for starting the scan.
    pub fn io_cost_for_pages(&self, pages: u64) -> f64 {
        pages as f64 * self.disk_read_per_page * (1.0 - self.buffer_hit_ratio) + self.disk_seek
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_for() {
        let model = CostModel::default();
        assert_eq!(model.pages_for(0, 100), 0);
        assert_eq!(model.pages_for(1000, 100), (1000 * 100 + model.page_size - 1) / model.page_size);
    }

    #[test]
    fn test_io_cost_includes_seek() {
        let model = CostModel::default();
        assert!(model.io_cost_for_pages(0) >= model.disk_seek);
    }
}
