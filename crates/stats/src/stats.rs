//! Table, column, and index statistics entities.

use crate::histogram::Histogram;
use cynos_core::Value;

/// Statistics for a table as a whole.
#[derive(Clone, Debug)]
pub struct TableStats {
    pub row_count: u64,
    pub total_size: u64,
    pub modify_count: u64,
    pub last_analyze_unix: u64,
}

impl TableStats {
    pub fn new(row_count: u64, avg_row_size: u64, last_analyze_unix: u64) -> Self {
        Self { row_count, total_size: row_count * avg_row_size, modify_count: 0, last_analyze_unix }
    }

    pub fn is_expired(&self, now_unix: u64, expiration_secs: u64) -> bool {
        now_unix.saturating_sub(self.last_analyze_unix) > expiration_secs
    }
}

/// A value/frequency pair in a column's most-frequent-values list.
#[derive(Clone, Debug)]
pub struct TopNEntry {
    pub value: Value,
    pub frequency: f64,
}

/// Statistics for a single column.
#[derive(Clone, Debug)]
pub struct ColumnStats {
    pub not_null_count: u64,
    pub null_count: u64,
    pub distinct_count: u64,
    pub min_value: Option<Value>,
    pub max_value: Option<Value>,
    pub histogram: Histogram,
    pub top_n: Vec<TopNEntry>,
}

impl ColumnStats {
    /// A conservative synthetic entry returned when sampling is impossible;
    /// collection never fails the query.
    pub fn synthetic(row_count: u64) -> Self {
        Self {
            not_null_count: row_count,
            null_count: 0,
            distinct_count: 0,
            min_value: None,
            max_value: None,
            histogram: Histogram::empty(),
            top_n: Vec::new(),
        }
    }

    pub fn check_invariants(&self, table_row_count: u64) -> bool {
        self.not_null_count + self.null_count == table_row_count
    }

    /// Equality selectivity: `1 / distinctCount`, falling back to a default
    /// when distinctness is unknown (synthetic stats).
    pub fn selectivity_eq(&self) -> f64 {
        if self.distinct_count == 0 {
            0.1
        } else {
            1.0 / self.distinct_count as f64
        }
    }

    pub fn selectivity_range(&self, low: &Value, high: &Value) -> f64 {
        self.histogram.selectivity_range(low, high)
    }
}

/// Statistics for a single index.
#[derive(Clone, Debug)]
pub struct IndexStats {
    pub cardinality: u64,
    pub cluster_factor: f64,
    pub prefix_length: usize,
    pub selectivity: f64,
}

impl IndexStats {
    pub fn new(cardinality: u64, table_row_count: u64, cluster_factor: f64, prefix_length: usize) -> Self {
        let selectivity = if table_row_count == 0 { 1.0 } else { cardinality as f64 / table_row_count as f64 };
        Self { cardinality, cluster_factor, prefix_length, selectivity: selectivity.clamp(0.0, 1.0) }
    }
}
