//! Samples the in-memory catalog to feed `StatsStore`'s cache-miss path.
//!
//! This is the one concrete `StatsCollector` the workspace ships: a real
//! deployment would collect from the actual row source (disk pages, a
//! replica), but the core's storage contract is an in-memory stand-in (see
//! `cynos-storage`'s module doc comment), so collection here just samples
//! the same `RowStore` the executor scans.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use cynos_core::Value;
use cynos_stats::{ColumnStats, Histogram, IndexStats, StatsCollector, TableStats};
use cynos_storage::InMemoryCatalog;

fn now_unix() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// Collects statistics by sampling `catalog`'s tables directly. Held behind
/// an `Arc` so the engine and the store's background worker thread can
/// share the same catalog snapshot.
pub struct InMemoryStatsCollector {
    catalog: Arc<InMemoryCatalog>,
    sample_rate: f64,
    histogram_buckets: usize,
}

impl InMemoryStatsCollector {
    pub fn new(catalog: Arc<InMemoryCatalog>, sample_rate: f64, histogram_buckets: usize) -> Self {
        Self { catalog, sample_rate: sample_rate.clamp(0.0, 1.0), histogram_buckets }
    }

    /// Every `stride`th row is sampled, where `stride = round(1 / sample_rate)`,
    /// so a `sample_rate` of 0.1 takes roughly one row in ten.
    fn sample_stride(&self) -> usize {
        if self.sample_rate <= 0.0 {
            return usize::MAX;
        }
        ((1.0 / self.sample_rate).round() as usize).max(1)
    }
}

impl StatsCollector for InMemoryStatsCollector {
    fn collect_table(&self, table: &str) -> TableStats {
        let Ok(store) = self.catalog.row_store(table) else {
            return TableStats::new(0, 32, now_unix());
        };
        let row_count = store.len() as u64;
        let avg_row_size = store
            .schema()
            .columns()
            .iter()
            .map(|c| c.data_type().fixed_width().or(c.declared_max_length()).unwrap_or(32) as u64)
            .sum::<u64>()
            .max(1);
        TableStats::new(row_count, avg_row_size, now_unix())
    }

    fn collect_column(&self, table: &str, column: &str) -> ColumnStats {
        let Ok(store) = self.catalog.row_store(table) else {
            return ColumnStats::synthetic(0);
        };
        let Some(col_index) = store.schema().get_column_index(column) else {
            return ColumnStats::synthetic(store.len() as u64);
        };

        let stride = self.sample_stride();
        let mut not_null_count = 0u64;
        let mut null_count = 0u64;
        let mut sampled: Vec<Value> = Vec::new();
        for (i, row) in store.scan().enumerate() {
            let value = row.values()[col_index].clone();
            if value.is_null() {
                null_count += 1;
            } else {
                not_null_count += 1;
                if i % stride == 0 {
                    sampled.push(value);
                }
            }
        }

        let mut distinct: Vec<&Value> = sampled.iter().collect();
        distinct.sort();
        distinct.dedup();
        let distinct_count = distinct.len() as u64;
        let min_value = sampled.iter().min().cloned();
        let max_value = sampled.iter().max().cloned();
        let histogram = Histogram::build(sampled, self.histogram_buckets);

        ColumnStats { not_null_count, null_count, distinct_count, min_value, max_value, histogram, top_n: Vec::new() }
    }

    fn collect_index(&self, table: &str, index: &str) -> IndexStats {
        let row_count = self.collect_table(table).row_count;
        let Some(idx) = self.catalog.table(table).ok().and_then(|t| t.get_index(index).cloned()) else {
            return IndexStats::new(row_count, row_count, 1.0, 1);
        };
        let Some(leading) = idx.columns().first() else {
            return IndexStats::new(row_count, row_count, 1.0, 1);
        };
        let column_stats = self.collect_column(table, &leading.name);
        IndexStats::new(column_stats.distinct_count.max(1), row_count, 1.0, idx.columns().len())
    }
}
