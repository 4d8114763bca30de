//! Cost estimator (C4): produces a `CostEstimate` for each access path and
//! plan operator the planner considers.

use crate::cost_model::CostModel;
use crate::stats::{ColumnStats, IndexStats, TableStats};

/// The output of the cost estimator for one candidate plan node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostEstimate {
    pub io_cost: f64,
    pub cpu_cost: f64,
    pub total_cost: f64,
    pub out_rows: f64,
    pub selectivity: f64,
}

impl CostEstimate {
    fn new(io_cost: f64, cpu_cost: f64, out_rows: f64, selectivity: f64) -> Self {
        Self { io_cost, cpu_cost, total_cost: io_cost + cpu_cost, out_rows, selectivity }
    }
}

/// Pure functions turning `(stats, cost model)` into `CostEstimate`s. Holds
/// no state of its own; every method takes the model and stats it needs.
pub struct CostEstimator;

impl CostEstimator {
    pub fn table_scan(model: &CostModel, table: &TableStats, avg_row_size: u64, selectivity: f64) -> CostEstimate {
        let pages = model.pages_for(table.row_count, avg_row_size);
        let io = model.io_cost_for_pages(pages);
        let cpu = table.row_count as f64 * model.cpu_tuple_per_row;
        let out_rows = table.row_count as f64 * selectivity;
        CostEstimate::new(io, cpu, out_rows, selectivity)
    }

    /// `condition_count` is the number of pushable WHERE conjuncts matched
    /// against this index's leading columns; each additional condition adds
    /// a 10% seek-cost surcharge to account for more precise but still
    /// nontrivial key navigation.
    pub fn index_scan(
        model: &CostModel,
        table: &TableStats,
        index: &IndexStats,
        selectivity: f64,
        condition_count: usize,
        covering: bool,
    ) -> CostEstimate {
        let effective_selectivity = selectivity.max(0.01);
        let amplification = 1.0 + 0.1 * condition_count as f64;
        let seek_cost = model.disk_seek * amplification * effective_selectivity;
        let lookup_cost = if covering {
            0.0
        } else {
            table.row_count as f64 * effective_selectivity * model.disk_seek * 0.1
        };
        let io = seek_cost + lookup_cost;
        let cpu = table.row_count as f64 * effective_selectivity * model.cpu_index_per_lookup;
        let out_rows = table.row_count as f64 * effective_selectivity;
        let _ = index.cluster_factor;
        CostEstimate::new(io, cpu, out_rows, effective_selectivity)
    }

    pub fn sort(model: &CostModel, in_rows: f64) -> CostEstimate {
        let cpu = if in_rows > 1.0 { in_rows * in_rows.log2() * model.cpu_tuple_per_row } else { 0.0 };
        CostEstimate::new(0.0, cpu, in_rows, 1.0)
    }

    /// `group_by_count` is the number of grouping columns; cardinality of
    /// the grouping is approximated as `inRows * 0.5^groupByCount`, clamped
    /// to `[1, inRows]`.
    pub fn aggregate(model: &CostModel, in_rows: f64, group_by_count: usize, agg_count: usize) -> CostEstimate {
        let group_count = if group_by_count == 0 {
            1.0
        } else {
            (in_rows * 0.5f64.powi(group_by_count as i32)).clamp(1.0, in_rows.max(1.0))
        };
        let cpu = in_rows * agg_count.max(1) as f64 * model.cpu_operator_per_call + group_count * model.mem_tuple;
        CostEstimate::new(0.0, cpu, group_count, 1.0)
    }

    pub fn nested_loop_join(model: &CostModel, outer_rows: f64, inner_rows: f64, inner_cost: f64) -> CostEstimate {
        let cpu = outer_rows * (inner_rows * model.cpu_tuple_per_row + inner_cost);
        let out_rows = outer_rows * inner_rows * 0.1;
        CostEstimate::new(0.0, cpu, out_rows, 0.1)
    }

    pub fn hash_join(model: &CostModel, build_rows: f64, probe_rows: f64) -> CostEstimate {
        let cpu = build_rows * model.cpu_operator_per_call + probe_rows * model.cpu_tuple_per_row;
        let out_rows = probe_rows.min(build_rows.max(1.0)) * 0.5;
        CostEstimate::new(0.0, cpu, out_rows, 0.5)
    }

    pub fn sort_merge_join(model: &CostModel, left_rows: f64, right_rows: f64, left_sorted: bool, right_sorted: bool) -> CostEstimate {
        let sort_cost = |rows: f64, sorted: bool| if sorted { 0.0 } else { Self::sort(model, rows).cpu_cost };
        let cpu = sort_cost(left_rows, left_sorted) + sort_cost(right_rows, right_sorted) + (left_rows + right_rows) * model.cpu_tuple_per_row;
        let out_rows = left_rows.min(right_rows).max(1.0) * 0.5;
        CostEstimate::new(0.0, cpu, out_rows, 0.5)
    }

    /// Estimates average row size (bytes) from the declared column widths.
    pub fn avg_row_size(column_widths: &[u32]) -> u64 {
        const ROW_HEADER: u64 = 20;
        ROW_HEADER + column_widths.iter().map(|w| *w as u64).sum::<u64>()
    }

    /// Chooses a per-condition selectivity estimator: equality uses
    /// `ColumnStats::selectivity_eq`, ranges consult the histogram, `IN`
    /// multiplies equality selectivity by the value count (capped at 1.0).
    pub fn in_list_selectivity(column: &ColumnStats, value_count: usize) -> f64 {
        (column.selectivity_eq() * value_count as f64).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::Histogram;

    fn table(rows: u64) -> TableStats {
        TableStats::new(rows, 64, 0)
    }

    #[test]
    fn test_table_scan_cost_scales_with_rows() {
        let model = CostModel::default();
        let small = CostEstimator::table_scan(&model, &table(100), 64, 1.0);
        let large = CostEstimator::table_scan(&model, &table(100_000), 64, 1.0);
        assert!(large.total_cost > small.total_cost);
    }

    #[test]
    fn test_index_scan_cheaper_than_table_scan_for_selective_query() {
        let model = CostModel::default();
        let t = table(100_000);
        let idx = IndexStats::new(100_000, 100_000, 1.0, 1);
        let scan = CostEstimator::table_scan(&model, &t, 64, 1.0);
        let index_scan = CostEstimator::index_scan(&model, &t, &idx, 0.00001, 1, false);
        assert!(index_scan.total_cost < scan.total_cost);
    }

    #[test]
    fn test_covering_index_scan_has_no_lookup_cost() {
        let model = CostModel::default();
        let t = table(10_000);
        let idx = IndexStats::new(10_000, 10_000, 1.0, 1);
        let covering = CostEstimator::index_scan(&model, &t, &idx, 0.1, 1, true);
        let non_covering = CostEstimator::index_scan(&model, &t, &idx, 0.1, 1, false);
        assert!(covering.io_cost < non_covering.io_cost);
    }

    #[test]
    fn test_sort_cost_zero_for_single_row() {
        let model = CostModel::default();
        let est = CostEstimator::sort(&model, 1.0);
        assert_eq!(est.cpu_cost, 0.0);
    }

    #[test]
    fn test_aggregate_group_count_clamped() {
        let model = CostModel::default();
        let est = CostEstimator::aggregate(&model, 1000.0, 5, 2);
        assert!(est.out_rows >= 1.0);
        assert!(est.out_rows <= 1000.0);
    }

    #[test]
    fn test_total_cost_equals_io_plus_cpu() {
        let model = CostModel::default();
        let est = CostEstimator::table_scan(&model, &table(1000), 64, 0.5);
        assert_eq!(est.total_cost, est.io_cost + est.cpu_cost);
    }

    #[test]
    fn test_avg_row_size() {
        assert_eq!(CostEstimator::avg_row_size(&[4, 8]), 32);
    }

    #[test]
    fn test_in_list_selectivity_capped() {
        let column = ColumnStats { distinct_count: 10, ..ColumnStats::synthetic(100) };
        let sel = CostEstimator::in_list_selectivity(&column, 50);
        assert_eq!(sel, 1.0);
    }

    #[test]
    fn test_histogram_driven_range_selectivity_used_directly() {
        let values: Vec<cynos_core::Value> = (0..1000).map(cynos_core::Value::Int64).collect();
        let hist = Histogram::build(values, 16);
        let col = ColumnStats { histogram: hist, ..ColumnStats::synthetic(1000) };
        let sel = col.selectivity_range(&cynos_core::Value::Int64(0), &cynos_core::Value::Int64(100));
        assert!(sel > 0.0 && sel < 1.0);
    }
}
