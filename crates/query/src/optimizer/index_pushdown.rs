//! Index pushdown optimization pass.
//!
//! Analyzes predicates against every index available on the scanned table and
//! scores each candidate, rather than stopping at the first index that covers
//! a leading column. A candidate's score rewards selectivity (from the
//! per-column statistics in the execution context), the number of leading
//! columns it can satisfy, whether it covers every column the rest of the
//! query still needs, and uniqueness/primary-key status; it is penalized by
//! an estimated cost term. Ties favor, in order, a covering index, then the
//! primary index, then a unique index, then the longer key prefix.

use crate::ast::{BinaryOp, Expr};
use crate::context::{ExecutionContext, IndexInfo};
use crate::optimizer::OptimizerPass;
use crate::planner::LogicalPlan;
use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;
use cynos_core::Value;
use cynos_stats::{ColumnStats, CostEstimator};

/// Index pushdown optimization.
///
/// Converts `Filter(Scan)` patterns into `IndexGet`/`IndexInGet`/`IndexScan`
/// when the filter predicate can be satisfied by an index on the table,
/// scoring every index the table has rather than taking the first match.
pub struct IndexPushdown {
    context: Option<ExecutionContext>,
}

impl Default for IndexPushdown {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexPushdown {
    /// Creates a pass with no context; acts as a no-op since no index
    /// information is available.
    pub fn new() -> Self {
        Self { context: None }
    }

    /// Creates a pass backed by the given execution context.
    pub fn with_context(context: ExecutionContext) -> Self {
        Self {
            context: Some(context),
        }
    }
}

impl OptimizerPass for IndexPushdown {
    fn optimize(&self, plan: LogicalPlan) -> LogicalPlan {
        let required = collect_required_columns(&plan);
        self.rewrite(plan, &required)
    }

    fn name(&self) -> &'static str {
        "index_pushdown"
    }
}

/// Information extracted from a simple predicate for index scoring.
#[derive(Debug, Clone)]
struct PredicateInfo {
    column: String,
    op: BinaryOp,
    value: Value,
}

/// Merged range bounds for a single column.
#[derive(Debug, Clone)]
struct MergedRange {
    lower_bound: Option<Value>,
    lower_inclusive: bool,
    upper_bound: Option<Value>,
    upper_inclusive: bool,
}

impl MergedRange {
    fn new() -> Self {
        Self {
            lower_bound: None,
            lower_inclusive: true,
            upper_bound: None,
            upper_inclusive: true,
        }
    }

    fn update_lower(&mut self, value: Value, inclusive: bool) {
        match &self.lower_bound {
            None => {
                self.lower_bound = Some(value);
                self.lower_inclusive = inclusive;
            }
            Some(existing) => {
                use core::cmp::Ordering;
                match value.cmp(existing) {
                    Ordering::Greater => {
                        self.lower_bound = Some(value);
                        self.lower_inclusive = inclusive;
                    }
                    Ordering::Equal => {
                        if !inclusive {
                            self.lower_inclusive = false;
                        }
                    }
                    Ordering::Less => {}
                }
            }
        }
    }

    fn update_upper(&mut self, value: Value, inclusive: bool) {
        match &self.upper_bound {
            None => {
                self.upper_bound = Some(value);
                self.upper_inclusive = inclusive;
            }
            Some(existing) => {
                use core::cmp::Ordering;
                match value.cmp(existing) {
                    Ordering::Less => {
                        self.upper_bound = Some(value);
                        self.upper_inclusive = inclusive;
                    }
                    Ordering::Equal => {
                        if !inclusive {
                            self.upper_inclusive = false;
                        }
                    }
                    Ordering::Greater => {}
                }
            }
        }
    }

    fn to_range_params(self) -> (Option<Value>, Option<Value>, bool, bool) {
        (
            self.lower_bound,
            self.upper_bound,
            self.lower_inclusive,
            self.upper_inclusive,
        )
    }

    fn has_bound(&self) -> bool {
        self.lower_bound.is_some() || self.upper_bound.is_some()
    }
}

/// A scored candidate: the index, the plan it produces, the predicates left
/// over once this index is used, and the facts the scoring formula and its
/// tie-break need kept around rather than recomputed.
struct Candidate {
    index: IndexInfo,
    score: f64,
    covering: bool,
    key_len: usize,
    /// The logical plan this candidate produces.
    plan: LogicalPlan,
    /// Predicates not covered by this candidate, to be wrapped in a Filter.
    remaining: Vec<Expr>,
}

impl IndexPushdown {
    fn rewrite(&self, plan: LogicalPlan, required: &BTreeMap<String, BTreeSet<String>>) -> LogicalPlan {
        match plan {
            LogicalPlan::Filter { input, predicate } => {
                let optimized_input = self.rewrite(*input, required);

                if let LogicalPlan::Scan { ref table } = optimized_input {
                    let empty = BTreeSet::new();
                    let required_columns = required.get(table).unwrap_or(&empty);
                    if let Some(best) = self.best_candidate(table, &predicate, required_columns) {
                        return self.wrap_with_filter_if_needed(best.plan, best.remaining);
                    }
                }

                LogicalPlan::Filter {
                    input: Box::new(optimized_input),
                    predicate,
                }
            }

            LogicalPlan::Project { input, columns } => LogicalPlan::Project {
                input: Box::new(self.rewrite(*input, required)),
                columns,
            },

            LogicalPlan::Join {
                left,
                right,
                condition,
                join_type,
            } => LogicalPlan::Join {
                left: Box::new(self.rewrite(*left, required)),
                right: Box::new(self.rewrite(*right, required)),
                condition,
                join_type,
            },

            LogicalPlan::Aggregate {
                input,
                group_by,
                aggregates,
            } => LogicalPlan::Aggregate {
                input: Box::new(self.rewrite(*input, required)),
                group_by,
                aggregates,
            },

            LogicalPlan::Sort { input, order_by } => LogicalPlan::Sort {
                input: Box::new(self.rewrite(*input, required)),
                order_by,
            },

            LogicalPlan::Limit {
                input,
                limit,
                offset,
            } => LogicalPlan::Limit {
                input: Box::new(self.rewrite(*input, required)),
                limit,
                offset,
            },

            LogicalPlan::CrossProduct { left, right } => LogicalPlan::CrossProduct {
                left: Box::new(self.rewrite(*left, required)),
                right: Box::new(self.rewrite(*right, required)),
            },

            LogicalPlan::Union { left, right, all } => LogicalPlan::Union {
                left: Box::new(self.rewrite(*left, required)),
                right: Box::new(self.rewrite(*right, required)),
                all,
            },

            LogicalPlan::Scan { .. }
            | LogicalPlan::IndexScan { .. }
            | LogicalPlan::IndexGet { .. }
            | LogicalPlan::IndexInGet { .. }
            | LogicalPlan::Empty => plan,
        }
    }

    /// Scores every index on `table` against `predicate` and returns the plan
    /// for the highest-scoring candidate, if any index can be used at all.
    fn best_candidate(&self, table: &str, predicate: &Expr, required: &BTreeSet<String>) -> Option<Candidate> {
        let ctx = self.context.as_ref()?;

        if let Some(in_col) = self.analyze_in_predicate(predicate) {
            if let Some(index) = ctx.find_index(table, &[in_col.0.as_str()]) {
                let index = index.clone();
                let selectivity = self.in_list_selectivity(ctx, table, &in_col.0, in_col.1.len());
                let covering = is_covering(&index, required);
                let score = score_candidate(ctx, table, &index, selectivity, 1, covering);
                return Some(Candidate {
                    score,
                    covering,
                    key_len: 1,
                    plan: LogicalPlan::IndexInGet {
                        table: table.into(),
                        index: index.name.clone(),
                        keys: in_col.1,
                    },
                    index,
                    remaining: Vec::new(),
                });
            }
        }

        let (simple, remaining) = self.extract_and_remaining(predicate);
        if simple.is_empty() {
            return None;
        }

        let mut best: Option<Candidate> = None;
        for index in ctx.indexes(table) {
            if let Some(candidate) = self.score_index(ctx, table, index, &simple, &remaining, required) {
                let better = match &best {
                    None => true,
                    Some(current) => is_better(&candidate, current),
                };
                if better {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn in_list_selectivity(&self, ctx: &ExecutionContext, table: &str, column: &str, value_count: usize) -> f64 {
        match ctx.column_stats(table, column) {
            Some(stats) => CostEstimator::in_list_selectivity(stats, value_count),
            None => CostEstimator::in_list_selectivity(&ColumnStats::synthetic(ctx.row_count(table) as u64), value_count),
        }
    }

    /// Scores a single index against the set of simple AND-decomposed
    /// predicates, matching leading index columns to equality predicates
    /// first, then a single trailing range predicate.
    fn score_index(
        &self,
        ctx: &ExecutionContext,
        table: &str,
        index: &IndexInfo,
        simple: &[(Expr, PredicateInfo)],
        outer_remaining: &[Expr],
        required: &BTreeSet<String>,
    ) -> Option<Candidate> {
        let mut used: Vec<usize> = Vec::new();
        let mut eq_values: Vec<Value> = Vec::new();
        let mut eq_columns: Vec<String> = Vec::new();

        for col in &index.columns {
            let found = simple.iter().enumerate().find(|(i, (_, info))| {
                !used.contains(i) && info.column == *col && info.op == BinaryOp::Eq
            });
            match found {
                Some((i, (_, info))) => {
                    used.push(i);
                    eq_values.push(info.value.clone());
                    eq_columns.push(info.column.clone());
                }
                None => break,
            }
        }

        if eq_values.is_empty() {
            // No leading equality; fall back to a single range/eq predicate
            // on the index's first column only.
            return self.score_range_only(ctx, table, index, simple, outer_remaining, required);
        }

        let eq_selectivity: f64 = eq_columns
            .iter()
            .map(|col| self.eq_selectivity(ctx, table, col))
            .product();

        // Full key matched by equality: point lookup.
        if eq_values.len() == index.columns.len() {
            let key = if eq_values.len() == 1 {
                eq_values.into_iter().next().unwrap()
            } else {
                return None; // composite point lookups need tuple keys, not yet supported
            };
            let mut remaining = outer_remaining.to_vec();
            for (j, (expr, _)) in simple.iter().enumerate() {
                if !used.contains(&j) {
                    remaining.push(expr.clone());
                }
            }
            let covering = is_covering(index, required);
            let key_len = used.len();
            let score = score_candidate(ctx, table, index, eq_selectivity, key_len, covering);
            return Some(Candidate {
                index: index.clone(),
                score,
                covering,
                key_len,
                plan: LogicalPlan::IndexGet {
                    table: table.into(),
                    index: index.name.clone(),
                    key,
                },
                remaining,
            });
        }

        // Partial equality prefix; try to extend with a range bound on the
        // next column.
        let next_col = &index.columns[eq_values.len()];
        let mut merged = MergedRange::new();
        let mut range_used: Vec<usize> = Vec::new();
        for (i, (_, info)) in simple.iter().enumerate() {
            if used.contains(&i) || info.column != *next_col {
                continue;
            }
            match info.op {
                BinaryOp::Gt => {
                    merged.update_lower(info.value.clone(), false);
                    range_used.push(i);
                }
                BinaryOp::Ge => {
                    merged.update_lower(info.value.clone(), true);
                    range_used.push(i);
                }
                BinaryOp::Lt => {
                    merged.update_upper(info.value.clone(), false);
                    range_used.push(i);
                }
                BinaryOp::Le => {
                    merged.update_upper(info.value.clone(), true);
                    range_used.push(i);
                }
                _ => {}
            }
        }
        used.extend(&range_used);

        let mut remaining = outer_remaining.to_vec();
        for (j, (expr, _)) in simple.iter().enumerate() {
            if !used.contains(&j) {
                remaining.push(expr.clone());
            }
        }

        if eq_values.len() == 1 && !merged.has_bound() {
            // Single equality column with no further index columns usable:
            // treat as an equality range scan (still selective).
            let key = eq_values[0].clone();
            let covering = is_covering(index, required);
            let key_len = used.len();
            let score = score_candidate(ctx, table, index, eq_selectivity, key_len, covering);
            return Some(Candidate {
                index: index.clone(),
                score,
                covering,
                key_len,
                plan: LogicalPlan::IndexScan {
                    table: table.into(),
                    index: index.name.clone(),
                    range_start: Some(key.clone()),
                    range_end: Some(key),
                    include_start: true,
                    include_end: true,
                },
                remaining,
            });
        }

        let range_selectivity = if range_used.is_empty() {
            1.0
        } else {
            self.range_selectivity(ctx, table, next_col, merged.lower_bound.as_ref(), merged.upper_bound.as_ref())
        };
        let selectivity = eq_selectivity * range_selectivity;
        let covering = is_covering(index, required);
        let key_len = used.len();
        let score = score_candidate(ctx, table, index, selectivity, key_len, covering);
        let (range_start, range_end, include_start, include_end) = merged.to_range_params();
        Some(Candidate {
            index: index.clone(),
            score,
            covering,
            key_len,
            plan: LogicalPlan::IndexScan {
                table: table.into(),
                index: index.name.clone(),
                range_start,
                range_end,
                include_start,
                include_end,
            },
            remaining,
        })
    }

    /// Scores an index whose first column has no equality predicate but does
    /// have range predicates (e.g. `age > 18 AND age < 65`).
    fn score_range_only(
        &self,
        ctx: &ExecutionContext,
        table: &str,
        index: &IndexInfo,
        simple: &[(Expr, PredicateInfo)],
        outer_remaining: &[Expr],
        required: &BTreeSet<String>,
    ) -> Option<Candidate> {
        let first_col = index.columns.first()?;
        let mut merged = MergedRange::new();
        let mut used: Vec<usize> = Vec::new();
        for (i, (_, info)) in simple.iter().enumerate() {
            if info.column != *first_col {
                continue;
            }
            match info.op {
                BinaryOp::Gt => {
                    merged.update_lower(info.value.clone(), false);
                    used.push(i);
                }
                BinaryOp::Ge => {
                    merged.update_lower(info.value.clone(), true);
                    used.push(i);
                }
                BinaryOp::Lt => {
                    merged.update_upper(info.value.clone(), false);
                    used.push(i);
                }
                BinaryOp::Le => {
                    merged.update_upper(info.value.clone(), true);
                    used.push(i);
                }
                _ => {}
            }
        }

        if used.is_empty() {
            return None;
        }

        let mut remaining = outer_remaining.to_vec();
        for (j, (expr, _)) in simple.iter().enumerate() {
            if !used.contains(&j) {
                remaining.push(expr.clone());
            }
        }

        let selectivity = self.range_selectivity(ctx, table, first_col, merged.lower_bound.as_ref(), merged.upper_bound.as_ref());
        let covering = is_covering(index, required);
        let key_len = 1;
        let score = score_candidate(ctx, table, index, selectivity, key_len, covering);
        let (range_start, range_end, include_start, include_end) = merged.to_range_params();
        Some(Candidate {
            index: index.clone(),
            score,
            covering,
            key_len,
            plan: LogicalPlan::IndexScan {
                table: table.into(),
                index: index.name.clone(),
                range_start,
                range_end,
                include_start,
                include_end,
            },
            remaining,
        })
    }

    /// Equality selectivity for one column: `1 / distinctCount`, default 0.1
    /// when the column has no statistics registered.
    fn eq_selectivity(&self, ctx: &ExecutionContext, table: &str, column: &str) -> f64 {
        ctx.column_stats(table, column).map(|s| s.selectivity_eq()).unwrap_or(0.1)
    }

    /// Range selectivity for one column: a histogram lookup when both bounds
    /// (or a bound plus the column's known min/max) are available, 0.3
    /// otherwise.
    fn range_selectivity(&self, ctx: &ExecutionContext, table: &str, column: &str, lower: Option<&Value>, upper: Option<&Value>) -> f64 {
        let Some(stats) = ctx.column_stats(table, column) else { return 0.3 };
        match (lower, upper) {
            (Some(lo), Some(hi)) => stats.selectivity_range(lo, hi),
            (Some(lo), None) => match &stats.max_value {
                Some(hi) => stats.selectivity_range(lo, hi),
                None => 0.3,
            },
            (None, Some(hi)) => match &stats.min_value {
                Some(lo) => stats.selectivity_range(lo, hi),
                None => 0.3,
            },
            (None, None) => 0.3,
        }
    }

    fn wrap_with_filter_if_needed(&self, index_plan: LogicalPlan, remaining: Vec<Expr>) -> LogicalPlan {
        if remaining.is_empty() {
            index_plan
        } else {
            let combined = remaining
                .into_iter()
                .reduce(|acc, pred| Expr::and(acc, pred))
                .unwrap();
            LogicalPlan::Filter {
                input: Box::new(index_plan),
                predicate: combined,
            }
        }
    }

    /// Decomposes an AND predicate into simple comparison predicates plus
    /// whatever doesn't decompose (function calls, OR, etc.).
    fn extract_and_remaining(&self, predicate: &Expr) -> (Vec<(Expr, PredicateInfo)>, Vec<Expr>) {
        let mut simple = Vec::new();
        let mut remaining = Vec::new();
        self.extract_and_remaining_recursive(predicate, &mut simple, &mut remaining);
        (simple, remaining)
    }

    fn extract_and_remaining_recursive(
        &self,
        predicate: &Expr,
        simple: &mut Vec<(Expr, PredicateInfo)>,
        remaining: &mut Vec<Expr>,
    ) {
        match predicate {
            Expr::BinaryOp {
                left,
                op: BinaryOp::And,
                right,
            } => {
                self.extract_and_remaining_recursive(left, simple, remaining);
                self.extract_and_remaining_recursive(right, simple, remaining);
            }
            _ => {
                if let Some(info) = self.analyze_predicate(predicate) {
                    simple.push((predicate.clone(), info));
                } else {
                    remaining.push(predicate.clone());
                }
            }
        }
    }

    fn analyze_predicate(&self, predicate: &Expr) -> Option<PredicateInfo> {
        if let Expr::BinaryOp { left, op, right } = predicate {
            if let (Expr::Column(col), Expr::Literal(val)) = (left.as_ref(), right.as_ref()) {
                if matches!(
                    op,
                    BinaryOp::Eq | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
                ) {
                    return Some(PredicateInfo {
                        column: col.column.clone(),
                        op: *op,
                        value: val.clone(),
                    });
                }
            }
            if let (Expr::Literal(val), Expr::Column(col)) = (left.as_ref(), right.as_ref()) {
                let reversed = match op {
                    BinaryOp::Lt => BinaryOp::Gt,
                    BinaryOp::Le => BinaryOp::Ge,
                    BinaryOp::Gt => BinaryOp::Lt,
                    BinaryOp::Ge => BinaryOp::Le,
                    other => *other,
                };
                if matches!(
                    reversed,
                    BinaryOp::Eq | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
                ) {
                    return Some(PredicateInfo {
                        column: col.column.clone(),
                        op: reversed,
                        value: val.clone(),
                    });
                }
            }
        }
        None
    }

    fn analyze_in_predicate(&self, predicate: &Expr) -> Option<(String, Vec<Value>)> {
        if let Expr::In { expr, list } = predicate {
            if let Expr::Column(col) = expr.as_ref() {
                let values: Vec<Value> = list
                    .iter()
                    .filter_map(|item| match item {
                        Expr::Literal(v) => Some(v.clone()),
                        _ => None,
                    })
                    .collect();
                if values.len() == list.len() && !values.is_empty() {
                    return Some((col.column.clone(), values));
                }
            }
        }
        None
    }
}

/// Whether `index` covers every column still required from the table after
/// this scan, i.e. a downstream node never needs to fall back to the row
/// fetch `RowSource::lookup_by_primary` performs for a plain index hit.
/// `required` enumerates every column referenced anywhere above this scan in
/// the plan (`SELECT *` has already been expanded to explicit columns by the
/// time this pass runs, so it never trivially covers unless every table
/// column happens to be in the index).
fn is_covering(index: &IndexInfo, required: &BTreeSet<String>) -> bool {
    !required.is_empty() && required.iter().all(|col| index.columns.iter().any(|c| c == col))
}

/// `score = selectivity*100 + keyLen*10 + (covering?50:0) + (unique?20:0) +
/// (primary?30:0) - cost/100`, where `cost` penalizes scanning and
/// revisiting rows proportional to the table's size and this candidate's
/// selectivity, waived for the revisit term when the index is covering.
fn score_candidate(ctx: &ExecutionContext, table: &str, index: &IndexInfo, selectivity: f64, key_len: usize, covering: bool) -> f64 {
    let selectivity = selectivity.clamp(0.0, 1.0);
    let base_cost = (ctx.row_count(table) as f64).max(1.0);
    let cost = base_cost * (1.0 - selectivity) * 0.1 + if covering { 0.0 } else { base_cost * selectivity * 0.5 };

    selectivity * 100.0
        + key_len as f64 * 10.0
        + if covering { 50.0 } else { 0.0 }
        + if index.is_unique { 20.0 } else { 0.0 }
        + if index.is_primary { 30.0 } else { 0.0 }
        - cost / 100.0
}

/// Tie-break order: higher score wins; on equal scores, prefer covering,
/// then primary, then unique, then the longer key prefix.
fn is_better(candidate: &Candidate, current: &Candidate) -> bool {
    if candidate.score != current.score {
        return candidate.score > current.score;
    }
    if candidate.covering != current.covering {
        return candidate.covering;
    }
    if candidate.index.is_primary != current.index.is_primary {
        return candidate.index.is_primary;
    }
    if candidate.index.is_unique != current.index.is_unique {
        return candidate.index.is_unique;
    }
    candidate.key_len > current.key_len
}

/// Every column referenced anywhere in `plan`, grouped by the table (or
/// alias) it is qualified with. Used to decide whether an index candidate
/// covers the rest of the query.
fn collect_required_columns(plan: &LogicalPlan) -> BTreeMap<String, BTreeSet<String>> {
    let mut required = BTreeMap::new();
    collect_required_columns_recursive(plan, &mut required);
    required
}

fn collect_required_columns_recursive(plan: &LogicalPlan, out: &mut BTreeMap<String, BTreeSet<String>>) {
    match plan {
        LogicalPlan::Scan { .. }
        | LogicalPlan::IndexScan { .. }
        | LogicalPlan::IndexGet { .. }
        | LogicalPlan::IndexInGet { .. }
        | LogicalPlan::Empty => {}

        LogicalPlan::Filter { input, predicate } => {
            collect_expr_columns(predicate, out);
            collect_required_columns_recursive(input, out);
        }

        LogicalPlan::Project { input, columns } => {
            for column in columns {
                collect_expr_columns(column, out);
            }
            collect_required_columns_recursive(input, out);
        }

        LogicalPlan::Join { left, right, condition, .. } => {
            collect_expr_columns(condition, out);
            collect_required_columns_recursive(left, out);
            collect_required_columns_recursive(right, out);
        }

        LogicalPlan::Aggregate { input, group_by, aggregates } => {
            for expr in group_by {
                collect_expr_columns(expr, out);
            }
            for (_, expr) in aggregates {
                collect_expr_columns(expr, out);
            }
            collect_required_columns_recursive(input, out);
        }

        LogicalPlan::Sort { input, order_by } => {
            for (expr, _) in order_by {
                collect_expr_columns(expr, out);
            }
            collect_required_columns_recursive(input, out);
        }

        LogicalPlan::Limit { input, .. } => collect_required_columns_recursive(input, out),

        LogicalPlan::CrossProduct { left, right } | LogicalPlan::Union { left, right, .. } => {
            collect_required_columns_recursive(left, out);
            collect_required_columns_recursive(right, out);
        }
    }
}

fn collect_expr_columns(expr: &Expr, out: &mut BTreeMap<String, BTreeSet<String>>) {
    match expr {
        Expr::Column(col) => {
            out.entry(col.table.clone()).or_default().insert(col.column.clone());
        }
        Expr::Literal(_) => {}
        Expr::BinaryOp { left, right, .. } => {
            collect_expr_columns(left, out);
            collect_expr_columns(right, out);
        }
        Expr::UnaryOp { expr, .. } => collect_expr_columns(expr, out),
        Expr::Function { args, .. } => {
            for arg in args {
                collect_expr_columns(arg, out);
            }
        }
        Expr::Aggregate { expr, .. } => {
            if let Some(expr) = expr {
                collect_expr_columns(expr, out);
            }
        }
        Expr::Between { expr, low, high } | Expr::NotBetween { expr, low, high } => {
            collect_expr_columns(expr, out);
            collect_expr_columns(low, out);
            collect_expr_columns(high, out);
        }
        Expr::In { expr, list } | Expr::NotIn { expr, list } => {
            collect_expr_columns(expr, out);
            for item in list {
                collect_expr_columns(item, out);
            }
        }
        Expr::Like { expr, .. } | Expr::NotLike { expr, .. } | Expr::Match { expr, .. } | Expr::NotMatch { expr, .. } => {
            collect_expr_columns(expr, out);
        }
    }
}
