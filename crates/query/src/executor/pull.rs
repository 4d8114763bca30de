//! Pull-model (`Init`/`Next`/`Row`/`Close`) execution over a [`PhysicalPlan`].
//!
//! This sits beside [`super::runner::PhysicalPlanRunner`], which produces a
//! fully materialized [`super::Relation`]. `PullExecutor` instead streams one
//! row at a time from the `Cursor`/`RowSource` storage contract, matching the
//! operator semantics a cost-based physical plan is built against: children
//! are driven one `next()` at a time, and only `Sort`/`HashAggregate` buffer
//! their entire input (the spec calls both of those blocking by nature).
//!
//! `build` covers every [`PhysicalPlan`] variant: `TopN` composes the
//! existing `Sort`+`Limit` operators, and `SortMergeJoin`/`NestedLoopJoin`/
//! `IndexNestedLoopJoin`/`CrossProduct` each have a dedicated operator below
//! alongside `HashJoin`.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use cynos_core::{CancelCheck, CancellationToken, Error, Result, Row, RowId, Value};
use cynos_storage::{Cursor, KeyRange, RowSource, ScanRequest, SchemaCatalog};

use crate::ast::{AggregateFunc, BinaryOp, Expr, SortOrder, UnaryOp};
use crate::executor::eval::{eval_binary_op, eval_function, eval_like, eval_regex_match, eval_unary_op, value_as_f64};
use crate::planner::PhysicalPlan;

/// A pull-model query operator: `Init` once, then `Next`/`Row` in a loop,
/// then `Close`. `Close` must be safe to call more than once and must always
/// release child operators, even after an error.
pub trait PullOperator {
    /// Idempotent setup: acquire cursors, allocate buffers, maybe prefetch.
    fn init(&mut self) -> Result<()>;
    /// Advance to the next output row. Returns `false` on end of stream.
    fn next(&mut self) -> Result<bool>;
    /// The current tuple. Only valid immediately after a `next()` that
    /// returned `true`.
    fn row(&self) -> &Row;
    /// Release resources. Safe to call multiple times.
    fn close(&mut self) -> Result<()>;
}

/// Rows between cancellation checks when no caller-supplied stride is given
/// (the §6 configuration surface's `cancelCheckStride` default).
const DEFAULT_CANCEL_CHECK_STRIDE: u32 = 1024;

/// Builds and drives a pull-model operator tree for one [`PhysicalPlan`]
/// against a catalog that is both a [`SchemaCatalog`] and a [`RowSource`].
pub struct PullExecutor<'a, C: SchemaCatalog + RowSource> {
    catalog: &'a C,
    token: CancellationToken,
    cancel_check_stride: u32,
}

impl<'a, C: SchemaCatalog + RowSource> PullExecutor<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog, token: CancellationToken::new(), cancel_check_stride: DEFAULT_CANCEL_CHECK_STRIDE }
    }

    /// Builds an executor whose operator tree checks `token` cooperatively,
    /// at least every `cancel_check_stride` rows, and returns `Error::Canceled`
    /// once it fires.
    pub fn with_cancellation(catalog: &'a C, token: CancellationToken, cancel_check_stride: u32) -> Self {
        Self { catalog, token, cancel_check_stride }
    }

    /// Builds an operator tree for `plan` and pulls every row into a `Vec`.
    /// Convenience for callers (tests, the engine facade) that want a
    /// materialized result without driving `Init`/`Next`/`Close` by hand.
    pub fn collect(&self, plan: &PhysicalPlan) -> Result<Vec<Row>> {
        let mut op = self.build(plan)?;
        op.init()?;
        let mut check = CancelCheck::new(self.token.clone(), self.cancel_check_stride);
        let mut out = Vec::new();
        let result = loop {
            if check.tick() {
                break Err(Error::Canceled);
            }
            match op.next() {
                Ok(true) => out.push(op.row().clone()),
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        op.close()?;
        result.map(|()| out)
    }

    /// Builds the operator tree for `plan` without driving it.
    pub fn build(&self, plan: &PhysicalPlan) -> Result<Box<dyn PullOperator + 'a>> {
        match plan {
            PhysicalPlan::TableScan { table } => {
                Ok(Box::new(TableScanOp::new(self.catalog, table.clone())))
            }
            PhysicalPlan::IndexScan { table, index, range_start, range_end, include_start, include_end, limit, offset, reverse } => {
                let range = build_range(range_start.clone(), range_end.clone(), *include_start, *include_end);
                Ok(Box::new(IndexScanOp::new(
                    self.catalog,
                    table.clone(),
                    index.clone(),
                    range,
                    *reverse,
                    *limit,
                    offset.unwrap_or(0),
                )))
            }
            PhysicalPlan::IndexGet { table, index, key, limit } => {
                let range = Some(KeyRange::only(key.clone()));
                Ok(Box::new(IndexScanOp::new(self.catalog, table.clone(), index.clone(), range, false, *limit, 0)))
            }
            PhysicalPlan::IndexInGet { table, index, keys } => {
                Ok(Box::new(IndexInGetOp::new(self.catalog, table.clone(), index.clone(), keys.clone())))
            }
            PhysicalPlan::Filter { input, predicate } => {
                let child = self.build(input)?;
                Ok(Box::new(FilterOp::new(child, predicate.clone())))
            }
            PhysicalPlan::Project { input, columns } => {
                let child = self.build(input)?;
                Ok(Box::new(ProjectOp::new(child, columns.clone())))
            }
            PhysicalPlan::Sort { input, order_by } => {
                let child = self.build(input)?;
                let check = CancelCheck::new(self.token.clone(), self.cancel_check_stride);
                Ok(Box::new(SortOp::new(child, order_by.clone(), check)))
            }
            PhysicalPlan::HashAggregate { input, group_by, aggregates } => {
                let child = self.build(input)?;
                let check = CancelCheck::new(self.token.clone(), self.cancel_check_stride);
                Ok(Box::new(HashAggregateOp::new(child, group_by.clone(), aggregates.clone(), check)))
            }
            PhysicalPlan::HashJoin { left, right, condition, join_type } => {
                let right_width = plan_output_width(right, self.catalog)?;
                let left_op = self.build(left)?;
                let right_op = self.build(right)?;
                Ok(Box::new(HashJoinOp::new(left_op, right_op, right_width, condition.clone(), *join_type)))
            }
            PhysicalPlan::SortMergeJoin { left, right, condition, join_type } => {
                let right_width = plan_output_width(right, self.catalog)?;
                let left_op = self.build(left)?;
                let right_op = self.build(right)?;
                Ok(Box::new(SortMergeJoinOp::new(left_op, right_op, right_width, condition.clone(), *join_type)))
            }
            PhysicalPlan::NestedLoopJoin { left, right, condition, join_type } => {
                let right_width = plan_output_width(right, self.catalog)?;
                let left_op = self.build(left)?;
                let right_op = self.build(right)?;
                Ok(Box::new(NestedLoopJoinOp::new(left_op, right_op, right_width, condition.clone(), *join_type)))
            }
            PhysicalPlan::CrossProduct { left, right } => {
                let right_width = plan_output_width(right, self.catalog)?;
                let left_op = self.build(left)?;
                let right_op = self.build(right)?;
                Ok(Box::new(NestedLoopJoinOp::new(left_op, right_op, right_width, Expr::literal(true), crate::ast::JoinType::Inner)))
            }
            PhysicalPlan::IndexNestedLoopJoin { outer, inner_table, inner_index, condition, join_type } => {
                let inner_width = self.catalog.table(inner_table)?.columns().len();
                let outer_tables = plan_tables(outer);
                let outer_op = self.build(outer)?;
                let outer_key = extract_outer_key_expr(condition, &outer_tables)?;
                Ok(Box::new(IndexNestedLoopJoinOp::new(
                    self.catalog,
                    outer_op,
                    outer_key,
                    inner_table.clone(),
                    inner_index.clone(),
                    inner_width,
                    *join_type,
                )))
            }
            PhysicalPlan::TopN { input, order_by, limit, offset } => {
                let child = self.build(input)?;
                let check = CancelCheck::new(self.token.clone(), self.cancel_check_stride);
                let sorted = Box::new(SortOp::new(child, order_by.clone(), check));
                Ok(Box::new(LimitOp::new(sorted, *limit, *offset)))
            }
            PhysicalPlan::Limit { input, limit, offset } => {
                let child = self.build(input)?;
                Ok(Box::new(LimitOp::new(child, *limit, *offset)))
            }
            PhysicalPlan::NoOp { input } => self.build(input),
            PhysicalPlan::Empty => Ok(Box::new(EmptyOp::default())),
        }
    }
}

/// Extracts the equi-join condition's side whose `ColumnRef.table` belongs
/// to `outer_tables`, for an index nested-loop join's per-outer-row probe
/// key. Mirrors [`super::runner::PhysicalPlanRunner::extract_outer_key_index`]'s
/// table-aware resolution, but keeps the full `Expr` rather than resolving
/// a column index (the pull model has no `EvalContext` to resolve through).
fn extract_outer_key_expr(condition: &Expr, outer_tables: &[String]) -> Result<Expr> {
    if let Expr::BinaryOp { left, op: BinaryOp::Eq, right } = condition {
        if let Expr::Column(col) = left.as_ref() {
            if outer_tables.iter().any(|t| t == &col.table) {
                return Ok((**left).clone());
            }
        }
        if let Expr::Column(col) = right.as_ref() {
            if outer_tables.iter().any(|t| t == &col.table) {
                return Ok((**right).clone());
            }
        }
    }
    Err(Error::internal("index nested loop join requires an equi-join condition referencing the outer table"))
}

/// Recursively collects the table names scanned by a physical plan subtree,
/// used to tell which side of a join condition belongs to the outer input.
fn plan_tables(plan: &PhysicalPlan) -> Vec<String> {
    match plan {
        PhysicalPlan::TableScan { table } | PhysicalPlan::IndexScan { table, .. } | PhysicalPlan::IndexGet { table, .. } | PhysicalPlan::IndexInGet { table, .. } => {
            alloc::vec![table.clone()]
        }
        PhysicalPlan::Filter { input, .. } | PhysicalPlan::Project { input, .. } | PhysicalPlan::Sort { input, .. } | PhysicalPlan::Limit { input, .. } | PhysicalPlan::NoOp { input } | PhysicalPlan::TopN { input, .. } | PhysicalPlan::HashAggregate { input, .. } => {
            plan_tables(input)
        }
        PhysicalPlan::HashJoin { left, right, .. } | PhysicalPlan::SortMergeJoin { left, right, .. } | PhysicalPlan::NestedLoopJoin { left, right, .. } | PhysicalPlan::CrossProduct { left, right } => {
            let mut tables = plan_tables(left);
            tables.extend(plan_tables(right));
            tables
        }
        PhysicalPlan::IndexNestedLoopJoin { outer, inner_table, .. } => {
            let mut tables = plan_tables(outer);
            tables.push(inner_table.clone());
            tables
        }
        PhysicalPlan::Empty => Vec::new(),
    }
}

/// Recursively computes how many columns a physical plan's output row has,
/// needed to offset right-side join column indices in a concatenated row.
fn plan_output_width(plan: &PhysicalPlan, catalog: &dyn SchemaCatalog) -> Result<usize> {
    match plan {
        PhysicalPlan::TableScan { table } | PhysicalPlan::IndexScan { table, .. } | PhysicalPlan::IndexGet { table, .. } | PhysicalPlan::IndexInGet { table, .. } => {
            Ok(catalog.table(table)?.columns().len())
        }
        PhysicalPlan::Filter { input, .. } | PhysicalPlan::Sort { input, .. } | PhysicalPlan::Limit { input, .. } | PhysicalPlan::NoOp { input } => {
            plan_output_width(input, catalog)
        }
        PhysicalPlan::Project { columns, .. } => Ok(columns.len()),
        PhysicalPlan::HashAggregate { group_by, aggregates, .. } => Ok(group_by.len() + aggregates.len()),
        PhysicalPlan::HashJoin { left, right, .. } | PhysicalPlan::SortMergeJoin { left, right, .. } | PhysicalPlan::NestedLoopJoin { left, right, .. } | PhysicalPlan::CrossProduct { left, right } => {
            Ok(plan_output_width(left, catalog)? + plan_output_width(right, catalog)?)
        }
        PhysicalPlan::IndexNestedLoopJoin { outer, inner_table, .. } => {
            Ok(plan_output_width(outer, catalog)? + catalog.table(inner_table)?.columns().len())
        }
        PhysicalPlan::TopN { input, .. } => plan_output_width(input, catalog),
        PhysicalPlan::Empty => Ok(0),
    }
}

fn build_range(start: Option<Value>, end: Option<Value>, include_start: bool, include_end: bool) -> Option<KeyRange<Value>> {
    match (start, end) {
        (None, None) => None,
        (Some(s), None) => Some(KeyRange::lower_bound(s, !include_start)),
        (None, Some(e)) => Some(KeyRange::upper_bound(e, !include_end)),
        (Some(s), Some(e)) => {
            if s == e && include_start && include_end {
                Some(KeyRange::only(s))
            } else {
                Some(KeyRange::bound(s, e, !include_start, !include_end))
            }
        }
    }
}

// ===== TableScan =====

struct TableScanOp<'a, C: RowSource> {
    source: &'a C,
    table: String,
    cursor: Option<Box<dyn Cursor + 'a>>,
    current: Row,
}

impl<'a, C: RowSource> TableScanOp<'a, C> {
    fn new(source: &'a C, table: String) -> Self {
        Self { source, table, cursor: None, current: Row::new(0, Vec::new()) }
    }
}

impl<'a, C: RowSource> PullOperator for TableScanOp<'a, C> {
    fn init(&mut self) -> Result<()> {
        self.cursor = Some(self.source.open(ScanRequest::Table { table: &self.table })?);
        Ok(())
    }

    fn next(&mut self) -> Result<bool> {
        let cursor = self.cursor.as_mut().expect("init must run before next");
        match cursor.next()? {
            Some(row) => {
                self.current = (*row).clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn row(&self) -> &Row {
        &self.current
    }

    fn close(&mut self) -> Result<()> {
        self.cursor = None;
        Ok(())
    }
}

// ===== IndexScan / IndexGet =====

/// Neither index ever stores a full row payload here, only the indexed
/// columns mapped to a row id, so every index scan is non-covering: it
/// first collects matching row ids in index-key order, then resolves each
/// through [`RowSource::lookup_by_primary`] against the table's primary
/// storage.
struct IndexScanOp<'a, C: RowSource> {
    source: &'a C,
    table: String,
    index: String,
    range: Option<KeyRange<Value>>,
    reverse: bool,
    limit: Option<usize>,
    offset: usize,
    ids: Vec<RowId>,
    pos: usize,
    current: Row,
}

impl<'a, C: RowSource> IndexScanOp<'a, C> {
    fn new(source: &'a C, table: String, index: String, range: Option<KeyRange<Value>>, reverse: bool, limit: Option<usize>, offset: usize) -> Self {
        Self { source, table, index, range, reverse, limit, offset, ids: Vec::new(), pos: 0, current: Row::new(0, Vec::new()) }
    }
}

impl<'a, C: RowSource> PullOperator for IndexScanOp<'a, C> {
    fn init(&mut self) -> Result<()> {
        self.ids = self.source.index_row_ids(&self.table, &self.index, self.range.clone(), self.reverse, self.limit, self.offset)?;
        self.pos = 0;
        Ok(())
    }

    fn next(&mut self) -> Result<bool> {
        while self.pos < self.ids.len() {
            let id = self.ids[self.pos];
            self.pos += 1;
            if let Some(row) = self.source.lookup_by_primary(&self.table, id)? {
                self.current = (*row).clone();
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn row(&self) -> &Row {
        &self.current
    }

    fn close(&mut self) -> Result<()> {
        self.ids.clear();
        Ok(())
    }
}

/// Unions several point lookups on the same index (`IN (...)` pushdown).
/// One key's row ids at a time, resolved through `lookup_by_primary` like
/// [`IndexScanOp`]; keys are looked up in the order given.
struct IndexInGetOp<'a, C: RowSource> {
    source: &'a C,
    table: String,
    index: String,
    keys: Vec<Value>,
    next_key: usize,
    ids: Vec<RowId>,
    pos: usize,
    current: Row,
}

impl<'a, C: RowSource> IndexInGetOp<'a, C> {
    fn new(source: &'a C, table: String, index: String, keys: Vec<Value>) -> Self {
        Self { source, table, index, keys, next_key: 0, ids: Vec::new(), pos: 0, current: Row::new(0, Vec::new()) }
    }

    fn open_next_key(&mut self) -> Result<bool> {
        if self.next_key >= self.keys.len() {
            return Ok(false);
        }
        let key = self.keys[self.next_key].clone();
        self.next_key += 1;
        self.ids = self.source.index_row_ids(&self.table, &self.index, Some(KeyRange::only(key)), false, None, 0)?;
        self.pos = 0;
        Ok(true)
    }
}

impl<'a, C: RowSource> PullOperator for IndexInGetOp<'a, C> {
    fn init(&mut self) -> Result<()> {
        self.next_key = 0;
        self.open_next_key()?;
        Ok(())
    }

    fn next(&mut self) -> Result<bool> {
        loop {
            while self.pos < self.ids.len() {
                let id = self.ids[self.pos];
                self.pos += 1;
                if let Some(row) = self.source.lookup_by_primary(&self.table, id)? {
                    self.current = (*row).clone();
                    return Ok(true);
                }
            }
            if !self.open_next_key()? {
                return Ok(false);
            }
        }
    }

    fn row(&self) -> &Row {
        &self.current
    }

    fn close(&mut self) -> Result<()> {
        self.ids.clear();
        Ok(())
    }
}

// ===== Filter =====

struct FilterOp<'a> {
    child: Box<dyn PullOperator + 'a>,
    predicate: Expr,
}

impl<'a> FilterOp<'a> {
    fn new(child: Box<dyn PullOperator + 'a>, predicate: Expr) -> Self {
        Self { child, predicate }
    }
}

impl<'a> PullOperator for FilterOp<'a> {
    fn init(&mut self) -> Result<()> {
        self.child.init()
    }

    fn next(&mut self) -> Result<bool> {
        loop {
            if !self.child.next()? {
                return Ok(false);
            }
            if eval_predicate(&self.predicate, self.child.row().values())? {
                return Ok(true);
            }
        }
    }

    fn row(&self) -> &Row {
        self.child.row()
    }

    fn close(&mut self) -> Result<()> {
        self.child.close()
    }
}

// ===== Project =====

struct ProjectOp<'a> {
    child: Box<dyn PullOperator + 'a>,
    columns: Vec<Expr>,
    current: Row,
}

impl<'a> ProjectOp<'a> {
    fn new(child: Box<dyn PullOperator + 'a>, columns: Vec<Expr>) -> Self {
        Self { child, columns, current: Row::new(0, Vec::new()) }
    }
}

impl<'a> PullOperator for ProjectOp<'a> {
    fn init(&mut self) -> Result<()> {
        self.child.init()
    }

    fn next(&mut self) -> Result<bool> {
        if !self.child.next()? {
            return Ok(false);
        }
        let source = self.child.row();
        let mut values = Vec::with_capacity(self.columns.len());
        for c in &self.columns {
            values.push(eval_expr(c, source.values())?);
        }
        self.current = Row::new(source.id(), values);
        Ok(true)
    }

    fn row(&self) -> &Row {
        &self.current
    }

    fn close(&mut self) -> Result<()> {
        self.child.close()
    }
}

// ===== Sort (blocking: buffers everything on Init) =====

struct SortOp<'a> {
    child: Box<dyn PullOperator + 'a>,
    order_by: Vec<(Expr, SortOrder)>,
    buffer: Vec<Row>,
    pos: usize,
    check: CancelCheck,
}

impl<'a> SortOp<'a> {
    fn new(child: Box<dyn PullOperator + 'a>, order_by: Vec<(Expr, SortOrder)>, check: CancelCheck) -> Self {
        Self { child, order_by, buffer: Vec::new(), pos: 0, check }
    }
}

impl<'a> PullOperator for SortOp<'a> {
    fn init(&mut self) -> Result<()> {
        self.child.init()?;
        self.buffer.clear();
        while self.child.next()? {
            if self.check.tick() {
                return Err(Error::Canceled);
            }
            self.buffer.push(self.child.row().clone());
        }
        // Sort keys are evaluated up front (sort_by's comparator can't be
        // fallible), so any evaluation error surfaces before we start sorting.
        let mut keyed: Vec<(Vec<Value>, Row)> = Vec::with_capacity(self.buffer.len());
        for row in self.buffer.drain(..) {
            let mut keys = Vec::with_capacity(self.order_by.len());
            for (expr, _) in &self.order_by {
                keys.push(eval_expr(expr, row.values())?);
            }
            keyed.push((keys, row));
        }
        keyed.sort_by(|(ka, _), (kb, _)| {
            for (i, (_, order)) in self.order_by.iter().enumerate() {
                let cmp = ka[i].partial_cmp(&kb[i]).unwrap_or(core::cmp::Ordering::Equal);
                let cmp = match order {
                    SortOrder::Asc => cmp,
                    SortOrder::Desc => cmp.reverse(),
                };
                if cmp != core::cmp::Ordering::Equal {
                    return cmp;
                }
            }
            core::cmp::Ordering::Equal
        });
        self.buffer = keyed.into_iter().map(|(_, row)| row).collect();
        self.pos = 0;
        Ok(())
    }

    fn next(&mut self) -> Result<bool> {
        if self.pos >= self.buffer.len() {
            return Ok(false);
        }
        self.pos += 1;
        Ok(true)
    }

    fn row(&self) -> &Row {
        &self.buffer[self.pos - 1]
    }

    fn close(&mut self) -> Result<()> {
        self.buffer.clear();
        self.child.close()
    }
}

// ===== HashAggregate (blocking: buffers groups on Init) =====

struct HashAggregateOp<'a> {
    child: Box<dyn PullOperator + 'a>,
    group_by: Vec<Expr>,
    aggregates: Vec<(AggregateFunc, Expr)>,
    results: Vec<Row>,
    pos: usize,
    check: CancelCheck,
}

impl<'a> HashAggregateOp<'a> {
    fn new(
        child: Box<dyn PullOperator + 'a>,
        group_by: Vec<Expr>,
        aggregates: Vec<(AggregateFunc, Expr)>,
        check: CancelCheck,
    ) -> Self {
        Self { child, group_by, aggregates, results: Vec::new(), pos: 0, check }
    }
}

/// Per-group running state for one `(AggregateFunc, Expr)` output column.
///
/// `StdDev`/`GeoMean` buffer the raw samples rather than folding a running
/// sum, mirroring [`super::aggregate::AggregateExecutor::compute_single_aggregate`]'s
/// two-pass population variance and log-sum-exp formulas.
#[derive(Clone)]
enum Accumulator {
    Count(i64),
    Sum(Value),
    Avg { sum: f64, count: i64 },
    Min(Option<Value>),
    Max(Option<Value>),
    Distinct(alloc::collections::BTreeSet<Value>),
    StdDev(Vec<f64>),
    GeoMean(Vec<f64>),
}

impl Accumulator {
    fn new(func: AggregateFunc) -> Self {
        match func {
            AggregateFunc::Count => Accumulator::Count(0),
            AggregateFunc::Sum => Accumulator::Sum(Value::Null),
            AggregateFunc::Avg => Accumulator::Avg { sum: 0.0, count: 0 },
            AggregateFunc::Min => Accumulator::Min(None),
            AggregateFunc::Max => Accumulator::Max(None),
            AggregateFunc::Distinct => Accumulator::Distinct(alloc::collections::BTreeSet::new()),
            AggregateFunc::StdDev => Accumulator::StdDev(Vec::new()),
            AggregateFunc::GeoMean => Accumulator::GeoMean(Vec::new()),
        }
    }

    fn update(&mut self, value: &Value) {
        // Every aggregate here skips NULLs, including COUNT(expr); COUNT(*)
        // never passes one in (it always evaluates to `Int64(1)`).
        if value.is_null() {
            return;
        }
        match self {
            Accumulator::Count(n) => *n += 1,
            Accumulator::Sum(acc) => {
                *acc = add_numeric(acc, value);
            }
            Accumulator::Avg { sum, count } => {
                if let Some(f) = value_as_f64(value) {
                    *sum += f;
                    *count += 1;
                }
            }
            Accumulator::Min(acc) => {
                if acc.as_ref().map(|cur| value < cur).unwrap_or(true) {
                    *acc = Some(value.clone());
                }
            }
            Accumulator::Max(acc) => {
                if acc.as_ref().map(|cur| value > cur).unwrap_or(true) {
                    *acc = Some(value.clone());
                }
            }
            Accumulator::Distinct(seen) => {
                seen.insert(value.clone());
            }
            Accumulator::StdDev(samples) => {
                if let Some(f) = value_as_f64(value) {
                    samples.push(f);
                }
            }
            Accumulator::GeoMean(samples) => {
                if let Some(f) = value_as_f64(value) {
                    if f > 0.0 {
                        samples.push(f);
                    }
                }
            }
        }
    }

    fn finish(self) -> Value {
        match self {
            Accumulator::Count(n) => Value::Int64(n),
            Accumulator::Sum(acc) => acc,
            Accumulator::Avg { sum, count } => {
                if count == 0 {
                    Value::Null
                } else {
                    Value::Float64(sum / count as f64)
                }
            }
            Accumulator::Min(acc) => acc.unwrap_or(Value::Null),
            Accumulator::Max(acc) => acc.unwrap_or(Value::Null),
            Accumulator::Distinct(seen) => Value::Int64(seen.len() as i64),
            Accumulator::StdDev(samples) => {
                if samples.is_empty() {
                    Value::Null
                } else {
                    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
                    let variance =
                        samples.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / samples.len() as f64;
                    Value::Float64(libm::sqrt(variance))
                }
            }
            Accumulator::GeoMean(samples) => {
                if samples.is_empty() {
                    Value::Null
                } else {
                    let log_sum: f64 = samples.iter().map(|v| libm::log(*v)).sum();
                    Value::Float64(libm::exp(log_sum / samples.len() as f64))
                }
            }
        }
    }
}

fn add_numeric(acc: &Value, value: &Value) -> Value {
    if acc.is_null() {
        return value.clone();
    }
    let a = value_as_f64(acc).unwrap_or(0.0);
    let b = value_as_f64(value).unwrap_or(0.0);
    match (acc, value) {
        (Value::Int64(_), Value::Int64(_)) => Value::Int64((a + b) as i64),
        (Value::Int32(_), Value::Int32(_)) => Value::Int32((a + b) as i32),
        _ => Value::Float64(a + b),
    }
}


impl<'a> PullOperator for HashAggregateOp<'a> {
    fn init(&mut self) -> Result<()> {
        self.child.init()?;
        let mut groups: BTreeMap<Vec<Value>, Vec<Accumulator>> = BTreeMap::new();
        let mut group_order: Vec<Vec<Value>> = Vec::new();
        while self.child.next()? {
            if self.check.tick() {
                return Err(Error::Canceled);
            }
            let row = self.child.row();
            let mut key = Vec::with_capacity(self.group_by.len());
            for e in &self.group_by {
                key.push(eval_expr(e, row.values())?);
            }
            let entry = groups.entry(key.clone()).or_insert_with(|| {
                group_order.push(key.clone());
                self.aggregates.iter().map(|(f, _)| Accumulator::new(*f)).collect()
            });
            for (acc, (_, expr)) in entry.iter_mut().zip(self.aggregates.iter()) {
                let value = eval_expr(expr, row.values())?;
                acc.update(&value);
            }
        }
        self.results = group_order
            .into_iter()
            .map(|key| {
                let accs = groups.remove(&key).expect("group recorded in order must exist");
                let mut values = key;
                values.extend(accs.into_iter().map(Accumulator::finish));
                Row::new(0, values)
            })
            .collect();
        self.pos = 0;
        Ok(())
    }

    fn next(&mut self) -> Result<bool> {
        if self.pos >= self.results.len() {
            return Ok(false);
        }
        self.pos += 1;
        Ok(true)
    }

    fn row(&self) -> &Row {
        &self.results[self.pos - 1]
    }

    fn close(&mut self) -> Result<()> {
        self.results.clear();
        self.child.close()
    }
}

// ===== HashJoin =====

struct HashJoinOp<'a> {
    left: Box<dyn PullOperator + 'a>,
    right: Box<dyn PullOperator + 'a>,
    right_width: usize,
    condition: Expr,
    join_type: crate::ast::JoinType,
    build: BTreeMap<Value, Vec<Row>>,
    left_rows: Vec<Row>,
    matched_left: alloc::collections::BTreeSet<cynos_core::RowId>,
    right_buffer: Vec<Row>,
    right_pos: usize,
    matches: Vec<Row>,
    match_pos: usize,
    unmatched_pos: usize,
    emitting_unmatched: bool,
    current: Row,
}

impl<'a> HashJoinOp<'a> {
    fn new(left: Box<dyn PullOperator + 'a>, right: Box<dyn PullOperator + 'a>, right_width: usize, condition: Expr, join_type: crate::ast::JoinType) -> Self {
        Self {
            left,
            right,
            right_width,
            condition,
            join_type,
            build: BTreeMap::new(),
            left_rows: Vec::new(),
            matched_left: alloc::collections::BTreeSet::new(),
            right_buffer: Vec::new(),
            right_pos: 0,
            matches: Vec::new(),
            match_pos: 0,
            unmatched_pos: 0,
            emitting_unmatched: false,
            current: Row::new(0, Vec::new()),
        }
    }

    /// Extracts the left- and right-hand join key expressions from an
    /// equi-join condition (`left.col = right.col`, in either order).
    fn join_keys(&self) -> Option<(&Expr, &Expr)> {
        if let Expr::BinaryOp { left, op: BinaryOp::Eq, right } = &self.condition {
            return Some((left, right));
        }
        None
    }
}

impl<'a> PullOperator for HashJoinOp<'a> {
    fn init(&mut self) -> Result<()> {
        match self.join_type {
            crate::ast::JoinType::Inner | crate::ast::JoinType::LeftOuter => {}
            _ => return Err(Error::unsupported("pull executor only supports inner/left-outer hash joins today")),
        }
        self.left.init()?;
        self.right.init()?;
        let Some((left_key, _right_key)) = self.join_keys() else {
            return Err(Error::internal("hash join requires an equi-join condition"));
        };
        self.left_rows.clear();
        self.build.clear();
        self.matched_left.clear();
        while self.left.next()? {
            let row = self.left.row().clone();
            let key = eval_expr(left_key, row.values())?;
            self.build.entry(key).or_default().push(row.clone());
            self.left_rows.push(row);
        }
        self.right_buffer.clear();
        while self.right.next()? {
            self.right_buffer.push(self.right.row().clone());
        }
        self.right_pos = 0;
        self.matches.clear();
        self.match_pos = 0;
        self.unmatched_pos = 0;
        self.emitting_unmatched = false;
        Ok(())
    }

    fn next(&mut self) -> Result<bool> {
        let Some((_left_key, right_key)) = self.join_keys() else {
            return Ok(false);
        };
        if self.emitting_unmatched {
            while self.unmatched_pos < self.left_rows.len() {
                let row = &self.left_rows[self.unmatched_pos];
                self.unmatched_pos += 1;
                if self.matched_left.contains(&row.id()) {
                    continue;
                }
                let mut values = row.values().to_vec();
                values.extend(core::iter::repeat(Value::Null).take(self.right_width));
                self.current = Row::new(row.id(), values);
                return Ok(true);
            }
            return Ok(false);
        }
        loop {
            if self.match_pos < self.matches.len() {
                let left_row = self.matches[self.match_pos].clone();
                self.match_pos += 1;
                let right_row = &self.right_buffer[self.right_pos - 1];
                let mut values = left_row.values().to_vec();
                values.extend_from_slice(right_row.values());
                if eval_predicate(&self.condition, &values)? {
                    self.matched_left.insert(left_row.id());
                    self.current = Row::new(left_row.id(), values);
                    return Ok(true);
                }
                continue;
            }
            if self.right_pos >= self.right_buffer.len() {
                if self.join_type == crate::ast::JoinType::LeftOuter {
                    self.emitting_unmatched = true;
                    return self.next();
                }
                return Ok(false);
            }
            let right_row = &self.right_buffer[self.right_pos];
            self.right_pos += 1;
            let key = eval_expr(right_key, right_row.values())?;
            self.matches = self.build.get(&key).cloned().unwrap_or_default();
            self.match_pos = 0;
        }
    }

    fn row(&self) -> &Row {
        &self.current
    }

    fn close(&mut self) -> Result<()> {
        self.build.clear();
        self.right_buffer.clear();
        self.left.close()?;
        self.right.close()
    }
}

// ===== NestedLoopJoin (also backs CrossProduct) =====

/// Materializes the right side once, then for every left row scans the
/// full right buffer evaluating `condition`. Quadratic, used when no equi-join
/// key is available (or for a bare cross product, whose condition is the
/// literal `true`).
struct NestedLoopJoinOp<'a> {
    left: Box<dyn PullOperator + 'a>,
    right: Box<dyn PullOperator + 'a>,
    right_width: usize,
    condition: Expr,
    join_type: crate::ast::JoinType,
    right_buffer: Vec<Row>,
    left_row: Option<Row>,
    left_matched: bool,
    right_pos: usize,
    exhausted: bool,
    current: Row,
}

impl<'a> NestedLoopJoinOp<'a> {
    fn new(left: Box<dyn PullOperator + 'a>, right: Box<dyn PullOperator + 'a>, right_width: usize, condition: Expr, join_type: crate::ast::JoinType) -> Self {
        Self {
            left,
            right,
            right_width,
            condition,
            join_type,
            right_buffer: Vec::new(),
            left_row: None,
            left_matched: false,
            right_pos: 0,
            exhausted: false,
            current: Row::new(0, Vec::new()),
        }
    }

    fn advance_left(&mut self) -> Result<bool> {
        if !self.left.next()? {
            self.left_row = None;
            return Ok(false);
        }
        self.left_row = Some(self.left.row().clone());
        self.left_matched = false;
        self.right_pos = 0;
        Ok(true)
    }
}

impl<'a> PullOperator for NestedLoopJoinOp<'a> {
    fn init(&mut self) -> Result<()> {
        match self.join_type {
            crate::ast::JoinType::Inner | crate::ast::JoinType::LeftOuter => {}
            _ => return Err(Error::unsupported("pull executor only supports inner/left-outer nested loop joins today")),
        }
        self.left.init()?;
        self.right.init()?;
        self.right_buffer.clear();
        while self.right.next()? {
            self.right_buffer.push(self.right.row().clone());
        }
        self.left_row = None;
        self.exhausted = false;
        self.advance_left()?;
        Ok(())
    }

    fn next(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        loop {
            let Some(left_row) = self.left_row.clone() else {
                self.exhausted = true;
                return Ok(false);
            };
            if self.right_pos >= self.right_buffer.len() {
                if self.join_type == crate::ast::JoinType::LeftOuter && !self.left_matched {
                    let mut values = left_row.values().to_vec();
                    values.extend(core::iter::repeat(Value::Null).take(self.right_width));
                    self.current = Row::new(left_row.id(), values);
                    if !self.advance_left()? {
                        self.exhausted = true;
                    }
                    return Ok(true);
                }
                if !self.advance_left()? {
                    self.exhausted = true;
                    return Ok(false);
                }
                continue;
            }
            let right_row = self.right_buffer[self.right_pos].clone();
            self.right_pos += 1;
            let mut values = left_row.values().to_vec();
            values.extend_from_slice(right_row.values());
            if eval_predicate(&self.condition, &values)? {
                self.left_matched = true;
                self.current = Row::new(left_row.id(), values);
                return Ok(true);
            }
        }
    }

    fn row(&self) -> &Row {
        &self.current
    }

    fn close(&mut self) -> Result<()> {
        self.right_buffer.clear();
        self.left.close()?;
        self.right.close()
    }
}

// ===== SortMergeJoin =====

/// Materializes and sorts both sides on the join key (by [`Value`]'s total
/// order, used here as plan-internal bookkeeping rather than a user-visible
/// comparison), then two-pointer merges equal-key runs.
struct SortMergeJoinOp<'a> {
    left: Box<dyn PullOperator + 'a>,
    right: Box<dyn PullOperator + 'a>,
    right_width: usize,
    condition: Expr,
    join_type: crate::ast::JoinType,
    left_rows: Vec<(Value, Row)>,
    right_rows: Vec<(Value, Row)>,
    li: usize,
    group_right: Vec<Row>,
    group_pos: usize,
    group_left_row: Option<Row>,
    group_matched: bool,
    current: Row,
}

impl<'a> SortMergeJoinOp<'a> {
    fn new(left: Box<dyn PullOperator + 'a>, right: Box<dyn PullOperator + 'a>, right_width: usize, condition: Expr, join_type: crate::ast::JoinType) -> Self {
        Self {
            left,
            right,
            right_width,
            condition,
            join_type,
            left_rows: Vec::new(),
            right_rows: Vec::new(),
            li: 0,
            group_right: Vec::new(),
            group_pos: 0,
            group_left_row: None,
            group_matched: false,
            current: Row::new(0, Vec::new()),
        }
    }

    fn join_keys(&self) -> Option<(&Expr, &Expr)> {
        if let Expr::BinaryOp { left, op: BinaryOp::Eq, right } = &self.condition {
            return Some((left, right));
        }
        None
    }

    /// Advances `li` past the current key's run and collects the matching
    /// right-side run (rows whose key equals the left run's key), leaving
    /// `group_left_row`/`group_right` ready for `next()` to emit the
    /// cross product of the two runs.
    fn advance_group(&mut self) {
        if self.li >= self.left_rows.len() {
            self.group_left_row = None;
            return;
        }
        let key = self.left_rows[self.li].0.clone();
        self.group_left_row = Some(self.left_rows[self.li].1.clone());
        self.group_matched = false;
        self.li += 1;
        self.group_right = self
            .right_rows
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, r)| r.clone())
            .collect();
        self.group_pos = 0;
    }
}

impl<'a> PullOperator for SortMergeJoinOp<'a> {
    fn init(&mut self) -> Result<()> {
        match self.join_type {
            crate::ast::JoinType::Inner | crate::ast::JoinType::LeftOuter => {}
            _ => return Err(Error::unsupported("pull executor only supports inner/left-outer sort-merge joins today")),
        }
        self.left.init()?;
        self.right.init()?;
        let Some((left_key, right_key)) = self.join_keys() else {
            return Err(Error::internal("sort merge join requires an equi-join condition"));
        };
        self.left_rows.clear();
        while self.left.next()? {
            let row = self.left.row().clone();
            let key = eval_expr(left_key, row.values())?;
            self.left_rows.push((key, row));
        }
        self.right_rows.clear();
        while self.right.next()? {
            let row = self.right.row().clone();
            let key = eval_expr(right_key, row.values())?;
            self.right_rows.push((key, row));
        }
        self.left_rows.sort_by(|(ka, _), (kb, _)| ka.cmp(kb));
        self.right_rows.sort_by(|(ka, _), (kb, _)| ka.cmp(kb));
        self.li = 0;
        self.group_right.clear();
        self.group_pos = 0;
        self.advance_group();
        Ok(())
    }

    fn next(&mut self) -> Result<bool> {
        loop {
            let Some(left_row) = self.group_left_row.clone() else {
                return Ok(false);
            };
            if self.group_pos < self.group_right.len() {
                let right_row = self.group_right[self.group_pos].clone();
                self.group_pos += 1;
                self.group_matched = true;
                let mut values = left_row.values().to_vec();
                values.extend_from_slice(right_row.values());
                self.current = Row::new(left_row.id(), values);
                return Ok(true);
            }
            if self.join_type == crate::ast::JoinType::LeftOuter && !self.group_matched {
                let mut values = left_row.values().to_vec();
                values.extend(core::iter::repeat(Value::Null).take(self.right_width));
                self.current = Row::new(left_row.id(), values);
                self.group_matched = true;
                return Ok(true);
            }
            self.advance_group();
        }
    }

    fn row(&self) -> &Row {
        &self.current
    }

    fn close(&mut self) -> Result<()> {
        self.left_rows.clear();
        self.right_rows.clear();
        self.left.close()?;
        self.right.close()
    }
}

// ===== IndexNestedLoopJoin =====

/// Streams the outer side; for each non-null outer key, opens an index
/// cursor on the inner table (mirroring [`IndexScanOp`]'s point-lookup) and
/// drains matches, null-padding on no match for `LeftOuter`.
struct IndexNestedLoopJoinOp<'a, C: RowSource> {
    source: &'a C,
    outer: Box<dyn PullOperator + 'a>,
    outer_key: Expr,
    inner_table: String,
    inner_index: String,
    inner_width: usize,
    join_type: crate::ast::JoinType,
    outer_row: Option<Row>,
    inner_cursor: Option<Box<dyn Cursor + 'a>>,
    inner_matched: bool,
    current: Row,
}

impl<'a, C: RowSource> IndexNestedLoopJoinOp<'a, C> {
    fn new(
        source: &'a C,
        outer: Box<dyn PullOperator + 'a>,
        outer_key: Expr,
        inner_table: String,
        inner_index: String,
        inner_width: usize,
        join_type: crate::ast::JoinType,
    ) -> Self {
        Self {
            source,
            outer,
            outer_key,
            inner_table,
            inner_index,
            inner_width,
            join_type,
            outer_row: None,
            inner_cursor: None,
            inner_matched: false,
            current: Row::new(0, Vec::new()),
        }
    }

    fn advance_outer(&mut self) -> Result<bool> {
        loop {
            if !self.outer.next()? {
                self.outer_row = None;
                self.inner_cursor = None;
                return Ok(false);
            }
            let row = self.outer.row().clone();
            let key = eval_expr(&self.outer_key, row.values())?;
            self.inner_matched = false;
            if key.is_null() {
                // A null join key can't match any inner row; still surface
                // this outer row (null-padded) for a left-outer join.
                self.outer_row = Some(row);
                self.inner_cursor = None;
                return Ok(true);
            }
            self.inner_cursor = Some(self.source.open(ScanRequest::Index {
                table: &self.inner_table,
                index: &self.inner_index,
                range: Some(KeyRange::only(key)),
                reverse: false,
                limit: None,
                offset: 0,
            })?);
            self.outer_row = Some(row);
            return Ok(true);
        }
    }
}

impl<'a, C: RowSource> PullOperator for IndexNestedLoopJoinOp<'a, C> {
    fn init(&mut self) -> Result<()> {
        match self.join_type {
            crate::ast::JoinType::Inner | crate::ast::JoinType::LeftOuter => {}
            _ => return Err(Error::unsupported("pull executor only supports inner/left-outer index nested loop joins today")),
        }
        self.outer.init()?;
        self.outer_row = None;
        self.inner_cursor = None;
        self.advance_outer()?;
        Ok(())
    }

    fn next(&mut self) -> Result<bool> {
        loop {
            let Some(outer_row) = self.outer_row.clone() else {
                return Ok(false);
            };
            if let Some(cursor) = self.inner_cursor.as_mut() {
                match cursor.next()? {
                    Some(inner_row) => {
                        self.inner_matched = true;
                        let mut values = outer_row.values().to_vec();
                        values.extend_from_slice(inner_row.values());
                        self.current = Row::new(outer_row.id(), values);
                        return Ok(true);
                    }
                    None => {
                        self.inner_cursor = None;
                    }
                }
            }
            if self.join_type == crate::ast::JoinType::LeftOuter && !self.inner_matched {
                self.inner_matched = true;
                let mut values = outer_row.values().to_vec();
                values.extend(core::iter::repeat(Value::Null).take(self.inner_width));
                self.current = Row::new(outer_row.id(), values);
                if !self.advance_outer()? {
                    self.outer_row = None;
                }
                return Ok(true);
            }
            if !self.advance_outer()? {
                return Ok(false);
            }
        }
    }

    fn row(&self) -> &Row {
        &self.current
    }

    fn close(&mut self) -> Result<()> {
        self.inner_cursor = None;
        self.outer.close()
    }
}

// ===== Limit =====

struct LimitOp<'a> {
    child: Box<dyn PullOperator + 'a>,
    limit: usize,
    offset: usize,
    seen: usize,
    emitted: usize,
}

impl<'a> LimitOp<'a> {
    fn new(child: Box<dyn PullOperator + 'a>, limit: usize, offset: usize) -> Self {
        Self { child, limit, offset, seen: 0, emitted: 0 }
    }
}

impl<'a> PullOperator for LimitOp<'a> {
    fn init(&mut self) -> Result<()> {
        self.child.init()
    }

    fn next(&mut self) -> Result<bool> {
        if self.emitted >= self.limit {
            return Ok(false);
        }
        loop {
            if !self.child.next()? {
                return Ok(false);
            }
            if self.seen < self.offset {
                self.seen += 1;
                continue;
            }
            self.seen += 1;
            self.emitted += 1;
            return Ok(true);
        }
    }

    fn row(&self) -> &Row {
        self.child.row()
    }

    fn close(&mut self) -> Result<()> {
        self.child.close()
    }
}

// ===== Empty =====

#[derive(Default)]
struct EmptyOp {
    current: Row,
}

impl PullOperator for EmptyOp {
    fn init(&mut self) -> Result<()> {
        self.current = Row::new(0, Vec::new());
        Ok(())
    }

    fn next(&mut self) -> Result<bool> {
        Ok(false)
    }

    fn row(&self) -> &Row {
        &self.current
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

// ===== Expression evaluation over a flat row =====
//
// Unlike `runner::PhysicalPlanRunner`'s `eval_expr_ctx` (which resolves
// per-table relative column indices through an `EvalContext`), pull
// operators only ever see the concrete output row of their child, so
// `Expr::Column.index` is always a direct offset into `values`.

fn eval_expr(expr: &Expr, values: &[Value]) -> Result<Value> {
    Ok(match expr {
        Expr::Column(col) => values.get(col.index).cloned().unwrap_or(Value::Null),
        Expr::Literal(value) => value.clone(),
        Expr::BinaryOp { left, op, right } => {
            let l = eval_expr(left, values)?;
            let r = eval_expr(right, values)?;
            eval_binary_op(*op, &l, &r)?
        }
        Expr::UnaryOp { op, expr } => {
            let v = eval_expr(expr, values)?;
            eval_unary_op(*op, &v)
        }
        Expr::Aggregate { expr, .. } => match expr {
            Some(e) => eval_expr(e, values)?,
            None => Value::Int64(1),
        },
        Expr::Between { expr, low, high } => {
            let v = eval_expr(expr, values)?;
            let l = eval_expr(low, values)?;
            let h = eval_expr(high, values)?;
            Value::Boolean(v >= l && v <= h)
        }
        Expr::NotBetween { expr, low, high } => {
            let v = eval_expr(expr, values)?;
            let l = eval_expr(low, values)?;
            let h = eval_expr(high, values)?;
            Value::Boolean(v < l || v > h)
        }
        Expr::In { expr, list } => {
            let v = eval_expr(expr, values)?;
            let mut found = false;
            for item in list {
                if eval_expr(item, values)? == v {
                    found = true;
                    break;
                }
            }
            Value::Boolean(found)
        }
        Expr::NotIn { expr, list } => {
            let v = eval_expr(expr, values)?;
            let mut found = false;
            for item in list {
                if eval_expr(item, values)? == v {
                    found = true;
                    break;
                }
            }
            Value::Boolean(!found)
        }
        Expr::Like { expr, pattern } => Value::Boolean(eval_like(&eval_expr(expr, values)?, pattern)),
        Expr::NotLike { expr, pattern } => Value::Boolean(!eval_like(&eval_expr(expr, values)?, pattern)),
        Expr::Match { expr, pattern } => Value::Boolean(eval_regex_match(&eval_expr(expr, values)?, pattern)),
        Expr::NotMatch { expr, pattern } => Value::Boolean(!eval_regex_match(&eval_expr(expr, values)?, pattern)),
        Expr::Function { name, args } => {
            let mut arg_values = Vec::with_capacity(args.len());
            for a in args {
                arg_values.push(eval_expr(a, values)?);
            }
            eval_function(name, &arg_values)
        }
    })
}

fn eval_predicate(expr: &Expr, values: &[Value]) -> Result<bool> {
    Ok(matches!(eval_expr(expr, values)?, Value::Boolean(true)))
}
