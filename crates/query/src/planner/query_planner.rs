//! Unified query planner with ExecutionContext support.
//!
//! This module provides a unified entry point for query planning that handles
//! both logical and physical plan optimizations with proper ExecutionContext support.
//!
//! ## Architecture
//!
//! The query planning pipeline consists of:
//!
//! 1. **Logical Optimization** - Context-free transformations:
//!    - NotSimplification
//!    - AndPredicatePass
//!    - CrossProductPass
//!    - ImplicitJoinsPass
//!    - OuterJoinSimplification
//!    - PredicatePushdown
//!    - JoinReorder
//!
//! 2. **Context-Aware Logical Optimization** - Requires ExecutionContext:
//!    - IndexPushdown (converts Filter+Scan to IndexScan/IndexGet by scoring indexes)
//!
//! 3. **Physical Plan Conversion** - Converts logical to physical plan
//!
//! 4. **Physical Optimization** - Context-aware physical transformations:
//!    - TopNPushdown (converts Sort+Limit to TopN)
//!    - OrderByIndexPass (leverages indexes for sorting)
//!    - LimitSkipByIndexPass (pushes limit/offset to IndexScan)
//!
//! ## Usage
//!
//! ```ignore
//! let ctx = build_execution_context(&cache, "users");
//! let planner = QueryPlanner::new(ctx);
//! let physical_plan = planner.plan(logical_plan);
//! ```

use crate::context::ExecutionContext;
use crate::optimizer::{
    AndPredicatePass, CrossProductPass, ImplicitJoinsPass, IndexPushdown, JoinReorder,
    LimitSkipByIndexPass, NotSimplification, OptimizerPass, OrderByIndexPass,
    OuterJoinSimplification, PredicatePushdown, TopNPushdown,
};
use crate::planner::{LogicalPlan, PhysicalPlan};
use alloc::boxed::Box;
use alloc::vec::Vec;

/// Unified query planner that handles the complete optimization pipeline,
/// threading `ExecutionContext` through both logical and physical passes.
pub struct QueryPlanner {
    ctx: ExecutionContext,
    /// Logical optimization passes (context-free)
    logical_passes: Vec<Box<dyn OptimizerPass>>,
}

impl QueryPlanner {
    /// Creates a new QueryPlanner with the given execution context.
    ///
    /// The planner is initialized with default optimization passes:
    /// - Logical: NotSimplification, AndPredicatePass, CrossProductPass,
    ///   ImplicitJoinsPass, OuterJoinSimplification, PredicatePushdown, JoinReorder
    /// - Context-aware logical: IndexPushdown
    /// - Physical: TopNPushdown, OrderByIndexPass, LimitSkipByIndexPass
    pub fn new(ctx: ExecutionContext) -> Self {
        Self {
            ctx,
            logical_passes: alloc::vec![
                Box::new(NotSimplification),
                Box::new(AndPredicatePass),
                Box::new(CrossProductPass),
                Box::new(ImplicitJoinsPass),
                Box::new(OuterJoinSimplification),
                Box::new(PredicatePushdown),
                Box::new(JoinReorder::new()),
            ],
        }
    }

    /// Creates a QueryPlanner with custom logical passes.
    ///
    /// Context-aware passes (IndexPushdown, OrderByIndexPass, etc.) are
    /// still applied automatically using the provided context.
    pub fn with_logical_passes(ctx: ExecutionContext, passes: Vec<Box<dyn OptimizerPass>>) -> Self {
        Self {
            ctx,
            logical_passes: passes,
        }
    }

    /// Returns a reference to the execution context.
    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    /// Plans a logical query into an optimized physical plan.
    ///
    /// This is the main entry point that runs the complete optimization pipeline:
    /// 1. Apply context-free logical optimizations
    /// 2. Apply context-aware logical optimizations (IndexPushdown)
    /// 3. Convert to physical plan
    /// 4. Apply physical optimizations (TopNPushdown, OrderByIndexPass, LimitSkipByIndexPass)
    pub fn plan(&self, plan: LogicalPlan) -> PhysicalPlan {
        // Phase 1: Context-free logical optimizations
        let mut logical = plan;
        for pass in &self.logical_passes {
            logical = pass.optimize(logical);
        }

        // Phase 2: Context-aware logical optimizations
        let index_pushdown = IndexPushdown::with_context(self.ctx.clone());
        logical = index_pushdown.optimize(logical);

        // Phase 3: Convert to physical plan
        let mut physical = self.logical_to_physical(logical);

        // Phase 4: Physical optimizations
        // TopNPushdown: Sort + Limit -> TopN
        physical = TopNPushdown::new().optimize(physical);

        // OrderByIndexPass: leverage indexes for sorting (needs context)
        physical = OrderByIndexPass::new(&self.ctx).optimize(physical);

        // LimitSkipByIndexPass: push limit/offset to IndexScan (needs context)
        physical = LimitSkipByIndexPass::new(&self.ctx).optimize(physical);

        physical
    }

    /// Optimizes only the logical plan without converting to physical.
    ///
    /// Useful for debugging or when you need to inspect the optimized logical plan.
    pub fn optimize_logical(&self, plan: LogicalPlan) -> LogicalPlan {
        let mut logical = plan;

        // Context-free passes
        for pass in &self.logical_passes {
            logical = pass.optimize(logical);
        }

        // Context-aware passes
        let index_pushdown = IndexPushdown::with_context(self.ctx.clone());
        logical = index_pushdown.optimize(logical);

        logical
    }

    /// Converts a logical plan to physical and applies physical optimizations.
    ///
    /// Assumes the logical plan has already been optimized.
    pub fn to_physical(&self, plan: LogicalPlan) -> PhysicalPlan {
        let mut physical = self.logical_to_physical(plan);

        // Physical optimizations
        physical = TopNPushdown::new().optimize(physical);
        physical = OrderByIndexPass::new(&self.ctx).optimize(physical);
        physical = LimitSkipByIndexPass::new(&self.ctx).optimize(physical);

        physical
    }

    /// Converts a logical plan to a physical plan without optimizations.
    fn logical_to_physical(&self, plan: LogicalPlan) -> PhysicalPlan {
        use crate::planner::JoinAlgorithm;

        match plan {
            LogicalPlan::Scan { table } => PhysicalPlan::table_scan(table),

            LogicalPlan::IndexScan {
                table,
                index,
                range_start,
                range_end,
                include_start,
                include_end,
            } => PhysicalPlan::IndexScan {
                table,
                index,
                range_start,
                range_end,
                include_start,
                include_end,
                limit: None,
                offset: None,
                reverse: false,
            },

            LogicalPlan::IndexGet { table, index, key } => {
                PhysicalPlan::index_get(table, index, key)
            }

            LogicalPlan::IndexInGet { table, index, keys } => {
                PhysicalPlan::index_in_get(table, index, keys)
            }

            LogicalPlan::Filter { input, predicate } => {
                let input_physical = self.logical_to_physical(*input);
                PhysicalPlan::filter(input_physical, predicate)
            }

            LogicalPlan::Project { input, columns } => {
                let input_physical = self.logical_to_physical(*input);
                PhysicalPlan::project(input_physical, columns)
            }

            LogicalPlan::Join {
                left,
                right,
                condition,
                join_type,
            } => {
                let left_physical = self.logical_to_physical(*left);
                let right_physical = self.logical_to_physical(*right);
                let algorithm = self.choose_join_algorithm(&condition, &left_physical, &right_physical);

                match algorithm {
                    JoinAlgorithm::Hash => {
                        PhysicalPlan::hash_join(left_physical, right_physical, condition, join_type)
                    }
                    JoinAlgorithm::SortMerge => PhysicalPlan::sort_merge_join(
                        left_physical,
                        right_physical,
                        condition,
                        join_type,
                    ),
                    JoinAlgorithm::NestedLoop | JoinAlgorithm::IndexNestedLoop => {
                        PhysicalPlan::nested_loop_join(
                            left_physical,
                            right_physical,
                            condition,
                            join_type,
                        )
                    }
                }
            }

            LogicalPlan::Aggregate {
                input,
                group_by,
                aggregates,
            } => {
                let input_physical = self.logical_to_physical(*input);
                PhysicalPlan::hash_aggregate(input_physical, group_by, aggregates)
            }

            LogicalPlan::Sort { input, order_by } => {
                let input_physical = self.logical_to_physical(*input);
                PhysicalPlan::sort(input_physical, order_by)
            }

            LogicalPlan::Limit {
                input,
                limit,
                offset,
            } => {
                let input_physical = self.logical_to_physical(*input);
                PhysicalPlan::limit(input_physical, limit, offset)
            }

            LogicalPlan::CrossProduct { left, right } => {
                let left_physical = self.logical_to_physical(*left);
                let right_physical = self.logical_to_physical(*right);
                PhysicalPlan::CrossProduct {
                    left: Box::new(left_physical),
                    right: Box::new(right_physical),
                }
            }

            LogicalPlan::Union { .. } => PhysicalPlan::Empty,

            LogicalPlan::Empty => PhysicalPlan::Empty,
        }
    }

    /// Picks a join algorithm for `condition` joining `left` to `right`.
    ///
    /// An equi-join where both sides already iterate in ascending order on
    /// their respective join columns gets `SortMerge` for free (no sort
    /// buffering needed); otherwise it falls back to `Hash`. Anything else
    /// (range joins, general predicates) gets `NestedLoop`.
    fn choose_join_algorithm(
        &self,
        condition: &crate::ast::Expr,
        left: &PhysicalPlan,
        right: &PhysicalPlan,
    ) -> crate::planner::JoinAlgorithm {
        if condition.is_equi_join() {
            if let crate::ast::Expr::BinaryOp { left: left_col, right: right_col, .. } = condition {
                if let (crate::ast::Expr::Column(l), crate::ast::Expr::Column(r)) =
                    (left_col.as_ref(), right_col.as_ref())
                {
                    if self.plan_sorted_on(left, &l.column) && self.plan_sorted_on(right, &r.column) {
                        return crate::planner::JoinAlgorithm::SortMerge;
                    }
                }
            }
            return crate::planner::JoinAlgorithm::Hash;
        }
        if condition.is_range_join() {
            return crate::planner::JoinAlgorithm::NestedLoop;
        }
        crate::planner::JoinAlgorithm::NestedLoop
    }

    /// Whether `plan`'s natural iteration order is ascending by `column`: a
    /// table scan over a table the context marks sorted by primary key
    /// (and `column` is that key's leading column), or a forward index scan
    /// on an index whose leading column is `column`.
    fn plan_sorted_on(&self, plan: &PhysicalPlan, column: &str) -> bool {
        match plan {
            PhysicalPlan::TableScan { table } => {
                self.ctx.get_stats(table).map(|s| s.is_sorted).unwrap_or(false)
                    && self
                        .ctx
                        .find_primary_index(table)
                        .and_then(|idx| idx.columns.first())
                        .map(|c| c == column)
                        .unwrap_or(false)
            }
            PhysicalPlan::IndexScan { table, index, reverse, .. } => {
                !*reverse
                    && self
                        .ctx
                        .indexes(table)
                        .iter()
                        .find(|i| &i.name == index)
                        .and_then(|i| i.columns.first())
                        .map(|c| c == column)
                        .unwrap_or(false)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, SortOrder};
    use crate::context::{IndexInfo, TableStats};

    fn create_test_context() -> ExecutionContext {
        let mut ctx = ExecutionContext::new();
        ctx.register_table(
            "users",
            TableStats {
                row_count: 1000,
                is_sorted: false,
                indexes: alloc::vec![
                    IndexInfo::new("idx_id", alloc::vec!["id".into()], true),
                    IndexInfo::new("idx_name", alloc::vec!["name".into()], false),
                ],
            },
        );
        ctx
    }

    #[test]
    fn test_query_planner_basic() {
        let ctx = create_test_context();
        let planner = QueryPlanner::new(ctx);

        let plan = LogicalPlan::scan("users");
        let physical = planner.plan(plan);

        assert!(matches!(physical, PhysicalPlan::TableScan { .. }));
    }

    #[test]
    fn test_query_planner_index_selection() {
        let ctx = create_test_context();
        let planner = QueryPlanner::new(ctx);

        // Filter: id = 42
        let plan = LogicalPlan::filter(
            LogicalPlan::scan("users"),
            Expr::eq(Expr::column("users", "id", 0), Expr::literal(42i64)),
        );

        let physical = planner.plan(plan);

        // Should use IndexGet
        assert!(matches!(physical, PhysicalPlan::IndexGet { .. }));
    }

    #[test]
    fn test_query_planner_order_by_index() {
        let ctx = create_test_context();
        let planner = QueryPlanner::new(ctx);

        // Sort by id ASC
        let plan = LogicalPlan::Sort {
            input: Box::new(LogicalPlan::scan("users")),
            order_by: alloc::vec![(Expr::column("users", "id", 0), SortOrder::Asc)],
        };

        let physical = planner.plan(plan);

        // Should use IndexScan instead of Sort
        assert!(matches!(physical, PhysicalPlan::IndexScan { .. }));
    }

    #[test]
    fn test_query_planner_topn_pushdown() {
        let ctx = create_test_context();
        let planner = QueryPlanner::new(ctx);

        // Sort by id DESC + Limit 10
        let plan = LogicalPlan::Limit {
            input: Box::new(LogicalPlan::Sort {
                input: Box::new(LogicalPlan::scan("users")),
                order_by: alloc::vec![(Expr::column("users", "id", 0), SortOrder::Desc)],
            }),
            limit: 10,
            offset: 0,
        };

        let physical = planner.plan(plan);

        // Should become IndexScan with limit and reverse
        match physical {
            PhysicalPlan::IndexScan {
                limit,
                reverse,
                ..
            } => {
                assert_eq!(limit, Some(10));
                assert!(reverse);
            }
            _ => panic!("Expected IndexScan, got {:?}", physical),
        }
    }

    #[test]
    fn test_query_planner_optimize_logical() {
        let ctx = create_test_context();
        let planner = QueryPlanner::new(ctx);

        let plan = LogicalPlan::filter(
            LogicalPlan::scan("users"),
            Expr::eq(Expr::column("users", "id", 0), Expr::literal(42i64)),
        );

        let optimized = planner.optimize_logical(plan);

        // Should convert to IndexGet
        assert!(matches!(optimized, LogicalPlan::IndexGet { .. }));
    }

    fn create_sorted_join_context() -> ExecutionContext {
        let mut ctx = ExecutionContext::new();
        for table in ["a", "b"] {
            ctx.register_table(
                table,
                TableStats {
                    row_count: 100,
                    is_sorted: true,
                    indexes: alloc::vec![IndexInfo::new(alloc::format!("pk{}", table), alloc::vec!["id".into()], true)],
                },
            );
        }
        ctx
    }

    #[test]
    fn test_choose_join_algorithm_sort_merge_when_both_sides_sorted_on_key() {
        let ctx = create_sorted_join_context();
        let planner = QueryPlanner::new(ctx);

        let plan = LogicalPlan::join(
            LogicalPlan::scan("a"),
            LogicalPlan::scan("b"),
            Expr::eq(Expr::column("a", "id", 0), Expr::column("b", "id", 0)),
            crate::ast::JoinType::Inner,
        );

        let physical = planner.plan(plan);
        assert!(matches!(physical, PhysicalPlan::SortMergeJoin { .. }), "expected SortMergeJoin, got {:?}", physical);
    }

    #[test]
    fn test_choose_join_algorithm_falls_back_to_hash_when_sides_unsorted() {
        let ctx = create_test_context();
        let planner = QueryPlanner::new(ctx);

        let plan = LogicalPlan::join(
            LogicalPlan::scan("users"),
            LogicalPlan::scan("users"),
            Expr::eq(Expr::column("users", "id", 0), Expr::column("users", "id", 0)),
            crate::ast::JoinType::Inner,
        );

        let physical = planner.plan(plan);
        assert!(matches!(physical, PhysicalPlan::HashJoin { .. }), "expected HashJoin, got {:?}", physical);
    }
}
