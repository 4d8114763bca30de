//! Query optimizer module.

mod and_predicate;
mod cross_product;
mod get_row_count;
mod implicit_joins;
mod index_join;
mod index_pushdown;
mod join_reorder;
mod limit_skip_by_index;
mod multi_column_or;
mod not_simplification;
mod order_by_index;
mod outer_join_simplification;
mod pass;
mod predicate_pushdown;
mod topn_pushdown;

pub use and_predicate::AndPredicatePass;
pub use cross_product::CrossProductPass;
pub use get_row_count::{GetRowCountPass, GetRowCountPlan};
pub use implicit_joins::ImplicitJoinsPass;
pub use index_join::IndexJoinPass;
pub use index_pushdown::IndexPushdown;
pub use join_reorder::JoinReorder;
pub use limit_skip_by_index::LimitSkipByIndexPass;
pub use multi_column_or::{MultiColumnOrConfig, MultiColumnOrPass};
pub use not_simplification::NotSimplification;
pub use order_by_index::OrderByIndexPass;
pub use outer_join_simplification::OuterJoinSimplification;
pub use pass::OptimizerPass;
pub use predicate_pushdown::PredicatePushdown;
pub use topn_pushdown::TopNPushdown;
