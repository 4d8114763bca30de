//! JOIN algorithm implementations.

mod hash;
mod merge;
mod nested;

pub use hash::HashJoin;
pub use merge::{sort_merge_join, SortMergeJoin};
pub use nested::{nested_loop_join, NestedLoopJoin};
