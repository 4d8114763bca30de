//! AST module for query expressions and predicates.

mod expr;
mod predicate;

pub use expr::{AggregateFunc, BinaryOp, ColumnRef, Expr, SortOrder, UnaryOp};
pub use predicate::{
    CombinedPredicate, EvalType, JoinPredicate, JoinType, LogicalOp, Predicate, PredicateClone,
    ValuePredicate,
};

