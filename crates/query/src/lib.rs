//! Cynos Query - Query engine for Cynos in-memory database.
//!
//! This crate provides the query execution engine including:
//!
//! - `ast`: Expression and predicate AST definitions
//! - `planner`: Logical and physical query plans
//! - `optimizer`: Query optimization passes
//! - `executor`: Query execution operators (scan, filter, project, join, aggregate, sort, limit)
//! - `context`: Execution context
//! - `cost`: Physical plan cost estimation, wired to `cynos-stats`
//! - `statement`: Parsed-statement shape and the external `Parser` contract
//! - `analyzer`: Semantic analysis from a `Statement` into an `AnalyzedQuery`

#![no_std]

extern crate alloc;

pub mod analyzer;
pub mod ast;
pub mod context;
pub mod cost;
pub mod executor;
pub mod optimizer;
pub mod planner;
pub mod statement;
