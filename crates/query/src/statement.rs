//! The `Statement` shape a parser hands to the semantic analyzer.
//!
//! The tokenizer/parser that turns SQL text into a `Statement` is an
//! external collaborator (see [`Parser`]); this crate defines only the
//! shape C5 needs to walk, and tests build `Statement` values directly,
//! the way a hand-written parser would.

use alloc::string::String;
use alloc::vec::Vec;

use cynos_core::{Result, Value};

use crate::ast::{Expr, JoinType, SortOrder};

/// One entry in a `FROM` clause: a table name plus its query-local alias.
#[derive(Clone, Debug)]
pub struct TableRef {
    pub table: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(table: impl Into<String>) -> Self {
        Self { table: table.into(), alias: None }
    }

    pub fn aliased(table: impl Into<String>, alias: impl Into<String>) -> Self {
        Self { table: table.into(), alias: Some(alias.into()) }
    }

    /// The name other clauses should resolve columns against: the alias if
    /// one was given, otherwise the table name.
    pub fn visible_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

/// An explicit join between two `FROM`-list entries.
#[derive(Clone, Debug)]
pub struct JoinClause {
    pub table: TableRef,
    pub join_type: JoinType,
    pub condition: Expr,
}

/// One item of a `SELECT` list. `Star` expands to every resolved table's
/// columns in declaration order during analysis.
#[derive(Clone, Debug)]
pub enum SelectItem {
    Star,
    Expr { expr: Expr, alias: Option<String> },
}

/// A `SELECT` statement, in the shape C5 needs: FROM list, WHERE
/// expression, SELECT list, GROUP BY, ORDER BY.
#[derive(Clone, Debug, Default)]
pub struct SelectStmt {
    pub from: Vec<TableRef>,
    pub joins: Vec<JoinClause>,
    pub projection: Vec<SelectItem>,
    pub predicate: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub order_by: Vec<(Expr, SortOrder)>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// An `INSERT` statement.
#[derive(Clone, Debug)]
pub struct InsertStmt {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// An `UPDATE` statement.
#[derive(Clone, Debug)]
pub struct UpdateStmt {
    pub table: String,
    pub assignments: Vec<(String, Expr)>,
    pub predicate: Option<Expr>,
}

/// A `DELETE` statement.
#[derive(Clone, Debug)]
pub struct DeleteStmt {
    pub table: String,
    pub predicate: Option<Expr>,
}

/// The tagged union a parsed query is classified into.
#[derive(Clone, Debug)]
pub enum Statement {
    Select(SelectStmt),
    Insert(InsertStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
    /// Anything outside the four DML shapes above (DDL, SET, SHOW, ...).
    Other,
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::Select(_) => StatementKind::Select,
            Statement::Insert(_) => StatementKind::Insert,
            Statement::Update(_) => StatementKind::Update,
            Statement::Delete(_) => StatementKind::Delete,
            Statement::Other => StatementKind::Other,
        }
    }
}

/// Statement classification, the first thing C5 produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

/// The external parser contract: turns SQL text into a [`Statement`].
/// No implementation lives in this crate — the tokenizer/parser is an
/// out-of-scope collaborator; tests construct `Statement` values directly.
pub trait Parser {
    fn parse(&self, sql_text: &str) -> Result<Statement>;
}
