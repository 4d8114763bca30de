//! Semantic analyzer (C5): resolves a parsed [`Statement`] against the
//! schema catalog and produces an [`AnalyzedQuery`] the logical planner
//! builds an operator tree from.
//!
//! Does not evaluate expressions and does not read statistics — this stage
//! only resolves names and shapes. Statistics are consulted later, by the
//! cost estimator and the index-pushdown optimizer.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use cynos_core::schema::Table;
use cynos_core::{Error, Result};
use cynos_storage::SchemaCatalog;

use crate::ast::{AggregateFunc, ColumnRef, Expr, JoinType, SortOrder};
use crate::planner::LogicalPlan;
use crate::statement::{JoinClause, SelectItem, SelectStmt, Statement, StatementKind, TableRef};

/// One resolved `FROM`-list entry: the name queries should refer to it by
/// (its alias, if any) paired with its schema.
struct ResolvedTable<'a> {
    visible_name: String,
    table: &'a Table,
}

/// The output of semantic analysis: a statement's shape with every column
/// reference resolved to a concrete `(table, index)` pair.
#[derive(Clone, Debug)]
pub struct AnalyzedQuery {
    pub kind: StatementKind,
    /// Resolved `FROM`-list tables, in declaration order.
    pub tables: Vec<TableRef>,
    /// Explicit joins, condition expressions already resolved.
    pub joins: Vec<JoinClause>,
    /// `SELECT` list with `*` expanded, in output order.
    pub output_columns: Vec<Expr>,
    /// Display name for each entry in `output_columns`.
    pub output_names: Vec<String>,
    pub predicate: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub order_by: Vec<(Expr, SortOrder)>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Resolves `Statement`s against one `SchemaCatalog` snapshot.
pub struct SemanticAnalyzer<'a> {
    catalog: &'a dyn SchemaCatalog,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(catalog: &'a dyn SchemaCatalog) -> Self {
        Self { catalog }
    }

    /// Classifies and analyzes `statement`. Only `SELECT` is fully resolved
    /// today; the other DML shapes classify but are otherwise out of scope
    /// for this analyzer (see the statement-level non-goals around DDL and
    /// the transaction manager) and fail with `UnsupportedConstruct`.
    pub fn analyze(&self, statement: &Statement) -> Result<AnalyzedQuery> {
        match statement {
            Statement::Select(select) => self.analyze_select(select),
            Statement::Insert(_) | Statement::Update(_) | Statement::Delete(_) | Statement::Other => {
                Err(Error::unsupported("semantic analysis of non-SELECT statements is not implemented"))
            }
        }
    }

    fn analyze_select(&self, stmt: &SelectStmt) -> Result<AnalyzedQuery> {
        if stmt.from.is_empty() {
            return Err(Error::unsupported("SELECT with no FROM clause"));
        }

        let mut resolved: Vec<ResolvedTable<'_>> = Vec::with_capacity(stmt.from.len() + stmt.joins.len());
        for table_ref in &stmt.from {
            resolved.push(self.resolve_table_ref(table_ref)?);
        }
        for join in &stmt.joins {
            resolved.push(self.resolve_table_ref(&join.table)?);
        }

        let joins = stmt
            .joins
            .iter()
            .map(|j| {
                Ok(JoinClause {
                    table: j.table.clone(),
                    join_type: j.join_type,
                    condition: self.resolve_expr(&resolved, &j.condition)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let (output_columns, output_names) = self.resolve_projection(&resolved, &stmt.projection)?;
        let predicate = stmt.predicate.as_ref().map(|e| self.resolve_expr(&resolved, e)).transpose()?;
        let group_by =
            stmt.group_by.iter().map(|e| self.resolve_expr(&resolved, e)).collect::<Result<Vec<_>>>()?;
        let order_by = stmt
            .order_by
            .iter()
            .map(|(e, order)| Ok((self.resolve_expr(&resolved, e)?, *order)))
            .collect::<Result<Vec<_>>>()?;

        Ok(AnalyzedQuery {
            kind: StatementKind::Select,
            tables: stmt.from.clone(),
            joins,
            output_columns,
            output_names,
            predicate,
            group_by,
            order_by,
            limit: stmt.limit,
            offset: stmt.offset,
        })
    }

    fn resolve_table_ref(&self, table_ref: &TableRef) -> Result<ResolvedTable<'_>> {
        let table = self.catalog.table(&table_ref.table).map_err(|_| Error::unknown_table(table_ref.table.clone()))?;
        Ok(ResolvedTable { visible_name: table_ref.visible_name().to_string(), table })
    }

    fn resolve_projection(
        &self,
        resolved: &[ResolvedTable<'_>],
        projection: &[SelectItem],
    ) -> Result<(Vec<Expr>, Vec<String>)> {
        let mut columns = Vec::new();
        let mut names = Vec::new();
        for item in projection {
            match item {
                SelectItem::Star => {
                    for rt in resolved {
                        for column in rt.table.columns() {
                            columns.push(Expr::column(rt.visible_name.clone(), column.name(), column.index()));
                            names.push(column.name().to_string());
                        }
                    }
                }
                SelectItem::Expr { expr, alias } => {
                    let resolved_expr = self.resolve_expr(resolved, expr)?;
                    let name = alias.clone().unwrap_or_else(|| display_name(&resolved_expr));
                    columns.push(resolved_expr);
                    names.push(name);
                }
            }
        }
        Ok((columns, names))
    }

    /// Recursively resolves every `Expr::Column` leaf in `expr` against the
    /// resolved `FROM` list, leaving every other node shape unchanged.
    fn resolve_expr(&self, resolved: &[ResolvedTable<'_>], expr: &Expr) -> Result<Expr> {
        Ok(match expr {
            Expr::Column(col) => Expr::Column(self.resolve_column(resolved, col)?),
            Expr::Literal(v) => Expr::Literal(v.clone()),
            Expr::BinaryOp { left, op, right } => Expr::BinaryOp {
                left: alloc::boxed::Box::new(self.resolve_expr(resolved, left)?),
                op: *op,
                right: alloc::boxed::Box::new(self.resolve_expr(resolved, right)?),
            },
            Expr::UnaryOp { op, expr } => {
                Expr::UnaryOp { op: *op, expr: alloc::boxed::Box::new(self.resolve_expr(resolved, expr)?) }
            }
            Expr::Function { name, args } => Expr::Function {
                name: name.clone(),
                args: args.iter().map(|a| self.resolve_expr(resolved, a)).collect::<Result<Vec<_>>>()?,
            },
            Expr::Aggregate { func, expr, distinct } => Expr::Aggregate {
                func: *func,
                expr: expr.as_ref().map(|e| self.resolve_expr(resolved, e)).transpose()?.map(alloc::boxed::Box::new),
                distinct: *distinct,
            },
            Expr::Between { expr, low, high } => Expr::Between {
                expr: alloc::boxed::Box::new(self.resolve_expr(resolved, expr)?),
                low: alloc::boxed::Box::new(self.resolve_expr(resolved, low)?),
                high: alloc::boxed::Box::new(self.resolve_expr(resolved, high)?),
            },
            Expr::NotBetween { expr, low, high } => Expr::NotBetween {
                expr: alloc::boxed::Box::new(self.resolve_expr(resolved, expr)?),
                low: alloc::boxed::Box::new(self.resolve_expr(resolved, low)?),
                high: alloc::boxed::Box::new(self.resolve_expr(resolved, high)?),
            },
            Expr::In { expr, list } => Expr::In {
                expr: alloc::boxed::Box::new(self.resolve_expr(resolved, expr)?),
                list: list.iter().map(|e| self.resolve_expr(resolved, e)).collect::<Result<Vec<_>>>()?,
            },
            Expr::NotIn { expr, list } => Expr::NotIn {
                expr: alloc::boxed::Box::new(self.resolve_expr(resolved, expr)?),
                list: list.iter().map(|e| self.resolve_expr(resolved, e)).collect::<Result<Vec<_>>>()?,
            },
            Expr::Like { expr, pattern } => {
                Expr::Like { expr: alloc::boxed::Box::new(self.resolve_expr(resolved, expr)?), pattern: pattern.clone() }
            }
            Expr::NotLike { expr, pattern } => Expr::NotLike {
                expr: alloc::boxed::Box::new(self.resolve_expr(resolved, expr)?),
                pattern: pattern.clone(),
            },
            Expr::Match { expr, pattern } => {
                Expr::Match { expr: alloc::boxed::Box::new(self.resolve_expr(resolved, expr)?), pattern: pattern.clone() }
            }
            Expr::NotMatch { expr, pattern } => Expr::NotMatch {
                expr: alloc::boxed::Box::new(self.resolve_expr(resolved, expr)?),
                pattern: pattern.clone(),
            },
        })
    }

    fn resolve_column(&self, resolved: &[ResolvedTable<'_>], col: &ColumnRef) -> Result<ColumnRef> {
        if !col.table.is_empty() {
            let rt = resolved
                .iter()
                .find(|rt| rt.visible_name == col.table)
                .ok_or_else(|| Error::unknown_table(col.table.clone()))?;
            let index =
                rt.table.get_column_index(&col.column).ok_or_else(|| Error::unknown_column(rt.table.name(), col.column.clone()))?;
            return Ok(ColumnRef::new(rt.visible_name.clone(), col.column.clone(), index));
        }

        let mut found: Option<(&str, usize)> = None;
        for rt in resolved {
            if let Some(index) = rt.table.get_column_index(&col.column) {
                if found.is_some() {
                    return Err(Error::ambiguous_column(col.column.clone()));
                }
                found = Some((rt.visible_name.as_str(), index));
            }
        }
        let (table, index) = found.ok_or_else(|| Error::unknown_column("<unresolved>", col.column.clone()))?;
        Ok(ColumnRef::new(table, col.column.clone(), index))
    }
}

impl AnalyzedQuery {
    /// Builds the logical operator tree (C6) bottom-up: `FROM` becomes a
    /// scan/join chain, `WHERE` a `Filter` above it, `GROUP BY`/aggregates
    /// an `Aggregate`, `ORDER BY` a `Sort`, then `LIMIT`/`OFFSET`, with
    /// `Project` always the topmost node.
    ///
    /// When the query aggregates, the `SELECT` list is expected to be
    /// exactly the group-by columns followed by the aggregate expressions,
    /// in that order — the shape `HashAggregate` actually emits rows in.
    /// Reshaping an aggregated row to an arbitrary `SELECT` list ordering
    /// is not implemented; such queries keep the `Aggregate` node as their
    /// root instead of adding a reordering `Project` on top of it.
    pub fn into_logical_plan(self) -> LogicalPlan {
        let mut plan = self.tables.first().map(|t| LogicalPlan::scan(t.table.clone())).unwrap_or(LogicalPlan::Empty);
        for join in &self.joins {
            plan = LogicalPlan::join(plan, LogicalPlan::scan(join.table.table.clone()), join.condition.clone(), join.join_type);
        }

        if let Some(predicate) = self.predicate {
            plan = LogicalPlan::filter(plan, predicate);
        }

        let aggregates = extract_aggregates(&self.output_columns);
        let is_aggregated = !self.group_by.is_empty() || !aggregates.is_empty();
        if is_aggregated {
            plan = LogicalPlan::aggregate(plan, self.group_by, aggregates);
        }

        if !self.order_by.is_empty() {
            plan = LogicalPlan::sort(plan, self.order_by);
        }

        if let Some(limit) = self.limit {
            plan = LogicalPlan::limit(plan, limit, self.offset.unwrap_or(0));
        }

        if is_aggregated {
            return plan;
        }
        LogicalPlan::project(plan, self.output_columns)
    }
}

/// Pulls the top-level `Expr::Aggregate` nodes out of a `SELECT` list, in
/// declaration order, as `(func, argument)` pairs the `Aggregate` node
/// consumes. `COUNT(*)`'s missing argument becomes a constant `1` so every
/// aggregate has a concrete expression to evaluate per row.
fn extract_aggregates(output_columns: &[Expr]) -> Vec<(AggregateFunc, Expr)> {
    output_columns
        .iter()
        .filter_map(|expr| match expr {
            Expr::Aggregate { func, expr, .. } => {
                Some((*func, expr.as_deref().cloned().unwrap_or_else(|| Expr::literal(1i64))))
            }
            _ => None,
        })
        .collect()
}

/// Names for the `Star` case use the column name; a resolved bare column
/// reference uses its name; everything else (function calls, aggregates,
/// literals) falls back to the normalized column name or a generic label.
fn display_name(expr: &Expr) -> String {
    match expr {
        Expr::Column(col) => col.column.clone(),
        Expr::Aggregate { func, .. } => alloc::format!("{:?}", func).to_lowercase(),
        Expr::Function { name, .. } => name.clone(),
        _ => String::from("expr"),
    }
}
