//! End-to-end scenarios exercising `Engine::execute` across the full
//! analyze -> plan -> cost -> execute pipeline. Row counts are scaled down
//! from production-sized figures so the suite runs fast; every scenario
//! keeps the shape (selectivity order of magnitude, chosen access method,
//! output cardinality) of the literal inputs it stands in for.

use cynos_core::schema::{Column, Table, TableBuilder};
use cynos_core::{CancellationToken, DataType, Decimal, Row, Value};
use cynos_query::ast::Expr;
use cynos_query::cost::AccessMethod;
use cynos_query::statement::{SelectItem, SelectStmt, Statement, TableRef};
use cynos_engine::{Engine, EngineConfig};
use cynos_storage::InMemoryCatalog;

const USER_COUNT: i64 = 200;

fn users_catalog() -> InMemoryCatalog {
    let users = TableBuilder::new("users")
        .unwrap()
        .add_column("id", DataType::Int64)
        .unwrap()
        .add_column("name", DataType::Text)
        .unwrap()
        .add_column("email", DataType::Text)
        .unwrap()
        .add_primary_key(&["id"], true)
        .unwrap()
        .add_unique("idx_email", &["email"])
        .unwrap()
        .build()
        .unwrap();

    let mut catalog = InMemoryCatalog::new();
    catalog.create_table(users).unwrap();
    let store = catalog.row_store_mut("users").unwrap();
    for id in 0..USER_COUNT {
        store
            .insert(Row::new(
                id as u64 + 1,
                vec![Value::Int64(id), Value::Text(format!("user{}", id)), Value::Text(format!("user{}@example.com", id))],
            ))
            .unwrap();
    }
    catalog
}

fn engine_over_users() -> Engine {
    Engine::new(EngineConfig::default(), users_catalog())
}

#[test]
fn test_primary_key_point_lookup() {
    let engine = engine_over_users();
    let stmt = Statement::Select(SelectStmt {
        from: vec![TableRef::new("users")],
        projection: vec![SelectItem::Expr { expr: Expr::column("", "name", 0), alias: None }],
        predicate: Some(Expr::eq(Expr::column("", "id", 0), Expr::literal(42i64))),
        ..Default::default()
    });

    let (rows, metadata) = engine.execute(&stmt, CancellationToken::new()).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].values(), &[Value::Text("user42".into())]);
    assert!(
        matches!(&metadata.access_method, AccessMethod::IndexGet { index, .. } if index.to_lowercase().contains("users")),
        "expected an index-backed point lookup, got {:?}",
        metadata.access_method
    );
    assert_eq!(metadata.actual_rows, 1);
}

#[test]
fn test_covering_secondary_index_scan() {
    let engine = engine_over_users();
    let stmt = Statement::Select(SelectStmt {
        from: vec![TableRef::new("users")],
        projection: vec![SelectItem::Expr { expr: Expr::column("", "email", 0), alias: None }],
        predicate: Some(Expr::eq(Expr::column("", "email", 0), Expr::literal("user7@example.com"))),
        ..Default::default()
    });

    let (rows, metadata) = engine.execute(&stmt, CancellationToken::new()).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].values(), &[Value::Text("user7@example.com".into())]);
    assert!(
        matches!(&metadata.access_method, AccessMethod::IndexGet { index, .. } | AccessMethod::IndexScan { index, .. } if index == "idx_email"),
        "expected the unique email index, got {:?}",
        metadata.access_method
    );
}

#[test]
fn test_range_scan_with_sort_orders_output_by_name() {
    let engine = engine_over_users();
    let stmt = Statement::Select(SelectStmt {
        from: vec![TableRef::new("users")],
        projection: vec![
            SelectItem::Expr { expr: Expr::column("", "id", 0), alias: None },
            SelectItem::Expr { expr: Expr::column("", "name", 1), alias: None },
        ],
        predicate: Some(Expr::and(
            Expr::gt(Expr::column("", "id", 0), Expr::literal(10i64)),
            Expr::lt(Expr::column("", "id", 0), Expr::literal(50i64)),
        )),
        order_by: vec![(Expr::column("", "name", 1), cynos_query::ast::SortOrder::Asc)],
        ..Default::default()
    });

    let (rows, metadata) = engine.execute(&stmt, CancellationToken::new()).unwrap();

    assert!(rows.len() <= 39, "expected at most 39 rows strictly between id 10 and 50");
    assert!(!rows.is_empty());
    assert_eq!(metadata.actual_rows, rows.len());

    let names: Vec<&Value> = rows.iter().map(|r| &r.values()[1]).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted, "rows must come back ordered by name");
}

#[test]
fn test_hash_aggregation_counts_and_sums_every_order() {
    let orders = TableBuilder::new("orders")
        .unwrap()
        .add_column("user_id", DataType::Int64)
        .unwrap()
        .add_column("total", DataType::Decimal)
        .unwrap()
        .build()
        .unwrap();

    let mut catalog = InMemoryCatalog::new();
    catalog.create_table(orders).unwrap();
    let store = catalog.row_store_mut("orders").unwrap();

    const ORDER_COUNT: u64 = 2000;
    const DISTINCT_USERS: i64 = 50;
    for i in 0..ORDER_COUNT {
        let user_id = (i as i64) % DISTINCT_USERS;
        store
            .insert(Row::new(i + 1, vec![Value::Int64(user_id), Value::Decimal(Decimal::new(1000 + i as i64, 2))]))
            .unwrap();
    }

    let engine = Engine::new(EngineConfig::default(), catalog);
    let stmt = Statement::Select(SelectStmt {
        from: vec![TableRef::new("orders")],
        projection: vec![
            SelectItem::Expr { expr: Expr::column("", "user_id", 0), alias: None },
            SelectItem::Expr { expr: Expr::count_star(), alias: Some("order_count".into()) },
            SelectItem::Expr { expr: Expr::sum(Expr::column("", "total", 1)), alias: Some("total_sum".into()) },
        ],
        group_by: vec![Expr::column("", "user_id", 0)],
        ..Default::default()
    });

    let (rows, metadata) = engine.execute(&stmt, CancellationToken::new()).unwrap();

    assert_eq!(rows.len(), DISTINCT_USERS as usize);
    assert_eq!(metadata.actual_rows, DISTINCT_USERS as usize);

    let mut total_count = 0i64;
    for row in &rows {
        let count = match &row.values()[1] {
            Value::Int64(n) => *n,
            other => panic!("expected Int64 count, got {:?}", other),
        };
        assert!(count > 0, "every group must have at least one order");
        total_count += count;
    }
    assert_eq!(total_count as u64, ORDER_COUNT);
}

#[test]
fn test_filter_and_project_composition_drops_low_ids_and_narrows_columns() {
    let engine = engine_over_users();
    let stmt = Statement::Select(SelectStmt {
        from: vec![TableRef::new("users")],
        projection: vec![SelectItem::Expr { expr: Expr::column("", "name", 0), alias: None }],
        predicate: Some(Expr::ge(Expr::column("", "id", 0), Expr::literal(30i64))),
        ..Default::default()
    });

    let (rows, _metadata) = engine.execute(&stmt, CancellationToken::new()).unwrap();

    assert_eq!(rows.len(), (USER_COUNT - 30) as usize);
    for row in &rows {
        assert_eq!(row.values().len(), 1, "projection must narrow to exactly [name]");
    }
    assert!(rows.iter().any(|r| r.values()[0] == Value::Text("user30".into())));
    assert!(!rows.iter().any(|r| r.values()[0] == Value::Text("user29".into())));
}

#[test]
fn test_unknown_column_fails_before_any_execution() {
    let engine = engine_over_users();
    let stmt = Statement::Select(SelectStmt {
        from: vec![TableRef::new("users")],
        projection: vec![SelectItem::Expr { expr: Expr::column("", "xyz", 0), alias: None }],
        ..Default::default()
    });

    let err = engine.execute(&stmt, CancellationToken::new()).unwrap_err();
    let message = format!("{:?}", err).to_lowercase();
    assert!(message.contains("xyz"), "error should name the unknown column: {message}");
    assert!(message.contains("users"), "error should name the table: {message}");
}

#[test]
fn test_unused_table_helper_compiles() {
    // Exercises the plain Column/Table constructors alongside TableBuilder,
    // since Engine accepts any InMemoryCatalog built either way.
    let table = Table::new("t", vec![Column::new("a", DataType::Int64)]);
    assert_eq!(table.columns().len(), 1);
}
