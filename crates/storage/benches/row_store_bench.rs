//! Benchmarks for `RowStore` delete and clear operations under secondary
//! index maintenance.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cynos_core::schema::TableBuilder;
use cynos_core::{DataType, Row, Value};
use cynos_storage::RowStore;

fn create_test_schema_with_indices() -> cynos_core::schema::Table {
    TableBuilder::new("test")
        .unwrap()
        .add_column("id", DataType::Int64)
        .unwrap()
        .add_column("price", DataType::Float64)
        .unwrap()
        .add_column("symbol", DataType::Text)
        .unwrap()
        .add_column("sector", DataType::Text)
        .unwrap()
        .add_primary_key(&["id"], false)
        .unwrap()
        .add_index("idx_price", &["price"], false)
        .unwrap()
        .add_index("idx_symbol", &["symbol"], false)
        .unwrap()
        .add_index("idx_sector", &["sector"], false)
        .unwrap()
        .build()
        .unwrap()
}

fn populate_store(store: &mut RowStore, count: u64) {
    let sectors = ["Tech", "Finance", "Health", "Energy", "Consumer"];
    for i in 1..=count {
        let row = Row::new(
            i,
            vec![
                Value::Int64(i as i64),
                Value::Float64(100.0 + (i as f64) * 0.1),
                Value::Text(format!("SYM{}", i)),
                Value::Text(sectors[(i as usize) % sectors.len()].into()),
            ],
        );
        store.insert(row).unwrap();
    }
}

/// Benchmark: individual `delete()` calls vs `clear()` for removing every
/// row (simulating `DELETE FROM t` with no WHERE clause).
fn row_store_delete_all_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("row_store_delete_all");

    for total_rows in [1000u64, 10000, 50000].iter() {
        group.bench_with_input(BenchmarkId::new("individual", total_rows), total_rows, |b, &total_rows| {
            b.iter_batched(
                || {
                    let mut store = RowStore::new(create_test_schema_with_indices());
                    populate_store(&mut store, total_rows);
                    let row_ids: Vec<u64> = (1..=total_rows).collect();
                    (store, row_ids)
                },
                |(mut store, row_ids)| {
                    for id in row_ids {
                        let _ = store.delete(id);
                    }
                    black_box(store)
                },
                criterion::BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("clear", total_rows), total_rows, |b, &total_rows| {
            b.iter_batched(
                || {
                    let mut store = RowStore::new(create_test_schema_with_indices());
                    populate_store(&mut store, total_rows);
                    store
                },
                |mut store| {
                    store.clear();
                    black_box(store)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Benchmark: point lookups by primary key under a fixed table size, the
/// access path an equality-on-PK query compiles down to.
fn row_store_pk_lookup_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("row_store_pk_lookup");
    let mut store = RowStore::new(create_test_schema_with_indices());
    populate_store(&mut store, 100_000);

    group.bench_function("get_by_pk", |b| {
        b.iter(|| {
            let result = store.get_by_pk(&Value::Int64(black_box(50_000)));
            black_box(result)
        });
    });

    group.finish();
}

criterion_group!(benches, row_store_delete_all_benchmark, row_store_pk_lookup_benchmark);
criterion_main!(benches);
