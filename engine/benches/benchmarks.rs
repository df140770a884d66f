//! Performance benchmarks for sortable-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use sortable_engine::{Item, MemoryStore, OrderingEngine, SortConfig, StoreSnapshot};

fn grouped_engine() -> OrderingEngine {
    OrderingEngine::new(SortConfig::new().grouped_by("list")).unwrap()
}

fn populated(engine: &OrderingEngine, groups: usize, per_group: usize) -> MemoryStore<Item> {
    let mut store = MemoryStore::new();
    for g in 0..groups {
        for i in 0..per_group {
            let item = Item::new(format!("g{g}-{i}"), json!({"n": i})).in_group(format!("g{g}"));
            engine.create(&mut store, item).unwrap();
        }
    }
    store
}

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");

    group.bench_function("append_to_group", |b| {
        let engine = grouped_engine();
        let mut store = populated(&engine, 10, 100);
        let mut id = 0u64;

        b.iter(|| {
            id += 1;
            let item = Item::new(format!("new_{id}"), json!({})).in_group("g3");
            engine.create(black_box(&mut store), black_box(item))
        })
    });

    group.finish();
}

fn bench_reordering(c: &mut Criterion) {
    let mut group = c.benchmark_group("reordering");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("bottom_to_top", size), size, |b, &size| {
            let engine = grouped_engine();
            let mut store = populated(&engine, 1, size);
            let id = format!("g0-{}", size - 1);

            b.iter(|| {
                engine.to_top(&mut store, black_box(&id)).unwrap();
                engine.to_bottom(&mut store, black_box(&id)).unwrap();
            })
        });

        group.bench_with_input(BenchmarkId::new("move_up_down", size), size, |b, &size| {
            let engine = grouped_engine();
            let mut store = populated(&engine, 1, size);
            let id = format!("g0-{}", size / 2);

            b.iter(|| {
                engine.move_up(&mut store, black_box(&id)).unwrap();
                engine.move_down(&mut store, black_box(&id)).unwrap();
            })
        });

        group.bench_with_input(BenchmarkId::new("swap", size), size, |b, &size| {
            let engine = grouped_engine();
            let mut store = populated(&engine, 1, size);
            let first = "g0-0".to_string();
            let last = format!("g0-{}", size - 1);

            b.iter(|| engine.swap(&mut store, black_box(&first), black_box(&last)))
        });
    }

    group.finish();
}

fn bench_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete");

    for size in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("delete_first", size), size, |b, &size| {
            let engine = grouped_engine();
            let store = populated(&engine, 1, size);

            b.iter(|| {
                let mut store = store.clone();
                engine.delete(&mut store, black_box(&"g0-0".to_string()))
            })
        });
    }

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    let engine = grouped_engine();
    let store = populated(&engine, 10, 100);

    group.bench_function("sorted_ascending", |b| {
        let key = "g5".to_string();
        b.iter(|| engine.sorted_ascending(&store, black_box(Some(&key))))
    });

    group.bench_function("snapshot_to_json", |b| {
        b.iter(|| StoreSnapshot::capture(engine.config(), black_box(&store)).to_json())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_create,
    bench_reordering,
    bench_delete,
    bench_queries
);
criterion_main!(benches);
