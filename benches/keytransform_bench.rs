//! Benchmarks for key transforms, query planning and transformed queries

use std::hint::black_box;

use bytes::Bytes;
use criterion::{criterion_group, criterion_main, Criterion};
use keytransform::datastore::{Datastore, MapDatastore};
use keytransform::keytransform::prepare_query;
use keytransform::query::{Filter, Order, Query};
use keytransform::{Key, KeyTransform, TransformingStore};

// =============================================================================
// Setup
// =============================================================================

fn reversing() -> KeyTransform {
    KeyTransform::pair(
        |key: &Key| Key::new("/x").child(&key.reverse()),
        |key: &Key| Key::new(&key.as_str()["/x".len()..]).reverse(),
    )
}

fn populated(transform: KeyTransform) -> TransformingStore<MapDatastore> {
    let store = TransformingStore::new(MapDatastore::new(), transform);
    for i in 0..1_000 {
        let key = Key::new(format!("/users/{:04}", i));
        store.put(&key, Bytes::from(format!("value{}", i))).unwrap();
    }
    store
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_convert(c: &mut Criterion) {
    let transform = KeyTransform::prefix("/tenants/acme");
    let key = Key::new("/users/0042/profile");

    c.bench_function("transform/convert", |b| {
        b.iter(|| transform.convert(black_box(&key)))
    });

    let physical = transform.convert(&key);
    c.bench_function("transform/invert", |b| {
        b.iter(|| transform.invert(black_box(&physical)).unwrap())
    });
}

fn bench_prepare_query(c: &mut Criterion) {
    let query = Query {
        prefix: Key::new("/users"),
        filters: vec![Filter::KeyPrefix {
            prefix: Key::new("/users/00"),
        }],
        orders: vec![Order::ByValue, Order::ByKey],
        limit: 10,
        ..Query::default()
    };

    let prefix = KeyTransform::prefix("/ns");
    c.bench_function("plan/prefix", |b| {
        b.iter(|| prepare_query(&prefix, black_box(&query)))
    });

    let pair = reversing();
    c.bench_function("plan/pair", |b| {
        b.iter(|| prepare_query(&pair, black_box(&query)))
    });
}

fn bench_query(c: &mut Criterion) {
    let query = Query {
        orders: vec![Order::ByKeyDescending],
        limit: 10,
        ..Query::default()
    };

    let delegated = populated(KeyTransform::prefix("/ns"));
    c.bench_function("query/delegated_order", |b| {
        b.iter(|| delegated.query(black_box(&query)).unwrap().rest().unwrap())
    });

    let naive = populated(reversing());
    c.bench_function("query/naive_order", |b| {
        b.iter(|| naive.query(black_box(&query)).unwrap().rest().unwrap())
    });
}

criterion_group!(benches, bench_convert, bench_prepare_query, bench_query);
criterion_main!(benches);
