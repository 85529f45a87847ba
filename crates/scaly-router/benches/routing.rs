//! Prefix resolution benchmarks.
//!
//! Run with: `cargo bench -p scaly-router`

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scaly_core::ControllerRegistry;
use scaly_router::{RouteEntry, Router, RoutingTable};

fn build_router(num_routes: usize) -> Router {
    let mut table = RoutingTable::new();

    for i in 0..num_routes / 2 {
        table.add_route(RouteEntry::controller(
            &format!("/api/v1/resource{i}"),
            "ResourceController",
            "index",
        ));
    }

    for i in 0..num_routes / 2 {
        table.add_route(RouteEntry::controller(
            &format!("/api/v1/org/resource{i}/items"),
            "ItemController",
            "list",
        ));
    }

    Router::new(table, Arc::new(ControllerRegistry::new()))
}

fn bench_exact_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("exact_match", |b| {
        b.iter(|| {
            black_box(router.resolve("/api/v1/resource25"));
        });
    });
}

fn bench_prefix_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("prefix_match", |b| {
        b.iter(|| {
            black_box(router.resolve("/api/v1/org/resource10/items/2024/05/report"));
        });
    });
}

fn bench_mixed_case(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("mixed_case", |b| {
        b.iter(|| {
            black_box(router.resolve("/API/V1/Resource25/Details"));
        });
    });
}

fn bench_miss(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("miss", |b| {
        b.iter(|| {
            black_box(router.resolve("/static/css/site/theme/dark.css"));
        });
    });
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing_scaling");

    for size in [10, 100, 1000] {
        let router = build_router(size);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                black_box(router.resolve("/api/v1/resource5/extra/segments"));
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_exact_match,
    bench_prefix_match,
    bench_mixed_case,
    bench_miss,
    bench_scaling,
);
criterion_main!(benches);
