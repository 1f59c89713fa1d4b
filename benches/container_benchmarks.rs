//! Benchmarks for service lookup and constructor auto-wiring

use armature_di::prelude::*;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::any::type_name;
use std::hint::black_box;
use std::sync::Arc;

#[derive(Injectable)]
struct Database;

#[allow(dead_code)]
#[derive(Injectable)]
struct Repository {
    database: Arc<Database>,
    #[inject(name = "repository.table", default = String::from("users"))]
    table: Arc<String>,
}

fn container() -> ServiceContainer {
    let catalog = TypeCatalog::new()
        .with_type::<Database>()
        .with_type::<Repository>();
    let container = ServiceContainer::with_values(
        catalog,
        [(type_name::<Database>(), ServiceRef::new(Database))],
    );
    container
        .add_factory(Factory::of(|_| Ok(String::from("cached"))), "cached")
        .unwrap();
    container
        .add_factory(Factory::of(|_| Ok(String::from("transient"))), "transient")
        .unwrap();
    container.set_singletone(false, "transient").unwrap();
    container
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("container_get");
    let container = container();
    container.get("cached").unwrap();

    group.bench_function("cached_singleton", |b| {
        b.iter(|| container.get(black_box("cached")).unwrap())
    });

    group.bench_function("transient", |b| {
        b.iter(|| container.get(black_box("transient")).unwrap())
    });

    group.bench_function("missing", |b| {
        b.iter(|| container.get(black_box("missing")).is_err())
    });

    group.finish();
}

fn bench_has(c: &mut Criterion) {
    let container = container();
    c.bench_function("container_has", |b| {
        b.iter(|| container.has(black_box("transient")))
    });
}

fn bench_auto_wiring(c: &mut Criterion) {
    let mut group = c.benchmark_group("auto_wiring");
    let container = container();
    let resolver = container.resolver().unwrap();

    for name in [type_name::<Database>(), type_name::<Repository>()] {
        group.bench_with_input(BenchmarkId::from_parameter(name), name, |b, name| {
            b.iter(|| resolver.resolve(&container, black_box(name)).unwrap())
        });
    }

    group.finish();
}

fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");

    for count in [10usize, 100] {
        let ids: Vec<String> = (0..count).map(|i| format!("service.{}", i)).collect();
        group.bench_with_input(BenchmarkId::new("add_factory", count), &ids, |b, ids| {
            b.iter(|| {
                let container = ServiceContainer::default();
                for id in ids {
                    container
                        .add_factory(Factory::of(|_| Ok(0u64)), id.as_str())
                        .unwrap();
                }
                black_box(container)
            })
        });
    }

    group.finish();
}

criterion_group!(
    container_benches,
    bench_get,
    bench_has,
    bench_auto_wiring,
    bench_registration,
);

criterion_main!(container_benches);
