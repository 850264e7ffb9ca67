//! Benchmarks for marker clustering.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use seoul_services_catalog::{Category, LocatedEntity};
use seoul_services_cluster::{cluster, ClusterSet};
use seoul_services_geo::Coordinate;

fn create_entities(count: usize) -> Vec<LocatedEntity> {
    (0..count)
        .map(|i| {
            let lat = 37.45 + (i as f64 * 0.0007) % 0.2;
            let lng = 126.90 + (i as f64 * 0.0013) % 0.25;
            LocatedEntity::bare(
                format!("svc-{i}"),
                Category::ALL[i % Category::ALL.len()],
                format!("Service {i}"),
                Coordinate::new(lat, lng),
            )
        })
        .collect()
}

fn bench_cluster(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster");

    for size in [50, 200, 1000].iter() {
        let entities = create_entities(*size);

        group.bench_with_input(BenchmarkId::new("greedy_500m", size), size, |b, _| {
            b.iter(|| cluster(black_box(&entities), black_box(500.0)))
        });
    }

    group.finish();
}

fn bench_cluster_set(c: &mut Criterion) {
    let entities = create_entities(500);

    c.bench_function("cluster_set_build_and_markers", |b| {
        b.iter(|| {
            let set = ClusterSet::build(black_box(&entities), 500.0).unwrap();
            set.markers()
        })
    });
}

criterion_group!(benches, bench_cluster, bench_cluster_set);
criterion_main!(benches);
