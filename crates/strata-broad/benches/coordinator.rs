//! Criterion benchmarks for the layer coordinator.

use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use strata_broad::{LayerCoordinator, LayerMask};
use strata_index::{Aabb, GridConfig, GridIndex, ObjectId};

const OBJECTS: u64 = 2_000;

fn bounds(id: u64, shift: f64) -> Aabb {
    let x = (id % 64) as f64 * 4.0 + shift;
    let y = (id / 64) as f64 * 4.0;
    Aabb::new([x, y], [x + 2.0, y + 2.0]).unwrap()
}

fn mask(id: u64) -> LayerMask {
    LayerMask::from_bits_retain((1 << (id % 4)) | (1 << (4 + id % 3)))
}

fn populated() -> LayerCoordinator<GridIndex> {
    let c = LayerCoordinator::with_index_config(&GridConfig::default());
    for id in 0..OBJECTS {
        c.insert(ObjectId(id), mask(id), &bounds(id, 0.0)).unwrap();
    }
    c
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("insert_2k_two_layers", |b| {
        b.iter_batched(
            || LayerCoordinator::<GridIndex>::with_index_config(&GridConfig::default()),
            |broad| {
                for id in 0..OBJECTS {
                    broad.insert(ObjectId(id), mask(id), &bounds(id, 0.0)).unwrap();
                }
                broad
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_update(c: &mut Criterion) {
    let broad = populated();
    let mut shift = 0.0;
    c.bench_function("update_2k", |b| {
        b.iter(|| {
            shift = if shift > 0.0 { 0.0 } else { 0.5 };
            for id in 0..OBJECTS {
                broad.update(ObjectId(id), &bounds(id, shift)).unwrap();
            }
        });
    });
}

fn bench_broad_phase(c: &mut Criterion) {
    let broad = populated();
    let query = bounds(OBJECTS / 2, 0.0).inflate(8.0).unwrap();

    c.bench_function("broad_phase_all_layers", |b| {
        b.iter(|| black_box(broad.broad_phase(LayerMask::all(), black_box(&query))));
    });
    c.bench_function("broad_phase_one_layer", |b| {
        b.iter(|| black_box(broad.broad_phase(LayerMask::L1, black_box(&query))));
    });
}

criterion_group!(benches, bench_insert, bench_update, bench_broad_phase);
criterion_main!(benches);
