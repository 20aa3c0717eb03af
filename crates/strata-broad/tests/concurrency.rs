//! Concurrent callers on distinct objects.

use std::thread;

use strata_broad::{CoordinatorConfig, Layer, LayerCoordinator, LayerMask};
use strata_index::{Aabb, GridConfig, GridIndex, ObjectId};

const THREADS: u64 = 8;
const PER_THREAD: u64 = 200;

fn mask_for(id: u64) -> LayerMask {
    // Never empty, varies across ids.
    LayerMask::from_bits_retain((id as u16).wrapping_mul(0x9E37) | 1)
}

fn bounds_for(id: u64, shift: f64) -> Aabb {
    let x = (id % 50) as f64 * 3.0 + shift;
    let y = (id / 50) as f64 * 3.0;
    Aabb::new([x, y], [x + 1.0, y + 1.0]).unwrap()
}

#[test]
fn test_parallel_callers_keep_table_and_layers_in_sync() {
    let c = LayerCoordinator::<GridIndex>::new(
        &CoordinatorConfig::new(GridConfig::default()).with_worker_threads(4),
    )
    .unwrap();

    thread::scope(|s| {
        for t in 0..THREADS {
            let c = &c;
            s.spawn(move || {
                for i in 0..PER_THREAD {
                    let id = t * PER_THREAD + i;
                    c.insert(ObjectId(id), mask_for(id), &bounds_for(id, 0.0))
                        .unwrap();
                    c.update(ObjectId(id), &bounds_for(id, 0.5)).unwrap();
                    // Query while others mutate; must not deadlock or panic.
                    let _ = c.broad_phase(LayerMask::all(), &bounds_for(id, 0.5));
                    if id % 3 == 0 {
                        c.remove(ObjectId(id)).unwrap();
                    }
                }
            });
        }
    });

    let expected: Vec<u64> = (0..THREADS * PER_THREAD).filter(|id| id % 3 != 0).collect();
    assert_eq!(c.len(), expected.len());

    for layer in Layer::all() {
        let index = c.layer(layer);
        let in_layer = expected
            .iter()
            .filter(|id| mask_for(**id).contains_layer(layer))
            .count();
        assert_eq!(index.len(), in_layer, "layer {layer} out of sync");
    }

    for id in expected {
        assert_eq!(c.layers_of(ObjectId(id)), Some(mask_for(id)));
        let hits = c.broad_phase(mask_for(id), &bounds_for(id, 0.5));
        assert!(hits.contains(&ObjectId(id)));
    }
}
