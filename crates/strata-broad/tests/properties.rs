//! Model-checked properties of the coordinator.

use std::collections::HashMap;

use proptest::prelude::*;
use rustc_hash::FxHashSet;
use strata_broad::{CoordinatorError, LayerCoordinator, LayerMask};
use strata_index::{Aabb, GridConfig, GridIndex, ObjectId};

#[derive(Debug, Clone)]
enum Op {
    Insert(u64, u16, Aabb),
    Remove(u64),
    Update(u64, Aabb),
}

fn arb_box() -> impl Strategy<Value = Aabb> {
    (-60.0f64..60.0, -60.0f64..60.0, 0.0f64..24.0, 0.0f64..24.0)
        .prop_map(|(x, y, w, h)| Aabb::new([x, y], [x + w, y + h]).unwrap())
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u64..24, any::<u16>(), arb_box()).prop_map(|(id, m, b)| Op::Insert(id, m, b)),
        1 => (0u64..24).prop_map(Op::Remove),
        2 => (0u64..24, arb_box()).prop_map(|(id, b)| Op::Update(id, b)),
    ]
}

fn coordinator() -> LayerCoordinator<GridIndex> {
    LayerCoordinator::with_index_config(&GridConfig::default())
}

fn set(ids: &[u64]) -> FxHashSet<ObjectId> {
    ids.iter().copied().map(ObjectId).collect()
}

#[test]
fn test_two_layer_scenario() {
    let c = coordinator();
    let unit = Aabb::new([0.0, 0.0], [1.0, 1.0]).unwrap();
    c.insert(ObjectId(1), LayerMask::from_bits_retain(0b0000_0000_0000_0101), &unit)
        .unwrap();

    assert_eq!(
        c.broad_phase(LayerMask::from_bits_retain(0b0000_0000_0000_0100), &unit),
        set(&[1])
    );
    assert_eq!(
        c.broad_phase(LayerMask::from_bits_retain(0b0000_0000_0000_0010), &unit),
        set(&[])
    );
}

#[test]
fn test_mask_change_needs_remove_then_insert() {
    let c = coordinator();
    let unit = Aabb::new([0.0, 0.0], [1.0, 1.0]).unwrap();
    c.insert(ObjectId(1), LayerMask::L0, &unit).unwrap();

    c.remove(ObjectId(1)).unwrap();
    c.insert(ObjectId(1), LayerMask::L5, &unit).unwrap();

    assert!(c.broad_phase(LayerMask::L0, &unit).is_empty());
    assert_eq!(c.broad_phase(LayerMask::L5, &unit), set(&[1]));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn membership_and_queries_match_model(
        ops in prop::collection::vec(arb_op(), 1..80),
        query in arb_box(),
        query_mask in any::<u16>(),
    ) {
        let c = coordinator();
        let mut model: HashMap<ObjectId, (LayerMask, Aabb)> = HashMap::new();

        for op in ops {
            match op {
                Op::Insert(id, mask, bounds) => {
                    let (id, mask) = (ObjectId(id), LayerMask::from_bits_retain(mask));
                    let result = c.insert(id, mask, &bounds);
                    if model.contains_key(&id) {
                        prop_assert!(
                            matches!(result, Err(CoordinatorError::DuplicateObject(_))),
                            "duplicate insert of {} not rejected", id
                        );
                    } else {
                        prop_assert!(result.is_ok());
                        model.insert(id, (mask, bounds));
                    }
                }
                Op::Remove(id) => {
                    let id = ObjectId(id);
                    let result = c.remove(id);
                    if model.remove(&id).is_some() {
                        prop_assert!(result.is_ok());
                    } else {
                        prop_assert!(matches!(result, Err(CoordinatorError::UnknownObject(_))));
                    }
                }
                Op::Update(id, bounds) => {
                    let id = ObjectId(id);
                    let result = c.update(id, &bounds);
                    if let Some(entry) = model.get_mut(&id) {
                        prop_assert!(result.is_ok());
                        entry.1 = bounds;
                    } else {
                        prop_assert!(matches!(result, Err(CoordinatorError::UnknownObject(_))));
                    }
                }
            }
        }

        // Table holds exactly the live objects with the masks they were inserted with.
        let mut members = c.members();
        members.sort_by_key(|(id, _)| *id);
        let mut expected: Vec<_> = model.iter().map(|(id, (mask, _))| (*id, *mask)).collect();
        expected.sort_by_key(|(id, _)| *id);
        prop_assert_eq!(members, expected);

        // Query equals brute force over the model, each id once.
        let query_mask = LayerMask::from_bits_retain(query_mask);
        let hits = c.broad_phase(query_mask, &query);
        let brute: FxHashSet<ObjectId> = model
            .iter()
            .filter(|(_, (mask, bounds))| mask.intersects(query_mask) && bounds.overlaps(&query))
            .map(|(id, _)| *id)
            .collect();
        prop_assert_eq!(&hits, &brute);

        // Same arguments, no mutation in between, same answer.
        prop_assert_eq!(hits, c.broad_phase(query_mask, &query));

        // Every object is found with its own mask and box; empty masks never are.
        for (id, (mask, bounds)) in &model {
            let found = c.broad_phase(*mask, bounds).contains(id);
            prop_assert_eq!(found, !mask.is_empty());
            let everywhere = c.broad_phase(LayerMask::all(), bounds).contains(id);
            prop_assert_eq!(everywhere, !mask.is_empty());
        }
    }
}
