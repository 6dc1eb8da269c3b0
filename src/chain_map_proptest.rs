#![cfg(test)]

// Property tests for ChainMap kept inside the crate so they can inspect
// chain structure, not just the public answers.

use crate::{ChainMap, Coordinate, INITIAL_CAPACITY};
use hashbrown::HashMap;
use proptest::prelude::*;

// Pool-indexed operations: indices shrink toward earlier coordinates and the
// pool itself shrinks, which keeps counterexamples small.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    TryPut(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(i32, i32),
    Bump(usize, i32),
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<Coordinate>, Vec<Op>)> {
    // Narrow ranges make digest collisions common.
    let coord = (-4i32..=4, -250i32..=250).prop_map(|(x, y)| Coordinate::new(x, y));
    proptest::collection::vec(coord, 1..=40).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::TryPut(i, v)),
            2 => idx.clone().prop_map(Op::Remove),
            2 => idx.clone().prop_map(Op::Get),
            1 => (-4i32..=4, -250i32..=250).prop_map(|(x, y)| Op::Contains(x, y)),
            1 => (idx.clone(), -100i32..100).prop_map(|(i, d)| Op::Bump(i, d)),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: state-machine equivalence against hashbrown::HashMap.
// Checked after every operation:
// - put/try_put return the previous value the model held.
// - get/contains_key/remove agree with the model.
// - len() == model size == entries reachable by walking every chain.
// - every key sits in the bucket its digest selects.
// - capacity never shrinks and stays within the load factor.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: ChainMap<Coordinate, i32> = ChainMap::new();
        let mut model: HashMap<Coordinate, i32> = HashMap::new();
        let mut last_capacity = sut.capacity();

        for op in ops {
            match op {
                Op::Put(i, v) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.put(k, v), model.insert(k, v));
                }
                Op::TryPut(i, v) => {
                    let k = pool[i];
                    let got = sut.try_put(k, v).expect("small maps always grow");
                    prop_assert_eq!(got, model.insert(k, v));
                }
                Op::Remove(i) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.remove(&k), model.remove(&k));
                    prop_assert!(!sut.contains_key(&k));
                }
                Op::Get(i) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.get(&k), model.get(&k));
                }
                Op::Contains(x, y) => {
                    let k = Coordinate::new(x, y);
                    prop_assert_eq!(sut.contains_key(&k), model.contains_key(&k));
                }
                Op::Bump(i, d) => {
                    let k = pool[i];
                    match (sut.get_mut(&k), model.get_mut(&k)) {
                        (Some(a), Some(b)) => {
                            *a = a.wrapping_add(d);
                            *b = b.wrapping_add(d);
                        }
                        (None, None) => {}
                        (a, b) => prop_assert!(false, "get_mut disagreed: {:?} vs {:?}", a, b),
                    }
                }
                Op::Clear => {
                    sut.clear();
                    model.clear();
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            prop_assert_eq!(sut.reachable(), sut.len());
            prop_assert!(sut.keys_in_home_buckets());
            prop_assert!(sut.capacity() >= last_capacity);
            prop_assert!(sut.len() as f64 <= 0.7 * sut.capacity() as f64);
            last_capacity = sut.capacity();
        }

        // Final contents match the model exactly.
        for (k, v) in &model {
            prop_assert_eq!(sut.get(k), Some(v));
        }
        prop_assert_eq!(sut.iter().count(), model.len());
    }

    // Property: growth preserves contents. Enough distinct keys to force
    // several doublings, each retrievable afterward; len is unaffected.
    #[test]
    fn prop_rehash_preserves_contents(keys in proptest::collection::hash_set((any::<i32>(), any::<i32>()), 8..200)) {
        let mut sut = ChainMap::new();
        for (n, &(x, y)) in keys.iter().enumerate() {
            sut.put(Coordinate::new(x, y), n);
        }
        prop_assert!(sut.capacity() > INITIAL_CAPACITY);
        prop_assert_eq!(sut.len(), keys.len());
        prop_assert_eq!(sut.reachable(), keys.len());
        for (n, &(x, y)) in keys.iter().enumerate() {
            prop_assert_eq!(sut.get(&Coordinate::new(x, y)), Some(&n));
        }
    }
}
