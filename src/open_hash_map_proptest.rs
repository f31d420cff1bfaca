#![cfg(test)]

// Property tests for OpenHashMap kept inside the crate so they can read
// the private counters and slot states the public API hides.

use crate::open_hash_map::{OpenHashMap, SearchResult};
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Erase(usize),
    Get(usize),
    Reserve(usize),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{1,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            idx.clone().prop_map(Op::Erase),
            idx.clone().prop_map(Op::Get),
            (0usize..64).prop_map(Op::Reserve),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: structural invariants hold after every operation.
// - Capacity is a power of two, or zero before the first growth.
// - entries + tombstones <= capacity, and both counters match the actual
//   slot states (tombstone reuse decrements the tombstone counter).
// - A capacity change only ever happens through growth, which sweeps all
//   tombstones and lands at a load factor <= 2/3.
// - Contents always match a std::collections::HashMap model.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_invariants_and_model_parity((pool, ops) in arb_scenario()) {
        // Pool entries may repeat; dedupe so Insert can use contains_key.
        let mut sut: OpenHashMap<String, i32> = OpenHashMap::new();
        let mut model: HashMap<String, i32> = HashMap::new();
        let mut capacity = sut.capacity();

        for op in ops {
            match op {
                Op::Insert(i, v) => {
                    let key = pool[i].clone();
                    if model.contains_key(&key) {
                        prop_assert!(sut.search(&key).is_found());
                    } else {
                        let slot = sut.insert(key.clone(), v);
                        prop_assert_eq!(sut.value(slot), &v);
                        model.insert(key, v);
                    }
                }
                Op::Erase(i) => {
                    let key = &pool[i];
                    match sut.search(key) {
                        SearchResult::Found(slot) => {
                            let (k, v) = sut.erase(slot);
                            prop_assert_eq!(&k, key);
                            prop_assert_eq!(Some(v), model.remove(key));
                        }
                        SearchResult::NotFound(_) => {
                            prop_assert!(!model.contains_key(key));
                        }
                    }
                }
                Op::Get(i) => {
                    let key = &pool[i];
                    prop_assert_eq!(sut.get(key), model.get(key));
                }
                Op::Reserve(n) => {
                    sut.reserve(n);
                }
            }

            let (entries, tombstones) = sut.counters();
            prop_assert_eq!(entries, model.len());
            prop_assert_eq!(sut.len(), model.len());
            prop_assert!(sut.capacity() == 0 || sut.capacity().is_power_of_two());
            prop_assert!(entries + tombstones <= sut.capacity());
            prop_assert_eq!(tombstones, sut.tombstone_slots());

            if sut.capacity() != capacity {
                // Fresh growth: tombstones swept, load bounded.
                prop_assert!(sut.capacity() > capacity);
                prop_assert_eq!(sut.tombstone_slots(), 0);
                prop_assert!(3 * sut.len() <= 2 * sut.capacity());
                capacity = sut.capacity();
            }
        }

        // Final parity: iteration yields exactly the model's bindings.
        let seen: HashMap<String, i32> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(seen, model);
    }
}
