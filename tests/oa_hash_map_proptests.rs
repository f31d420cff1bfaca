// OpenHashMap property tests against a std::collections::HashMap model.
//
// Property: public-surface equivalence under random op sequences.
//  - Model: std HashMap over a small key pool (pool indices shrink well).
//  - Operations: insert (guarded by a search to honor the unique-keys
//    precondition), erase via a found index, get, value_mut updates,
//    reserve, iterate.
//  - Invariants after each step: len/is_empty parity, presence parity for
//    the touched key, and get parity.
//  - Final check: iteration equals the model's full binding set.
use oa_hashmap::{OpenHashMap, SearchResult};
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Erase(usize),
    Get(usize),
    AddTo(usize, i32),
    Reserve(usize),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{1,6}", 1..=10).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            idx.clone().prop_map(Op::Erase),
            idx.clone().prop_map(Op::Get),
            (idx.clone(), -100i32..100).prop_map(|(i, d)| Op::AddTo(i, d)),
            (0usize..128).prop_map(Op::Reserve),
            Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..100).prop_map(move |ops| (pool.clone(), ops))
    })
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_model_equivalence((pool, ops) in arb_scenario()) {
        let mut sut: OpenHashMap<String, i32> = OpenHashMap::new();
        let mut model: HashMap<String, i32> = HashMap::new();

        for op in ops {
            match op {
                Op::Insert(i, v) => {
                    let key = pool[i].clone();
                    match sut.search(&key) {
                        SearchResult::Found(slot) => {
                            prop_assert!(model.contains_key(&key));
                            prop_assert_eq!(sut.key(slot), &key);
                        }
                        SearchResult::NotFound(token) => {
                            prop_assert!(!model.contains_key(&key));
                            let slot = sut.insert_searched(key.clone(), v, token);
                            prop_assert_eq!(sut.value(slot), &v);
                            model.insert(key, v);
                        }
                    }
                }
                Op::Erase(i) => {
                    let key = &pool[i];
                    if let SearchResult::Found(slot) = sut.search(key) {
                        let (k, v) = sut.erase(slot);
                        prop_assert_eq!(&k, key);
                        prop_assert_eq!(Some(v), model.remove(key));
                    } else {
                        prop_assert!(!model.contains_key(key));
                    }
                }
                Op::Get(i) => {
                    let key = &pool[i];
                    prop_assert_eq!(sut.get(key), model.get(key));
                    prop_assert_eq!(sut.contains_key(key), model.contains_key(key));
                }
                Op::AddTo(i, d) => {
                    let key = &pool[i];
                    match (sut.get_mut(key), model.get_mut(key)) {
                        (Some(v), Some(m)) => {
                            *v = v.wrapping_add(d);
                            *m = m.wrapping_add(d);
                        }
                        (None, None) => {}
                        _ => prop_assert!(false, "get_mut parity broken"),
                    }
                }
                Op::Reserve(n) => {
                    let capacity = sut.capacity();
                    sut.reserve(n);
                    prop_assert!(sut.capacity() >= capacity);
                }
                Op::Iterate => {
                    prop_assert_eq!(sut.iter().count(), model.len());
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
        }

        let seen: HashMap<String, i32> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(seen, model);
    }
}

// Property: erase/reinsert churn at fixed size never grows the table.
// Tombstone reclamation keeps capacity stable once the working set fits.
proptest! {
    #[test]
    fn prop_churn_keeps_capacity_stable(rounds in 1usize..200) {
        let mut map: OpenHashMap<u64, u64> = OpenHashMap::with_capacity(16);
        for k in 0..16u64 {
            map.insert(k, k);
        }
        let capacity = map.capacity();

        for round in 0..rounds as u64 {
            let key = round % 16;
            if let SearchResult::Found(slot) = map.search(&key) {
                map.erase(slot);
            }
            map.insert(key, round);
            prop_assert_eq!(map.len(), 16);
            prop_assert_eq!(map.capacity(), capacity, "churn must not grow the table");
        }
        for k in 0..16u64 {
            prop_assert!(map.contains_key(&k));
        }
    }
}
