#![cfg(test)]

// Property tests for Table kept inside the crate so they can check the
// chain structure directly.

use crate::config::TableConfig;
use crate::policy::BinaryEq;
use crate::schedule::PRIMES;
use crate::table::Table;
use proptest::prelude::*;
use std::collections::BTreeMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Replace(usize, i32),
    Remove(usize),
    Get(usize),
    Has(String),
    Resize(u32),
    Iterate,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let has_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Replace(i, v)),
            3 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![
                has_pool.prop_map(|s: String| s),
                "[a-z]{0,6}".prop_map(|s| s)
            ]
            .prop_map(OpI::Has),
            1 => (0u32..5000).prop_map(OpI::Resize),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Walks every chain and checks the structural invariants: each bucket sits in
// the slot its cached hash selects, tails are the last node, and the number
// of reachable buckets equals `key_count`.
fn check_structure<V, H, E>(t: &Table<'_, V, H, E>) -> Result<(), TestCaseError> {
    let mut reachable = 0usize;
    for (slot, chain) in t.chains.iter().enumerate() {
        let mut last = None;
        let mut cur = chain.head;
        while let Some(node) = cur {
            let bucket = &t.nodes[node];
            prop_assert_eq!(bucket.hash % t.bucket_count(), slot as u32);
            reachable += 1;
            last = Some(node);
            cur = bucket.next;
        }
        prop_assert_eq!(chain.tail, last);
    }
    prop_assert_eq!(reachable, t.key_count() as usize);
    prop_assert_eq!(t.nodes.len(), t.key_count() as usize);
    prop_assert!(PRIMES.contains(&t.bucket_count()));
    Ok(())
}

// Property: State-machine equivalence against an insertion-ordered multimap.
// Invariants exercised across random operation sequences:
// - `put` never deduplicates; `get`/`remove` resolve to the oldest equal key.
// - `replace` overwrites the oldest equal key or appends when absent.
// - `has_key` parity with the model for pooled and unpooled keys.
// - `resize` and automatic growth keep every entry and stay on the schedule.
// - Iteration yields exactly the model's multiset of entries.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: Table<'_, i32> = TableConfig::new()
            .capacity(1)
            .load_factor(0.1)
            .build()
            .unwrap();
        let mut model: Vec<(String, i32)> = Vec::new();

        for op in ops {
            match op {
                OpI::Put(i, v) => {
                    sut.put(&pool[i], v).unwrap();
                    model.push((pool[i].clone(), v));
                }
                OpI::Replace(i, v) => {
                    let old = sut.replace(&pool[i], v).unwrap();
                    match model.iter_mut().find(|(k, _)| *k == pool[i]) {
                        Some((_, mv)) => {
                            prop_assert_eq!(old, Some(*mv));
                            *mv = v;
                        }
                        None => {
                            prop_assert_eq!(old, None);
                            model.push((pool[i].clone(), v));
                        }
                    }
                }
                OpI::Remove(i) => {
                    let got = sut.remove(&pool[i]);
                    let pos = model.iter().position(|(k, _)| *k == pool[i]);
                    let expected = pos.map(|p| model.remove(p).1);
                    prop_assert_eq!(got, expected);
                }
                OpI::Get(i) => {
                    let expected = model.iter().find(|(k, _)| *k == pool[i]).map(|(_, v)| v);
                    prop_assert_eq!(sut.get(&pool[i]), expected);
                }
                OpI::Has(s) => {
                    prop_assert_eq!(sut.has_key(&s), model.iter().any(|(k, _)| *k == s));
                }
                OpI::Resize(n) => {
                    sut.resize(n).unwrap();
                }
                OpI::Iterate => {
                    let mut seen: BTreeMap<Vec<u8>, Vec<i32>> = BTreeMap::new();
                    for (k, v) in sut.iter() {
                        seen.entry(k.to_vec()).or_default().push(*v);
                    }
                    let mut expected: BTreeMap<Vec<u8>, Vec<i32>> = BTreeMap::new();
                    for (k, v) in &model {
                        expected.entry(k.as_bytes().to_vec()).or_default().push(*v);
                    }
                    // Equal keys share one chain, so their order is preserved too.
                    prop_assert_eq!(seen, expected);
                }
                OpI::Clear => {
                    sut.clear();
                    model.clear();
                }
            }
            prop_assert_eq!(sut.key_count() as usize, model.len());
            check_structure(&sut)?;
        }
    }
}

// Property: resizing to any request keeps every entry reachable and lands on
// the scheduled prime for that request.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_resize_preserves_entries(
        keys in proptest::collection::btree_set("[a-z0-9]{1,8}", 0..200),
        requests in proptest::collection::vec(0u32..20_000, 1..6),
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let mut t = TableConfig::new().build_with(crate::policy::Djb2, BinaryEq).unwrap();
        for (i, k) in keys.iter().enumerate() {
            t.put(k, i).unwrap();
        }
        for n in requests {
            t.resize(n).unwrap();
            prop_assert_eq!(t.bucket_count(), crate::schedule::capacity_for(n));
            for (i, k) in keys.iter().enumerate() {
                prop_assert_eq!(t.get(k), Some(&i));
            }
            check_structure(&t)?;
        }
    }
}
