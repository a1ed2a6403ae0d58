#![cfg(test)]

// Property tests for Table kept inside the crate so they can inspect the
// index slots and record bookkeeping alongside the public behavior.

use crate::error::{discard, Error};
use crate::keys::{KeyEq, KeyHasher};
use crate::probe::Slot;
use crate::table::{DefaultTable, Table};
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

type HashFn = fn(&String) -> u64;
type EqFn = fn(&String, &String) -> bool;

fn by_len(k: &String) -> u64 {
    k.len() as u64
}
fn by_zero(_: &String) -> u64 {
    0
}
fn same(a: &String, b: &String) -> bool {
    a == b
}

// Pool-indexed operations: indices shrink toward earlier keys and the
// op list shrinks in length.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Remove(usize),
    Search(usize),
    Mutate(usize, i32),
    Compress,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<Op>)> {
    (1usize..=8, proptest::collection::vec("[a-z]{1,5}", 1..=12)).prop_flat_map(
        |(capacity, pool)| {
            let idx = 0..pool.len();
            let op = prop_oneof![
                4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
                2 => idx.clone().prop_map(Op::Remove),
                2 => idx.clone().prop_map(Op::Search),
                1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
                1 => Just(Op::Compress),
                1 => Just(Op::Iterate),
            ];
            proptest::collection::vec(op, 1..80)
                .prop_map(move |ops| (capacity, pool.clone(), ops))
        },
    )
}

// Structural checks after every operation:
// - `len` matches the model and never exceeds capacity.
// - Occupied slots are exactly `len`, distinct, and in range of the records.
// - Every model key is reachable with its model value; iteration yields the
//   model's key set.
// - Cleared records never pile up past twice the table size.
fn check_structure<H, E>(
    t: &Table<String, i32, H, E>,
    model: &HashMap<String, i32>,
) -> Result<(), TestCaseError>
where
    H: KeyHasher<String>,
    E: KeyEq<String>,
{
    prop_assert_eq!(t.len(), model.len());
    prop_assert!(t.len() <= t.capacity());

    let occupied: Vec<usize> = t
        .slots()
        .iter()
        .filter_map(|s| match s {
            Slot::Occupied(i) => Some(*i),
            _ => None,
        })
        .collect();
    prop_assert_eq!(occupied.len(), t.len());
    let distinct: BTreeSet<usize> = occupied.iter().copied().collect();
    prop_assert_eq!(distinct.len(), occupied.len());
    prop_assert!(occupied.iter().all(|&i| i < t.record_count()));
    prop_assert!(t.record_count() <= 2 * t.capacity().max(4));

    for (k, v) in model {
        prop_assert_eq!(t.search(k).unwrap(), Some(v));
    }
    let keys: BTreeSet<String> = t.iter().map(|(k, _)| k.clone()).collect();
    let model_keys: BTreeSet<String> = model.keys().cloned().collect();
    prop_assert_eq!(keys, model_keys);
    Ok(())
}

// State-machine equivalence against std::collections::HashMap.
// - Inserting a present key replaces the value and destroys the old one once.
// - Inserting a new key succeeds iff the table has fewer than `capacity`
//   keys; otherwise `OutOfRoom` and nothing changes.
// - Removing hands the stored value to the destructor; absent keys are no-ops.
// - Compression keeps every live key and removes all tombstones.
fn run<H, E>(
    mut t: Table<String, i32, H, E>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    H: KeyHasher<String>,
    E: KeyEq<String>,
{
    let mut model: HashMap<String, i32> = HashMap::new();
    let destroyed = RefCell::new(Vec::new());

    for op in ops {
        match op {
            Op::Insert(i, v) => {
                let k = pool[i].clone();
                let old = model.get(&k).copied();
                let room = model.len() < t.capacity();
                let before = destroyed.borrow().len();
                let r = t.insert(k.clone(), v, |prev| {
                    destroyed.borrow_mut().push(prev);
                    Ok(())
                });
                match r {
                    Ok(()) => {
                        prop_assert!(old.is_some() || room, "insert must fail when full");
                        model.insert(k, v);
                    }
                    Err(Error::OutOfRoom { .. }) => {
                        prop_assert!(
                            old.is_none() && !room,
                            "OutOfRoom only for a new key in a full table"
                        );
                    }
                    Err(e) => prop_assert!(false, "unexpected error: {}", e),
                }
                let dropped: Vec<i32> = destroyed.borrow()[before..].to_vec();
                let expected: Vec<i32> = old.into_iter().collect();
                prop_assert_eq!(dropped, expected);
            }
            Op::Remove(i) => {
                let k = &pool[i];
                let expected = model.remove(k);
                let seen = RefCell::new(None);
                t.remove(k, discard, |v| {
                    *seen.borrow_mut() = Some(v);
                    Ok(())
                })
                .unwrap();
                prop_assert_eq!(seen.into_inner(), expected);
                prop_assert!(t.search(k).unwrap().is_none());
            }
            Op::Search(i) => {
                let k = &pool[i];
                prop_assert_eq!(t.search(k).unwrap(), model.get(k));
                prop_assert_eq!(t.contains_key(k), model.contains_key(k));
            }
            Op::Mutate(i, d) => {
                let k = &pool[i];
                match (t.get_mut(k), model.get_mut(k)) {
                    (Some(v), Some(m)) => {
                        *v = v.wrapping_add(d);
                        *m = m.wrapping_add(d);
                    }
                    (None, None) => {}
                    _ => prop_assert!(false, "presence mismatch for {:?}", k),
                }
            }
            Op::Compress => {
                let live = t.len();
                t.compress().unwrap();
                prop_assert_eq!(t.record_count(), live);
                prop_assert!(!t.slots().contains(&Slot::Tombstone));
            }
            Op::Iterate => {
                let seen: BTreeMap<String, i32> = t.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let expected: BTreeMap<String, i32> = model.clone().into_iter().collect();
                prop_assert_eq!(seen, expected);
            }
        }
        check_structure(&t, &model)?;
    }
    Ok(())
}

// Property: model equivalence with keys hashed by length, so most keys in
// the pool collide on a handful of home slots.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_len_hash((capacity, pool, ops) in arb_scenario()) {
        let t = Table::new(capacity, by_len as HashFn, same as EqFn).unwrap();
        run(t, &pool, ops)?;
    }
}

// Property: same invariants under a constant hash, the worst case where every
// key shares one chain and tombstones sit between all of them.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((capacity, pool, ops) in arb_scenario()) {
        let t = Table::new(capacity, by_zero as HashFn, same as EqFn).unwrap();
        run(t, &pool, ops)?;
    }
}

// Property: same invariants with the default Hash/Eq capabilities.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_default_hash((capacity, pool, ops) in arb_scenario()) {
        let t: DefaultTable<String, i32> = DefaultTable::with_capacity(capacity).unwrap();
        run(t, &pool, ops)?;
    }
}
