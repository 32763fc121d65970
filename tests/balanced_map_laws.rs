//! Property-based tests for BalancedOrderedMap.
//!
//! This module verifies that BalancedOrderedMap keeps its red-black
//! invariants and behaves like a sorted multimap model under arbitrary
//! sequences of inserts and deletes.

use std::collections::BTreeMap;

use proptest::prelude::*;
use rbmultimap::tree::BalancedOrderedMap;

// =============================================================================
// Strategy for generating test data
// =============================================================================

/// A small key alphabet so that duplicates are common.
fn arbitrary_key() -> impl Strategy<Value = String> {
    "[a-f]{1,2}".prop_map(|s| s)
}

fn arbitrary_value() -> impl Strategy<Value = String> {
    "[0-3]".prop_map(|s| s)
}

fn arbitrary_entries() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec((arbitrary_key(), arbitrary_value()), 0..80)
}

#[derive(Clone, Debug)]
enum Operation {
    Insert(String, String),
    Delete(String, String),
}

fn arbitrary_operations() -> impl Strategy<Value = Vec<Operation>> {
    let operation = prop_oneof![
        3 => (arbitrary_key(), arbitrary_value()).prop_map(|(key, value)| Operation::Insert(key, value)),
        2 => (arbitrary_key(), arbitrary_value()).prop_map(|(key, value)| Operation::Delete(key, value)),
    ];
    prop::collection::vec(operation, 0..200)
}

/// Sorted reference model: values per key in insertion order.
#[derive(Default)]
struct Model {
    entries: BTreeMap<String, Vec<String>>,
}

impl Model {
    fn insert(&mut self, key: &str, value: &str) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    fn delete(&mut self, key: &str, value: &str) -> usize {
        let Some(values) = self.entries.get_mut(key) else {
            return 0;
        };
        let before = values.len();
        values.retain(|stored| stored != value);
        let removed = before - values.len();
        if values.is_empty() {
            self.entries.remove(key);
        }
        removed
    }

    fn find(&self, key: &str) -> Vec<&str> {
        self.entries
            .get(key)
            .map(|values| values.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

fn height_bound(length: usize) -> f64 {
    2.0 * ((length + 1) as f64).log2()
}

// =============================================================================
// Invariant Law: every operation sequence leaves a valid red-black tree
// =============================================================================

proptest! {
    #[test]
    fn prop_invariants_hold_after_every_operation(operations in arbitrary_operations()) {
        let mut map = BalancedOrderedMap::new();
        for operation in operations {
            match operation {
                Operation::Insert(key, value) => map.insert(key, value),
                Operation::Delete(key, value) => {
                    map.delete(&key, &value);
                }
            }
            let checked = map.check_invariants();
            prop_assert!(checked.is_ok(), "{:?}\n{}", checked, map.diagram());
            prop_assert!(map.height() as f64 <= height_bound(map.len()));
        }
    }
}

// =============================================================================
// Model Law: the map agrees with a sorted multimap model
// =============================================================================

proptest! {
    #[test]
    fn prop_matches_sorted_multimap_model(operations in arbitrary_operations()) {
        let mut map = BalancedOrderedMap::new();
        let mut model = Model::default();

        for operation in operations {
            match operation {
                Operation::Insert(key, value) => {
                    map.insert(key.as_str(), value.as_str());
                    model.insert(&key, &value);
                }
                Operation::Delete(key, value) => {
                    prop_assert_eq!(map.delete(&key, &value), model.delete(&key, &value));
                }
            }
        }

        prop_assert_eq!(map.len(), model.len());
        for key in model.entries.keys() {
            prop_assert_eq!(map.find(key), model.find(key));
        }
        let expected: Vec<(&str, &str)> = model
            .entries
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key.as_str(), value.as_str())))
            .collect();
        let actual: Vec<(&str, &str)> = map.iter().collect();
        prop_assert_eq!(actual, expected);
    }
}

// =============================================================================
// BST Law: in-order keys never decrease
// =============================================================================

proptest! {
    #[test]
    fn prop_in_order_keys_are_sorted(entries in arbitrary_entries()) {
        let map: BalancedOrderedMap = entries.into_iter().collect();
        let keys: Vec<&str> = map.iter().map(|(key, _)| key).collect();
        prop_assert!(keys.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}

// =============================================================================
// Round-trip Law: insert then find contains the value; delete removes it
// =============================================================================

proptest! {
    #[test]
    fn prop_insert_find_delete_round_trip(
        entries in arbitrary_entries(),
        key in arbitrary_key(),
        value in arbitrary_value()
    ) {
        let mut map: BalancedOrderedMap = entries.into_iter().collect();
        map.insert(key.as_str(), value.as_str());
        prop_assert!(map.find(&key).contains(&value.as_str()));

        map.delete(&key, &value);
        prop_assert!(!map.find(&key).contains(&value.as_str()));
        prop_assert!(map.check_invariants().is_ok());
    }
}

// =============================================================================
// No-op Law: deleting an absent pair leaves the traversal unchanged
// =============================================================================

proptest! {
    #[test]
    fn prop_delete_absent_pair_is_noop(
        entries in arbitrary_entries(),
        key in arbitrary_key()
    ) {
        let map: BalancedOrderedMap = entries.into_iter().collect();
        let mut after = map.clone();

        prop_assert_eq!(after.delete(&key, "absent"), 0);
        prop_assert_eq!(after.len(), map.len());
        prop_assert_eq!(after.diagram().to_string(), map.diagram().to_string());
    }
}

// =============================================================================
// Contiguity Law: duplicates of a key form one in-order run
// =============================================================================

proptest! {
    #[test]
    fn prop_duplicates_stay_contiguous(operations in arbitrary_operations(), key in arbitrary_key()) {
        let mut map = BalancedOrderedMap::new();
        for operation in operations {
            match operation {
                Operation::Insert(inserted, value) => map.insert(inserted, value),
                Operation::Delete(deleted, value) => {
                    map.delete(&deleted, &value);
                }
            }
        }

        let positions: Vec<usize> = map
            .iter()
            .enumerate()
            .filter(|(_, (stored, _))| *stored == key)
            .map(|(position, _)| position)
            .collect();
        prop_assert!(positions.windows(2).all(|pair| pair[1] == pair[0] + 1));
        prop_assert_eq!(positions.len(), map.find(&key).len());
    }
}

// =============================================================================
// Traversal Law: traverse visits exactly the entries of iter, reversed
// =============================================================================

proptest! {
    #[test]
    fn prop_traverse_reverses_iter(entries in arbitrary_entries()) {
        let map: BalancedOrderedMap = entries.into_iter().collect();
        let mut reversed: Vec<(&str, &str)> = map
            .traverse()
            .map(|entry| (entry.key, entry.value))
            .collect();
        reversed.reverse();
        let ascending: Vec<(&str, &str)> = map.iter().collect();
        prop_assert_eq!(reversed, ascending);
    }
}
