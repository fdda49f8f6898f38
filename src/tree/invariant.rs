//! Consistency checks over the whole node graph.
//!
//! A failed check means the tree itself is broken, never that the caller did
//! something wrong, so nothing here is part of the public error surface.

#![cfg_attr(not(any(test, feature = "invariant-checks")), allow(dead_code))]

use std::fmt;

use smallvec::SmallVec;

use super::AvlTree;
use super::arena::NodeIndex;
use super::traversal::STACK_INLINE_CAPACITY;

/// The first broken invariant found by a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InvariantViolation {
    /// A balance factor outside -1..=1.
    Unbalanced { slot: usize, balance_factor: i32 },
    /// A cached height that disagrees with the children's heights.
    StaleHeight { slot: usize, cached: i32, expected: i32 },
    /// A child whose parent link does not point back, or a root with a parent.
    BrokenParentLink { slot: usize },
    /// Two neighbours in key order that are not strictly increasing.
    OutOfOrder { slot: usize },
    /// The stored length disagrees with the reachable or allocated nodes.
    LengthMismatch { length: usize, reachable: usize },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbalanced {
                slot,
                balance_factor,
            } => write!(formatter, "slot {slot} has balance factor {balance_factor}"),
            Self::StaleHeight {
                slot,
                cached,
                expected,
            } => write!(
                formatter,
                "slot {slot} caches height {cached} but its children give {expected}"
            ),
            Self::BrokenParentLink { slot } => {
                write!(formatter, "slot {slot} has an inconsistent parent link")
            }
            Self::OutOfOrder { slot } => {
                write!(formatter, "slot {slot} is not greater than its predecessor")
            }
            Self::LengthMismatch { length, reachable } => write!(
                formatter,
                "length is {length} but {reachable} nodes are reachable"
            ),
        }
    }
}

impl<K, V> AvlTree<K, V> {
    /// Checks links, cached heights, balance factors and the length.
    pub(crate) fn check_structure(&self) -> Result<(), InvariantViolation> {
        let mut reachable = 0;
        if let Some(root) = self.root {
            if self.arena[root].parent.is_some() {
                return Err(InvariantViolation::BrokenParentLink { slot: root.slot() });
            }
            let mut stack: SmallVec<[NodeIndex; STACK_INLINE_CAPACITY]> = SmallVec::new();
            stack.push(root);
            while let Some(index) = stack.pop() {
                reachable += 1;
                self.check_node(index)?;
                let node = &self.arena[index];
                stack.extend([node.left, node.right].into_iter().flatten());
            }
        }

        if reachable != self.length || self.arena.occupied() != self.length {
            return Err(InvariantViolation::LengthMismatch {
                length: self.length,
                reachable,
            });
        }
        Ok(())
    }

    /// Structural counterpart of
    /// [`debug_assert_invariants`](Self::debug_assert_invariants) for code
    /// without an `Ord` bound.
    #[inline]
    pub(crate) fn debug_assert_structure(&self) {
        #[cfg(all(debug_assertions, feature = "invariant-checks"))]
        if let Err(violation) = self.check_structure() {
            panic!("AVL invariant violated: {violation}");
        }
    }

    fn check_node(&self, index: NodeIndex) -> Result<(), InvariantViolation> {
        let node = &self.arena[index];
        for child in [node.left, node.right].into_iter().flatten() {
            if self.arena[child].parent != Some(index) {
                return Err(InvariantViolation::BrokenParentLink { slot: child.slot() });
            }
        }

        let expected = 1 + self
            .arena
            .height_of(node.left)
            .max(self.arena.height_of(node.right));
        if node.height != expected {
            return Err(InvariantViolation::StaleHeight {
                slot: index.slot(),
                cached: node.height,
                expected,
            });
        }

        let balance_factor = self.arena.balance_factor(index);
        if !(-1..=1).contains(&balance_factor) {
            return Err(InvariantViolation::Unbalanced {
                slot: index.slot(),
                balance_factor,
            });
        }
        Ok(())
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Runs every check, including strict key order along the in-order walk.
    pub(crate) fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.check_structure()?;

        let mut previous: Option<NodeIndex> = None;
        let mut current = self.root.map(|root| self.arena.leftmost(root));
        while let Some(index) = current {
            if let Some(previous) = previous
                && self.arena[previous].key >= self.arena[index].key
            {
                return Err(InvariantViolation::OutOfOrder { slot: index.slot() });
            }
            previous = Some(index);
            current = self.arena.successor(index);
        }
        Ok(())
    }

    /// Panics on a broken invariant when built with `debug_assertions` and
    /// the `invariant-checks` feature. A no-op otherwise.
    #[inline]
    pub(crate) fn debug_assert_invariants(&self) {
        #[cfg(all(debug_assertions, feature = "invariant-checks"))]
        if let Err(violation) = self.check_invariants() {
            panic!("AVL invariant violated: {violation}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use std::collections::BTreeMap;

    #[rstest]
    fn test_empty_tree_is_valid() {
        let tree: AvlTree<i32, ()> = AvlTree::new();
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[rstest]
    fn test_detects_stale_height() {
        let mut tree: AvlTree<i32, ()> = (1..=3).map(|key| (key, ())).collect();
        let root = tree.root.unwrap();
        tree.arena[root].height = 5;
        assert_eq!(
            tree.check_invariants(),
            Err(InvariantViolation::StaleHeight {
                slot: root.slot(),
                cached: 5,
                expected: 1,
            })
        );
    }

    #[rstest]
    fn test_detects_out_of_order_keys() {
        let mut tree: AvlTree<i32, ()> = (1..=3).map(|key| (key, ())).collect();
        let root = tree.root.unwrap();
        tree.arena[root].key = 10;
        assert!(matches!(
            tree.check_invariants(),
            Err(InvariantViolation::OutOfOrder { .. })
        ));
    }

    #[rstest]
    fn test_detects_length_mismatch() {
        let mut tree: AvlTree<i32, ()> = (1..=3).map(|key| (key, ())).collect();
        tree.length = 2;
        assert_eq!(
            tree.check_structure(),
            Err(InvariantViolation::LengthMismatch {
                length: 2,
                reachable: 3,
            })
        );
    }

    #[rstest]
    fn test_violation_display() {
        let violation = InvariantViolation::Unbalanced {
            slot: 4,
            balance_factor: 2,
        };
        assert_eq!(violation.to_string(), "slot 4 has balance factor 2");
    }

    #[derive(Debug, Clone)]
    enum Operation {
        Insert(u8, u32),
        Remove(u8),
    }

    fn operation() -> impl Strategy<Value = Operation> {
        prop_oneof![
            (any::<u8>(), any::<u32>()).prop_map(|(key, value)| Operation::Insert(key, value)),
            any::<u8>().prop_map(Operation::Remove),
        ]
    }

    proptest! {
        /// Every step of a random workload leaves a valid tree that agrees
        /// with a `BTreeMap` model that keeps the first value per key.
        #[test]
        fn prop_random_workload_keeps_invariants(
            operations in prop::collection::vec(operation(), 0..300)
        ) {
            let mut tree = AvlTree::new();
            let mut model = BTreeMap::new();

            for operation in operations {
                match operation {
                    Operation::Insert(key, value) => {
                        let (position, inserted) = tree.insert(key, value);
                        let expected_inserted = !model.contains_key(&key);
                        model.entry(key).or_insert(value);
                        prop_assert_eq!(inserted, expected_inserted);
                        prop_assert_eq!(tree.get(position), Ok(&model[&key]));
                    }
                    Operation::Remove(key) => {
                        prop_assert_eq!(tree.remove(&key), model.remove(&key).is_some());
                    }
                }
                prop_assert_eq!(tree.check_invariants(), Ok(()));
                prop_assert_eq!(tree.len(), model.len());
            }

            let entries: Vec<(u8, u32)> = tree.iter().map(|(key, value)| (*key, *value)).collect();
            let expected: Vec<(u8, u32)> = model.into_iter().collect();
            prop_assert_eq!(entries, expected);
        }

        /// Positions of surviving entries keep resolving to their values
        /// through any sequence of removals.
        #[test]
        fn prop_positions_survive_removals(
            keys in prop::collection::btree_set(any::<u16>(), 1..120),
            removals in prop::collection::vec(any::<prop::sample::Index>(), 0..60)
        ) {
            let keys: Vec<u16> = keys.into_iter().collect();
            let mut tree = AvlTree::new();
            let positions: Vec<_> = keys
                .iter()
                .map(|key| tree.insert(*key, u32::from(*key) * 3).0)
                .collect();

            let mut removed = vec![false; keys.len()];
            for index in removals {
                let slot = index.index(keys.len());
                prop_assert_eq!(tree.remove(&keys[slot]), !removed[slot]);
                removed[slot] = true;
                prop_assert_eq!(tree.check_invariants(), Ok(()));
            }

            for (slot, key) in keys.iter().enumerate() {
                if removed[slot] {
                    prop_assert!(tree.get(positions[slot]).is_err());
                } else {
                    prop_assert_eq!(tree.get(positions[slot]), Ok(&(u32::from(*key) * 3)));
                }
            }
        }
    }
}
