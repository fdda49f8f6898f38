//! Insertion.

use std::cmp::Ordering;

use super::arena::Node;
use super::rotation::Trigger;
use super::{AvlTree, Position};

impl<K: Ord, V> AvlTree<K, V> {
    /// Inserts `value` under `key` unless the key is already present.
    ///
    /// Returns the position of the entry holding `key` together with `true`
    /// if a new entry was created. When the key already exists nothing
    /// changes: the stored value is kept, `value` is dropped, and the flag is
    /// `false`.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avltree::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// let (first, inserted) = tree.insert(3, "first");
    /// assert!(inserted);
    ///
    /// let (second, inserted) = tree.insert(3, "second");
    /// assert!(!inserted);
    /// assert_eq!(first, second);
    /// assert_eq!(tree.len(), 1);
    /// assert_eq!(tree.get(tree.find(&3)), Ok(&"first"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> (Position, bool) {
        let Some(mut current) = self.root else {
            let index = self.arena.allocate(Node::leaf(key, value, None));
            self.root = Some(index);
            self.length = 1;
            self.debug_assert_invariants();
            return (self.position_of(index), true);
        };

        loop {
            let node = &self.arena[current];
            let (next, goes_left) = match key.cmp(&node.key) {
                Ordering::Less => (node.left, true),
                Ordering::Greater => (node.right, false),
                Ordering::Equal => return (self.position_of(current), false),
            };
            if let Some(next) = next {
                current = next;
                continue;
            }

            let index = self.arena.allocate(Node::leaf(key, value, Some(current)));
            if goes_left {
                self.arena[current].left = Some(index);
            } else {
                self.arena[current].right = Some(index);
            }
            self.length += 1;
            self.rebalance(current, Trigger::Insert);
            self.debug_assert_invariants();
            return (self.position_of(index), true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_insert_into_empty_tree_creates_root() {
        let mut tree = AvlTree::new();
        let (position, inserted) = tree.insert(1, "one");

        assert!(inserted);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.height(), Some(0));
        assert_eq!(tree.get(position), Ok(&"one"));
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[rstest]
    fn test_duplicate_insert_keeps_first_value() {
        let mut tree = AvlTree::new();
        tree.insert(3, "first".to_string());
        let (position, inserted) = tree.insert(3, "second".to_string());

        assert!(!inserted);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(position).map(String::as_str), Ok("first"));
    }

    #[rstest]
    #[case::ascending((1..=7).collect::<Vec<i32>>())]
    #[case::descending((1..=7).rev().collect::<Vec<i32>>())]
    #[case::zigzag(vec![4, 1, 7, 2, 6, 3, 5])]
    fn test_seven_keys_give_a_perfect_tree(#[case] keys: Vec<i32>) {
        let mut tree = AvlTree::new();
        for key in keys {
            tree.insert(key, ());
            assert_eq!(tree.check_invariants(), Ok(()));
        }
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.height(), Some(2));
    }

    #[rstest]
    fn test_positions_survive_later_inserts() {
        let mut tree = AvlTree::new();
        let positions: Vec<_> = (0..64).map(|key| tree.insert(key, key * 2).0).collect();

        for (key, position) in positions.into_iter().enumerate() {
            let key = i32::try_from(key).unwrap();
            assert_eq!(tree.get(position), Ok(&(key * 2)));
            assert_eq!(tree.find(&key), position);
        }
        assert_eq!(tree.check_invariants(), Ok(()));
    }
}
