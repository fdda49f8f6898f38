//! Removal, including the structural swap used for nodes with two children.

use std::borrow::Borrow;

use super::AvlTree;
use super::arena::{Link, Node, NodeIndex};
use super::rotation::Trigger;
use crate::tracing_helpers::trace_log;

impl<K: Ord, V> AvlTree<K, V> {
    /// Removes the entry with `key`. Returns `true` if there was one.
    ///
    /// Positions of every other entry stay valid. In particular, when the
    /// removed node had two children its in-order successor is moved into
    /// its place as a node, not by copying the successor's key and value, so
    /// a position naming the successor still resolves to the same value.
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
    /// let mut tree: AvlTree<i32, &str> =
    ///     [(5, "five"), (3, "three"), (8, "eight"), (7, "seven")].into_iter().collect();
    /// let successor = tree.find(&7);
    ///
    /// assert!(tree.remove(&5));
    /// assert!(!tree.remove(&5));
    /// assert_eq!(tree.get(successor), Ok(&"seven"));
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Removes the entry with `key` and returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avltree::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert("a".to_string(), 1);
    /// assert_eq!(tree.take("a"), Some(("a".to_string(), 1)));
    /// assert_eq!(tree.take("a"), None);
    /// ```
    pub fn take<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let index = self.locate(key)?;
        if let (Some(_), Some(right)) = (self.arena[index].left, self.arena[index].right) {
            let successor = self.arena.leftmost(right);
            self.swap_positions(index, successor);
        }
        let removed = self.unlink(index);
        self.length -= 1;
        self.debug_assert_invariants();
        Some((removed.key, removed.value))
    }
}

impl<K, V> AvlTree<K, V> {
    /// Splices out a node with at most one child and rebalances from its
    /// former parent.
    fn unlink(&mut self, index: NodeIndex) -> Node<K, V> {
        let node = &self.arena[index];
        let parent = node.parent;
        let child = node.right.or(node.left);
        debug_assert!(
            node.left.is_none() || node.right.is_none(),
            "unlink of slot {} with two children",
            index.slot()
        );

        if let Some(child) = child {
            self.arena[child].parent = parent;
        }
        self.replace_child(parent, index, child);
        let removed = self.arena.release(index);
        if let Some(parent) = parent {
            self.rebalance(parent, Trigger::Remove);
        }
        removed
    }

    /// Exchanges the tree positions of two nodes: their parent, child and
    /// height fields trade places while keys and values stay in their slots.
    ///
    /// Links that pointed at one of the pair are relabelled to the other, so
    /// when the two nodes are parent and child the former child ends up as
    /// the parent rather than as its own parent.
    fn swap_positions(&mut self, first: NodeIndex, second: NodeIndex) {
        let relabel = |link: Link| {
            link.map(|index| {
                if index == first {
                    second
                } else if index == second {
                    first
                } else {
                    index
                }
            })
        };

        let first_parent = self.arena[first].parent;
        let second_parent = self.arena[second].parent;
        let first_is_left = first_parent.is_some_and(|parent| self.arena[parent].left == Some(first));
        let second_is_left =
            second_parent.is_some_and(|parent| self.arena[parent].left == Some(second));

        let (first_left, first_right, first_height) = {
            let node = &self.arena[first];
            (node.left, node.right, node.height)
        };
        let (second_left, second_right, second_height) = {
            let node = &self.arena[second];
            (node.left, node.right, node.height)
        };

        {
            let node = &mut self.arena[first];
            node.parent = relabel(second_parent);
            node.left = relabel(second_left);
            node.right = relabel(second_right);
            node.height = second_height;
        }
        {
            let node = &mut self.arena[second];
            node.parent = relabel(first_parent);
            node.left = relabel(first_left);
            node.right = relabel(first_right);
            node.height = first_height;
        }

        self.attach_in_place_of(first_parent, first_is_left, second);
        self.attach_in_place_of(second_parent, second_is_left, first);
        self.adopt_children(first);
        self.adopt_children(second);
        trace_log!(first = first.slot(), second = second.slot(), "swapped node positions");
    }

    /// Points the `is_left` slot of `parent` (the root slot when absent) at
    /// `new`. A parent that is itself one of the swapped pair was already
    /// fixed by relabelling.
    fn attach_in_place_of(&mut self, parent: Link, is_left: bool, new: NodeIndex) {
        match parent {
            None => self.root = Some(new),
            Some(parent) if parent == new => {}
            Some(parent) if is_left => self.arena[parent].left = Some(new),
            Some(parent) => self.arena[parent].right = Some(new),
        }
    }

    fn adopt_children(&mut self, index: NodeIndex) {
        let node = &self.arena[index];
        for child in [node.left, node.right].into_iter().flatten() {
            self.arena[child].parent = Some(index);
        }
    }
}
