//! Visitor traversals and ordered iteration.
//!
//! Nothing in this module recurses. The visitors keep an explicit stack whose
//! depth is bounded by the tree height, and the iterators step through parent
//! links.

use std::iter::FusedIterator;

use smallvec::SmallVec;

use super::AvlTree;
use super::arena::{Arena, Link, NodeIndex};

/// Inline capacity of traversal stacks. An AVL tree of height 32 already
/// holds millions of entries, so the stacks practically never spill.
pub(super) const STACK_INLINE_CAPACITY: usize = 32;

type Stack = SmallVec<[NodeIndex; STACK_INLINE_CAPACITY]>;

impl<K, V> AvlTree<K, V> {
    /// Calls `visit` on every value in ascending key order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avltree::AvlTree;
    ///
    /// let mut tree: AvlTree<i32, i32> = [(2, 20), (1, 10), (3, 30)].into_iter().collect();
    /// let mut seen = Vec::new();
    /// tree.in_order(|value| seen.push(*value));
    /// assert_eq!(seen, vec![10, 20, 30]);
    /// ```
    pub fn in_order<F>(&mut self, mut visit: F)
    where
        F: FnMut(&mut V),
    {
        let mut stack = Stack::new();
        let mut current = self.root;
        loop {
            while let Some(index) = current {
                stack.push(index);
                current = self.arena[index].left;
            }
            let Some(index) = stack.pop() else {
                break;
            };
            visit(&mut self.arena[index].value);
            current = self.arena[index].right;
        }
    }

    /// Calls `visit` on every value, each node before its left subtree and
    /// its left subtree before its right subtree.
    pub fn pre_order<F>(&mut self, mut visit: F)
    where
        F: FnMut(&mut V),
    {
        let mut stack = Stack::new();
        stack.extend(self.root);
        while let Some(index) = stack.pop() {
            visit(&mut self.arena[index].value);
            let node = &self.arena[index];
            stack.extend([node.right, node.left].into_iter().flatten());
        }
    }

    /// Calls `visit` on every value, both subtrees of a node (left first)
    /// before the node itself.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avltree::AvlTree;
    ///
    /// let mut tree: AvlTree<i32, i32> = [(2, 20), (1, 10), (3, 30)].into_iter().collect();
    /// let mut seen = Vec::new();
    /// tree.post_order(|value| seen.push(*value));
    /// assert_eq!(seen, vec![10, 30, 20]);
    /// ```
    pub fn post_order<F>(&mut self, mut visit: F)
    where
        F: FnMut(&mut V),
    {
        let mut stack = Stack::new();
        let mut last_visited: Link = None;
        let mut current = self.root;
        loop {
            while let Some(index) = current {
                stack.push(index);
                current = self.arena[index].left;
            }
            let Some(&top) = stack.last() else {
                break;
            };
            let right = self.arena[top].right;
            if right.is_some() && right != last_visited {
                current = right;
            } else {
                visit(&mut self.arena[top].value);
                last_visited = Some(top);
                stack.pop();
            }
        }
    }

    /// Returns an iterator over entries in ascending key order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avltree::AvlTree;
    ///
    /// let tree: AvlTree<i32, &str> = [(3, "c"), (1, "a"), (2, "b")].into_iter().collect();
    /// let entries: Vec<(&i32, &&str)> = tree.iter().collect();
    /// assert_eq!(entries, vec![(&1, &"a"), (&2, &"b"), (&3, &"c")]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            arena: &self.arena,
            next: self.root.map(|root| self.arena.leftmost(root)),
            remaining: self.length,
        }
    }

    /// Returns an iterator over keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values in ascending key order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Node indices in ascending key order.
    fn in_order_indices(&self) -> Vec<NodeIndex> {
        let mut indices = Vec::with_capacity(self.length);
        let mut current = self.root.map(|root| self.arena.leftmost(root));
        while let Some(index) = current {
            indices.push(index);
            current = self.arena.successor(index);
        }
        indices
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the entries of an [`AvlTree`] in ascending key order.
pub struct Iter<'a, K, V> {
    arena: &'a Arena<K, V>,
    next: Link,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        self.next = self.arena.successor(index);
        self.remaining -= 1;
        let node = &self.arena[index];
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena,
            next: self.next,
            remaining: self.remaining,
        }
    }
}

/// An owning iterator over the entries of an [`AvlTree`] in ascending key
/// order.
pub struct IntoIter<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V> IntoIterator for AvlTree<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> Self::IntoIter {
        let entries: Vec<(K, V)> = self
            .in_order_indices()
            .into_iter()
            .map(|index| {
                let node = self.arena.release(index);
                (node.key, node.value)
            })
            .collect();
        IntoIter {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
