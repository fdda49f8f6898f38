//! Height-balanced (AVL) ordered map.
//!
//! This module provides [`AvlTree`], a mutable ordered map that keeps the
//! heights of every node's two subtrees within one of each other.
//!
//! # Overview
//!
//! - O(log N) `insert`, `remove`, `find`
//! - O(log N) `min`/`max`
//! - O(1) `len` and `is_empty`
//! - O(N) deep `clone`
//!
//! Lookups hand out [`Position`]s instead of references. A position is a
//! plain `Copy` value that names one node; it survives every mutation that
//! does not remove that node, including the restructuring done by a
//! two-child removal.
//!
//! # Examples
//!
//! ```rust
//! use avltree::AvlTree;
//!
//! let mut tree = AvlTree::new();
//! for key in [5, 3, 8, 1, 4, 7, 9] {
//!     tree.insert(key, key * 10);
//! }
//!
//! let keys: Vec<i32> = tree.keys().copied().collect();
//! assert_eq!(keys, vec![1, 3, 4, 5, 7, 8, 9]);
//!
//! let seven = tree.find(&7);
//! assert!(tree.remove(&5));
//! assert_eq!(tree.get(seven), Ok(&70));
//! ```
//!
//! # Internal Structure
//!
//! Nodes live in a generational arena and link to each other by index. Each
//! node caches the height of its subtree and keeps an index to its parent so
//! that rebalancing can walk upwards without an explicit path. After every
//! public operation:
//! 1. Every key in a left subtree is less than its ancestor's key, every key
//!    in a right subtree is greater
//! 2. Every node's balance factor is -1, 0 or 1
//! 3. Every cached height is `1 + max(left, right)` with absent subtrees at -1
//! 4. Parent and child links agree
//! 5. `len` equals the number of reachable nodes

mod arena;
mod copy;
mod insert;
mod invariant;
mod position;
mod remove;
mod rotation;
mod traversal;

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

use crate::error::ElementNotFound;
use crate::tracing_helpers::debug_log;

use arena::{Arena, Link, NodeIndex};
use position::TreeId;

pub use position::Position;
pub use traversal::{IntoIter, Iter};

// =============================================================================
// AvlTree Definition
// =============================================================================

/// An ordered map backed by a height-balanced binary search tree.
///
/// Keys are unique and must implement `Ord`. Values are arbitrary.
///
/// # Time Complexity
///
/// | Operation      | Complexity |
/// |----------------|------------|
/// | `new`          | O(1)       |
/// | `insert`       | O(log N)   |
/// | `remove`       | O(log N)   |
/// | `find`         | O(log N)   |
/// | `min`/`max`    | O(log N)   |
/// | `get`          | O(1)       |
/// | `len`          | O(1)       |
/// | `clone`        | O(N)       |
///
/// # Examples
///
/// ```rust
/// use avltree::AvlTree;
///
/// let mut tree = AvlTree::new();
/// let (position, inserted) = tree.insert(3, "three");
/// assert!(inserted);
///
/// // A duplicate key is left alone
/// let (again, inserted) = tree.insert(3, "THREE");
/// assert!(!inserted);
/// assert_eq!(again, position);
/// assert_eq!(tree.get(position), Ok(&"three"));
///
/// *tree.get_mut(position).unwrap() = "drei";
/// assert_eq!(tree.get(tree.find(&3)), Ok(&"drei"));
/// ```
pub struct AvlTree<K, V> {
    /// Identity compared by [`Position`] equality
    id: TreeId,
    /// Node storage
    arena: Arena<K, V>,
    /// Root node, if any
    root: Link,
    /// Number of entries
    length: usize,
}

impl<K, V> AvlTree<K, V> {
    /// Creates an empty tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avltree::AvlTree;
    ///
    /// let tree: AvlTree<i32, String> = AvlTree::new();
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.max(), tree.end());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: TreeId::fresh(),
            arena: Arena::new(),
            root: None,
            length: 0,
        }
    }

    /// Creates an empty tree with room for `capacity` entries before the node
    /// storage reallocates.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: TreeId::fresh(),
            arena: Arena::with_capacity(capacity),
            root: None,
            length: 0,
        }
    }

    /// Returns the number of entries in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the tree contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the height of the tree, or `None` when it is empty.
    ///
    /// A tree holding a single entry has height 0.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avltree::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// assert_eq!(tree.height(), None);
    /// for key in 1..=7 {
    ///     tree.insert(key, ());
    /// }
    /// assert_eq!(tree.height(), Some(2));
    /// ```
    #[must_use]
    pub fn height(&self) -> Option<usize> {
        self.root
            .and_then(|root| usize::try_from(self.arena[root].height).ok())
    }

    /// Returns the end sentinel of this tree. It never resolves to an element.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> Position {
        Position::new(self.id, None)
    }

    /// Returns the position of the entry with the greatest key, or
    /// [`end`](Self::end) if the tree is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avltree::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(3, "three");
    /// tree.insert(9, "nine");
    /// tree.insert(1, "one");
    /// assert_eq!(tree.get_key_value(tree.max()), Ok((&9, &"nine")));
    /// ```
    #[must_use]
    pub fn max(&self) -> Position {
        self.position_of_link(self.root.map(|root| self.arena.rightmost(root)))
    }

    /// Returns the position of the entry with the smallest key, or
    /// [`end`](Self::end) if the tree is empty.
    #[must_use]
    pub fn min(&self) -> Position {
        self.position_of_link(self.root.map(|root| self.arena.leftmost(root)))
    }

    /// Returns a reference to the value at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`ElementNotFound`] if `position` is an end sentinel, belongs
    /// to another tree, or names an entry that has been removed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avltree::{AvlTree, ElementNotFound};
    ///
    /// let mut tree = AvlTree::new();
    /// let (position, _) = tree.insert(1, "one");
    /// assert_eq!(tree.get(position), Ok(&"one"));
    ///
    /// tree.remove(&1);
    /// assert_eq!(tree.get(position), Err(ElementNotFound));
    /// ```
    pub fn get(&self, position: Position) -> Result<&V, ElementNotFound> {
        let index = self.resolve(position)?;
        Ok(&self.arena[index].value)
    }

    /// Returns a mutable reference to the value at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`ElementNotFound`] under the same conditions as
    /// [`get`](Self::get).
    pub fn get_mut(&mut self, position: Position) -> Result<&mut V, ElementNotFound> {
        let index = self.resolve(position)?;
        Ok(&mut self.arena[index].value)
    }

    /// Returns the key and value at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`ElementNotFound`] under the same conditions as
    /// [`get`](Self::get).
    pub fn get_key_value(&self, position: Position) -> Result<(&K, &V), ElementNotFound> {
        let index = self.resolve(position)?;
        let node = &self.arena[index];
        Ok((&node.key, &node.value))
    }

    /// Removes every entry.
    ///
    /// Positions issued before the call no longer resolve, and the tree gets
    /// a new identity, so its new end sentinel differs from the old one.
    pub fn clear(&mut self) {
        debug_log!(length = self.length, "clearing tree");
        self.arena.clear();
        self.root = None;
        self.length = 0;
        self.id = TreeId::fresh();
        self.debug_assert_structure();
    }

    fn resolve(&self, position: Position) -> Result<NodeIndex, ElementNotFound> {
        if position.tree() != self.id {
            return Err(ElementNotFound);
        }
        position
            .node()
            .and_then(|handle| self.arena.resolve(handle))
            .ok_or(ElementNotFound)
    }

    fn position_of(&self, index: NodeIndex) -> Position {
        Position::new(self.id, Some(self.arena.handle(index)))
    }

    fn position_of_link(&self, link: Link) -> Position {
        Position::new(self.id, link.map(|index| self.arena.handle(index)))
    }

    /// Points whichever slot of `parent` held `old` at `new`; the root slot
    /// when `parent` is `None`.
    fn replace_child(&mut self, parent: Link, old: NodeIndex, new: Link) {
        match parent {
            Some(parent) if self.arena[parent].left == Some(old) => self.arena[parent].left = new,
            Some(parent) => self.arena[parent].right = new,
            None => self.root = new,
        }
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Returns the position of the entry with `key`, or [`end`](Self::end)
    /// if there is none.
    ///
    /// The key may be any borrowed form of the tree's key type, but the
    /// ordering on the borrowed form must match the ordering on the key type.
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
    /// tree.insert("hello".to_string(), 42);
    ///
    /// assert_eq!(tree.get(tree.find("hello")), Ok(&42));
    /// assert_eq!(tree.find("world"), tree.end());
    /// ```
    #[must_use]
    pub fn find<Q>(&self, key: &Q) -> Position
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.position_of_link(self.locate(key))
    }

    /// Returns `true` if the tree contains an entry with `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(key).is_some()
    }

    fn locate<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(index) = current {
            let node = &self.arena[index];
            current = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(index),
            };
        }
        None
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for AvlTree<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTree<K, V> {
    /// Builds a tree by inserting in order. The first entry for a key wins.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlTree<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for AvlTree<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTree<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for AvlTree<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

static_assertions::assert_impl_all!(AvlTree<i32, String>: Send, Sync, Default);

// =============================================================================
// Tests
// =============================================================================
