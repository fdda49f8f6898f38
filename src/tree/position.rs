//! Non-owning element positions.

use std::sync::atomic::{AtomicU64, Ordering};

use super::arena::NodeHandle;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of one tree instance. Clones receive a fresh identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct TreeId(u64);

impl TreeId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A position inside an [`AvlTree`](crate::AvlTree), or the end sentinel.
///
/// A `Position` borrows nothing: it is a `Copy` pair of the owning tree's
/// identity and a handle to one node. Resolve it with
/// [`AvlTree::get`](crate::AvlTree::get) or
/// [`AvlTree::get_mut`](crate::AvlTree::get_mut).
///
/// Positions stay valid across any mutation that does not remove their
/// element, including removals that restructure the tree around it. Once the
/// element is removed the position resolves to
/// [`ElementNotFound`](crate::ElementNotFound).
///
/// Two positions are equal when they belong to the same tree and name the
/// same node, or when both are the end sentinel of the same tree.
///
/// # Examples
///
/// ```rust
/// use avltree::AvlTree;
///
/// let mut tree = AvlTree::new();
/// let (position, inserted) = tree.insert(7, "seven");
/// assert!(inserted);
/// assert_eq!(tree.find(&7), position);
/// assert_ne!(position, tree.end());
/// assert_eq!(tree.get(position), Ok(&"seven"));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    tree: TreeId,
    node: Option<NodeHandle>,
}

impl Position {
    pub(crate) const fn new(tree: TreeId, node: Option<NodeHandle>) -> Self {
        Self { tree, node }
    }

    /// Returns `true` if this is an end sentinel.
    #[inline]
    pub const fn is_end(&self) -> bool {
        self.node.is_none()
    }

    pub(crate) const fn tree(&self) -> TreeId {
        self.tree
    }

    pub(crate) const fn node(&self) -> Option<NodeHandle> {
        self.node
    }
}

static_assertions::assert_impl_all!(Position: Copy, Send, Sync, std::hash::Hash);
