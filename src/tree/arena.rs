//! Slab storage for tree nodes.
//!
//! Nodes are addressed by [`NodeIndex`]. Child and parent links are plain
//! indices into the same arena, so the parent back-reference never owns
//! anything. Every slot carries a generation that is bumped when its node is
//! released, which lets a [`NodeHandle`] detect that the node it named is gone
//! even after the slot has been reused.

use std::ops::{Index, IndexMut};

// =============================================================================
// Indices and Handles
// =============================================================================

/// Index of an occupied slot in an [`Arena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct NodeIndex(usize);

impl NodeIndex {
    #[inline]
    pub(crate) const fn slot(self) -> usize {
        self.0
    }
}

/// An optional link to another node.
pub(crate) type Link = Option<NodeIndex>;

/// A slot index paired with the generation it had when the handle was issued.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct NodeHandle {
    index: NodeIndex,
    generation: u32,
}

// =============================================================================
// Node Definition
// =============================================================================

/// A stored entry plus its structural fields.
#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// Height of the subtree rooted here; 0 for a leaf.
    pub(crate) height: i32,
    pub(crate) parent: Link,
    pub(crate) left: Link,
    pub(crate) right: Link,
}

impl<K, V> Node<K, V> {
    /// Creates a detached leaf.
    pub(crate) const fn leaf(key: K, value: V, parent: Link) -> Self {
        Self {
            key,
            value,
            height: 0,
            parent,
            left: None,
            right: None,
        }
    }
}

// =============================================================================
// Arena Definition
// =============================================================================

#[derive(Debug)]
enum SlotState<K, V> {
    Occupied(Node<K, V>),
    Vacant { next_free: Option<usize> },
}

#[derive(Debug)]
struct Slot<K, V> {
    generation: u32,
    state: SlotState<K, V>,
}

/// Generational slab of nodes with an intrusive free list.
#[derive(Debug)]
pub(crate) struct Arena<K, V> {
    slots: Vec<Slot<K, V>>,
    free_head: Option<usize>,
    occupied: usize,
}

impl<K, V> Arena<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            occupied: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            occupied: 0,
        }
    }

    /// Number of occupied slots.
    #[inline]
    pub(crate) const fn occupied(&self) -> usize {
        self.occupied
    }

    /// Stores `node`, reusing a released slot when one is available.
    pub(crate) fn allocate(&mut self, node: Node<K, V>) -> NodeIndex {
        self.occupied += 1;
        match self.free_head {
            Some(slot) => {
                let entry = &mut self.slots[slot];
                let SlotState::Vacant { next_free } = entry.state else {
                    unreachable!("free list points at occupied slot {slot}");
                };
                self.free_head = next_free;
                entry.state = SlotState::Occupied(node);
                NodeIndex(slot)
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    state: SlotState::Occupied(node),
                });
                NodeIndex(self.slots.len() - 1)
            }
        }
    }

    /// Removes the node at `index` and returns it. The slot's generation is
    /// bumped so outstanding handles to it stop resolving.
    pub(crate) fn release(&mut self, index: NodeIndex) -> Node<K, V> {
        let entry = &mut self.slots[index.0];
        let state = std::mem::replace(
            &mut entry.state,
            SlotState::Vacant {
                next_free: self.free_head,
            },
        );
        let SlotState::Occupied(node) = state else {
            unreachable!("released vacant slot {}", index.0);
        };
        entry.generation = entry.generation.wrapping_add(1);
        self.free_head = Some(index.0);
        self.occupied -= 1;
        node
    }

    /// Drops every node and forgets all slots.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.occupied = 0;
    }

    /// Issues a handle naming the current occupant of `index`.
    pub(crate) fn handle(&self, index: NodeIndex) -> NodeHandle {
        NodeHandle {
            index,
            generation: self.slots[index.0].generation,
        }
    }

    /// Resolves a handle back to an index if its node is still alive.
    pub(crate) fn resolve(&self, handle: NodeHandle) -> Option<NodeIndex> {
        let entry = self.slots.get(handle.index.0)?;
        match entry.state {
            SlotState::Occupied(_) if entry.generation == handle.generation => Some(handle.index),
            _ => None,
        }
    }

    /// Height of the subtree behind `link`; an absent subtree has height -1.
    #[inline]
    pub(crate) fn height_of(&self, link: Link) -> i32 {
        link.map_or(-1, |index| self[index].height)
    }

    /// Recomputes the cached height of `index` from its children.
    #[inline]
    pub(crate) fn update_height(&mut self, index: NodeIndex) {
        let node = &self[index];
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self[index].height = height;
    }

    /// `height(left) - height(right)`.
    #[inline]
    pub(crate) fn balance_factor(&self, index: NodeIndex) -> i32 {
        let node = &self[index];
        self.height_of(node.left) - self.height_of(node.right)
    }

    /// Leftmost node of the subtree rooted at `index`.
    pub(crate) fn leftmost(&self, mut index: NodeIndex) -> NodeIndex {
        while let Some(left) = self[index].left {
            index = left;
        }
        index
    }

    /// Rightmost node of the subtree rooted at `index`.
    pub(crate) fn rightmost(&self, mut index: NodeIndex) -> NodeIndex {
        while let Some(right) = self[index].right {
            index = right;
        }
        index
    }

    /// In-order successor of `index`, following parent links when there is no
    /// right subtree.
    pub(crate) fn successor(&self, index: NodeIndex) -> Link {
        if let Some(right) = self[index].right {
            return Some(self.leftmost(right));
        }
        let mut child = index;
        let mut parent = self[index].parent;
        while let Some(ancestor) = parent {
            if self[ancestor].left == Some(child) {
                return Some(ancestor);
            }
            child = ancestor;
            parent = self[ancestor].parent;
        }
        None
    }
}

impl<K, V> Index<NodeIndex> for Arena<K, V> {
    type Output = Node<K, V>;

    #[inline]
    fn index(&self, index: NodeIndex) -> &Self::Output {
        match &self.slots[index.0].state {
            SlotState::Occupied(node) => node,
            SlotState::Vacant { .. } => panic!("link to vacant arena slot {}", index.0),
        }
    }
}

impl<K, V> IndexMut<NodeIndex> for Arena<K, V> {
    #[inline]
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        match &mut self.slots[index.0].state {
            SlotState::Occupied(node) => node,
            SlotState::Vacant { .. } => panic!("link to vacant arena slot {}", index.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_allocate_reuses_released_slot() {
        let mut arena = Arena::new();
        let first = arena.allocate(Node::leaf(1, "one", None));
        let second = arena.allocate(Node::leaf(2, "two", None));
        assert_eq!(arena.occupied(), 2);

        let node = arena.release(first);
        assert_eq!((node.key, node.value), (1, "one"));
        assert_eq!(arena.occupied(), 1);

        let third = arena.allocate(Node::leaf(3, "three", None));
        assert_eq!(third.slot(), first.slot());
        assert_ne!(third.slot(), second.slot());
        assert_eq!(arena[third].key, 3);
    }

    #[rstest]
    fn test_handle_goes_stale_after_release() {
        let mut arena = Arena::new();
        let index = arena.allocate(Node::leaf(1, (), None));
        let handle = arena.handle(index);
        assert_eq!(arena.resolve(handle), Some(index));

        arena.release(index);
        assert_eq!(arena.resolve(handle), None);

        let reused = arena.allocate(Node::leaf(2, (), None));
        assert_eq!(reused, index);
        assert_eq!(arena.resolve(handle), None);
        assert_eq!(arena.resolve(arena.handle(reused)), Some(reused));
    }

    #[rstest]
    fn test_height_and_balance_factor() {
        let mut arena = Arena::new();
        let root = arena.allocate(Node::leaf(2, (), None));
        let left = arena.allocate(Node::leaf(1, (), Some(root)));
        arena[root].left = Some(left);
        arena.update_height(root);

        assert_eq!(arena.height_of(None), -1);
        assert_eq!(arena.height_of(Some(left)), 0);
        assert_eq!(arena[root].height, 1);
        assert_eq!(arena.balance_factor(root), 1);
        assert_eq!(arena.balance_factor(left), 0);
    }

    #[rstest]
    #[should_panic(expected = "vacant arena slot")]
    fn test_indexing_vacant_slot_panics() {
        let mut arena = Arena::new();
        let index = arena.allocate(Node::leaf(1, (), None));
        arena.release(index);
        let _ = &arena[index];
    }
}
