//! Deep copies.

use smallvec::SmallVec;

use super::AvlTree;
use super::arena::{Arena, Link, Node, NodeIndex};
use super::position::TreeId;
use super::traversal::STACK_INLINE_CAPACITY;
use crate::tracing_helpers::debug_log;

/// Work item of the post-order copy.
#[derive(Clone, Copy)]
enum Frame {
    /// Copy the subtree behind this link and push its root onto the results.
    Descend(Link),
    /// Both subtrees of this source node are on the results; build the node.
    Assemble(NodeIndex),
}

/// Produces an independent tree with the same shape, keys and values.
///
/// The copy is built post-order into a fresh, densely packed arena, children
/// first, with every height recomputed as its node is assembled. It shares no
/// nodes with the source and gets its own identity, so positions from the
/// source do not resolve against it.
///
/// `clone_from` builds the whole copy before dropping the old contents: if a
/// key or value `clone` panics, the destination is left as it was.
///
/// # Examples
///
/// ```rust
/// use avltree::AvlTree;
///
/// let mut original = AvlTree::new();
/// original.insert(1, "one".to_string());
///
/// let mut copy = original.clone();
/// copy.get_mut(copy.find(&1)).unwrap().push_str(" (copy)");
/// copy.insert(2, "two".to_string());
///
/// assert_eq!(original.len(), 1);
/// assert_eq!(original.get(original.find(&1)).unwrap(), "one");
/// assert_ne!(original.find(&1), copy.find(&1));
/// ```
impl<K: Clone, V: Clone> Clone for AvlTree<K, V> {
    fn clone(&self) -> Self {
        let mut arena = Arena::with_capacity(self.length);
        let mut pending: SmallVec<[Frame; STACK_INLINE_CAPACITY]> = SmallVec::new();
        let mut built: SmallVec<[Link; STACK_INLINE_CAPACITY]> = SmallVec::new();
        pending.push(Frame::Descend(self.root));

        while let Some(frame) = pending.pop() {
            match frame {
                Frame::Descend(None) => built.push(None),
                Frame::Descend(Some(source)) => {
                    let node = &self.arena[source];
                    pending.push(Frame::Assemble(source));
                    pending.push(Frame::Descend(node.right));
                    pending.push(Frame::Descend(node.left));
                }
                Frame::Assemble(source) => {
                    let right = built.pop().flatten();
                    let left = built.pop().flatten();
                    let node = &self.arena[source];
                    let mut copy = Node::leaf(node.key.clone(), node.value.clone(), None);
                    copy.left = left;
                    copy.right = right;
                    let index = arena.allocate(copy);
                    for child in [left, right].into_iter().flatten() {
                        arena[child].parent = Some(index);
                    }
                    arena.update_height(index);
                    built.push(Some(index));
                }
            }
        }

        debug_log!(length = self.length, "deep-copied tree");
        let copy = Self {
            id: TreeId::fresh(),
            arena,
            root: built.pop().flatten(),
            length: self.length,
        };
        copy.debug_assert_structure();
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::Cell;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    fn tree_of(keys: impl IntoIterator<Item = i32>) -> AvlTree<i32, String> {
        keys.into_iter().map(|key| (key, key.to_string())).collect()
    }

    #[rstest]
    fn test_clone_of_empty_tree() {
        let tree: AvlTree<i32, String> = AvlTree::new();
        let copy = tree.clone();
        assert!(copy.is_empty());
        assert_eq!(copy.root, None);
        assert_ne!(copy.end(), tree.end());
    }

    #[rstest]
    fn test_clone_preserves_shape_and_heights() {
        let mut tree = tree_of(0..100);
        for key in (0..100).step_by(3) {
            tree.remove(&key);
        }
        let copy = tree.clone();

        assert_eq!(copy, tree);
        assert_eq!(copy.height(), tree.height());
        assert_eq!(copy.check_invariants(), Ok(()));

        let mut original_shape = Vec::new();
        let mut copied_shape = Vec::new();
        tree.clone().pre_order(|value| original_shape.push(value.clone()));
        copy.clone().pre_order(|value| copied_shape.push(value.clone()));
        assert_eq!(original_shape, copied_shape);
    }

    #[rstest]
    fn test_clone_packs_arena() {
        let mut tree = tree_of(0..32);
        for key in 0..16 {
            tree.remove(&key);
        }
        let copy = tree.clone();
        assert_eq!(copy.arena.occupied(), 16);
        assert!(copy.iter().eq(tree.iter()));
    }

    #[rstest]
    fn test_clone_is_independent() {
        let mut original = tree_of([5, 3, 8]);
        let mut copy = original.clone();

        copy.insert(1, "1".to_string());
        copy.remove(&8);
        *copy.get_mut(copy.find(&5)).unwrap() = "changed".to_string();
        original.insert(9, "9".to_string());

        assert_eq!(original.keys().copied().collect::<Vec<_>>(), vec![3, 5, 8, 9]);
        assert_eq!(copy.keys().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
        assert_eq!(original.get(original.find(&5)).unwrap(), "5");
        assert_eq!(original.check_invariants(), Ok(()));
        assert_eq!(copy.check_invariants(), Ok(()));
    }

    #[rstest]
    fn test_clone_from_replaces_contents() {
        let source = tree_of([1, 2, 3]);
        let mut destination = tree_of([7, 8]);
        let stale = destination.find(&7);

        destination.clone_from(&source);

        assert_eq!(destination, source);
        assert!(destination.get(stale).is_err());
    }

    thread_local! {
        static CLONES_BEFORE_PANIC: Cell<usize> = const { Cell::new(usize::MAX) };
    }

    #[derive(Debug, PartialEq)]
    struct Fragile(i32);

    impl Clone for Fragile {
        fn clone(&self) -> Self {
            CLONES_BEFORE_PANIC.with(|remaining| {
                assert!(remaining.get() > 0, "clone failed");
                remaining.set(remaining.get() - 1);
            });
            Self(self.0)
        }
    }

    #[rstest]
    fn test_failed_clone_from_leaves_destination_untouched() {
        let source: AvlTree<i32, Fragile> = (0..10).map(|key| (key, Fragile(key))).collect();
        let mut destination: AvlTree<i32, Fragile> =
            (100..103).map(|key| (key, Fragile(key))).collect();
        let kept = destination.find(&101);

        CLONES_BEFORE_PANIC.with(|remaining| remaining.set(4));
        let outcome = catch_unwind(AssertUnwindSafe(|| destination.clone_from(&source)));
        CLONES_BEFORE_PANIC.with(|remaining| remaining.set(usize::MAX));

        assert!(outcome.is_err());
        assert_eq!(destination.len(), 3);
        assert_eq!(destination.get(kept), Ok(&Fragile(101)));
        assert_eq!(destination.check_invariants(), Ok(()));
    }
}
