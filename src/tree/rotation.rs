//! Rotations and the upward rebalancing loop.

use super::AvlTree;
use super::arena::NodeIndex;
use crate::tracing_helpers::{debug_log, trace_log};

/// What caused a rebalance.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(super) enum Trigger {
    /// A leaf was attached. One fix-up restores the height the path had
    /// before the insertion, so the walk stops after the first rotation.
    Insert,
    /// A node was spliced out. A rotation may shorten its subtree, so the
    /// walk always continues to the root.
    Remove,
}

impl<K, V> AvlTree<K, V> {
    /// Refreshes heights from `start` up to the root, rotating wherever a
    /// balance factor reaches +2 or -2.
    pub(super) fn rebalance(&mut self, start: NodeIndex, trigger: Trigger) {
        let mut current = Some(start);
        while let Some(node) = current {
            // Captured first: a rotation moves `node` below its replacement.
            let next = self.arena[node].parent;
            self.arena.update_height(node);

            let balance_factor = self.arena.balance_factor(node);
            let rotated = if balance_factor > 1 {
                self.fix_left_heavy(node);
                true
            } else if balance_factor < -1 {
                self.fix_right_heavy(node);
                true
            } else {
                false
            };

            if rotated && trigger == Trigger::Insert {
                debug_log!(node = node.slot(), "insert rebalance settled");
                return;
            }
            current = next;
        }
    }

    fn fix_left_heavy(&mut self, node: NodeIndex) {
        let Some(left) = self.arena[node].left else {
            unreachable!("left-heavy slot {} has no left child", node.slot());
        };
        if self.arena.balance_factor(left) >= 0 {
            self.rotate_right(left);
        } else {
            let Some(pivot) = self.arena[left].right else {
                unreachable!("left-right case at slot {} without a pivot", node.slot());
            };
            self.rotate_left(pivot);
            self.rotate_right(pivot);
        }
    }

    fn fix_right_heavy(&mut self, node: NodeIndex) {
        let Some(right) = self.arena[node].right else {
            unreachable!("right-heavy slot {} has no right child", node.slot());
        };
        if self.arena.balance_factor(right) <= 0 {
            self.rotate_left(right);
        } else {
            let Some(pivot) = self.arena[right].left else {
                unreachable!("right-left case at slot {} without a pivot", node.slot());
            };
            self.rotate_right(pivot);
            self.rotate_left(pivot);
        }
    }

    /// Lifts `pivot`, a left child, into its parent's place. The parent
    /// becomes `pivot`'s right child and adopts `pivot`'s old right subtree.
    pub(super) fn rotate_right(&mut self, pivot: NodeIndex) {
        let Some(parent) = self.arena[pivot].parent else {
            unreachable!("right rotation at root slot {}", pivot.slot());
        };
        let grandparent = self.arena[parent].parent;
        let moved = self.arena[pivot].right;

        if let Some(moved) = moved {
            self.arena[moved].parent = Some(parent);
        }
        self.arena[parent].left = moved;
        self.arena[parent].parent = Some(pivot);
        self.arena[pivot].right = Some(parent);
        self.arena[pivot].parent = grandparent;
        self.replace_child(grandparent, parent, Some(pivot));

        self.arena.update_height(parent);
        self.arena.update_height(pivot);
        trace_log!(pivot = pivot.slot(), lowered = parent.slot(), "rotate right");
    }

    /// Mirror of [`rotate_right`](Self::rotate_right) for a right child.
    pub(super) fn rotate_left(&mut self, pivot: NodeIndex) {
        let Some(parent) = self.arena[pivot].parent else {
            unreachable!("left rotation at root slot {}", pivot.slot());
        };
        let grandparent = self.arena[parent].parent;
        let moved = self.arena[pivot].left;

        if let Some(moved) = moved {
            self.arena[moved].parent = Some(parent);
        }
        self.arena[parent].right = moved;
        self.arena[parent].parent = Some(pivot);
        self.arena[pivot].left = Some(parent);
        self.arena[pivot].parent = grandparent;
        self.replace_child(grandparent, parent, Some(pivot));

        self.arena.update_height(parent);
        self.arena.update_height(pivot);
        trace_log!(pivot = pivot.slot(), lowered = parent.slot(), "rotate left");
    }
}
