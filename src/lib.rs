//! # avltree
//!
//! A height-balanced binary search tree (AVL tree) used as an ordered map
//! with unique keys.
//!
//! ## Overview
//!
//! - [`AvlTree`]: the map itself. Insertion, removal and lookup are
//!   O(log N); traversal is in-order, pre-order or post-order.
//! - [`Position`]: a `Copy` handle to one entry, returned by
//!   [`AvlTree::insert`], [`AvlTree::find`], [`AvlTree::min`] and
//!   [`AvlTree::max`]. A position keeps naming the same entry until that
//!   entry is removed, whatever restructuring happens around it.
//! - [`ElementNotFound`]: the one error a caller can observe, returned when
//!   resolving the end sentinel or a position whose entry is gone.
//!
//! ## Feature Flags
//!
//! - `tracing`: emit trace/debug events for rotations, node swaps and copies
//! - `invariant-checks`: in debug builds, validate the whole tree after every
//!   mutation and panic on corruption
//!
//! ## Example
//!
//! ```rust
//! use avltree::prelude::*;
//!
//! let mut tree = AvlTree::new();
//! for key in [5, 3, 8, 1, 4, 7, 9] {
//!     tree.insert(key, key.to_string());
//! }
//!
//! let seven = tree.find(&7);
//! assert!(tree.remove(&5));
//! assert_eq!(tree.get(seven).map(String::as_str), Ok("7"));
//! assert_eq!(tree.get(tree.end()), Err(ElementNotFound));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// ```rust
/// use avltree::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::ElementNotFound;
    pub use crate::tree::{AvlTree, Position};
}

mod tracing_helpers;

pub mod error;
pub mod tree;

pub use error::ElementNotFound;
pub use tree::{AvlTree, IntoIter, Iter, Position};
