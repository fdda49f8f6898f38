//! Error types for [`AvlTree`](crate::AvlTree).
//!
//! Lookups, insertions and removals never fail; they report through their
//! return values. The only runtime error a caller can observe is resolving a
//! [`Position`](crate::Position) that does not reference a live element.

use std::error::Error;
use std::fmt;

/// Returned when a [`Position`](crate::Position) cannot be resolved to an
/// element.
///
/// This happens for the end sentinel, for a position whose element has since
/// been removed, and for a position obtained from a different tree.
///
/// # Examples
///
/// ```rust
/// use avltree::{AvlTree, ElementNotFound};
///
/// let tree: AvlTree<i32, &str> = AvlTree::new();
/// assert_eq!(tree.get(tree.end()), Err(ElementNotFound));
/// assert_eq!(
///     format!("{}", ElementNotFound),
///     "element not found: position does not reference a live element"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementNotFound;

impl fmt::Display for ElementNotFound {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "element not found: position does not reference a live element"
        )
    }
}

impl Error for ElementNotFound {}

static_assertions::assert_impl_all!(ElementNotFound: Error, Send, Sync, Copy);
