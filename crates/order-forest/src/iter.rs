//! In-order iterators over an arena-backed tree.
//!
//! The direction is a const parameter: `REVERSE = false` steps to the
//! in-order successor, `REVERSE = true` to the predecessor. An iterator
//! holds only the index of its current node, so it stays valid across
//! mutations elsewhere in the tree and is invalidated exactly when that node
//! is removed.

use crate::types::LinkNode;
use crate::util::{next, prev};

pub struct TreeIter<'a, N, const REVERSE: bool> {
    arena: &'a [N],
    curr: Option<u32>,
}

/// Forward in-order iterator.
pub type Iter<'a, N> = TreeIter<'a, N, false>;

/// Reverse in-order iterator.
pub type RevIter<'a, N> = TreeIter<'a, N, true>;

impl<'a, N: LinkNode, const REVERSE: bool> TreeIter<'a, N, REVERSE> {
    pub fn new(arena: &'a [N], start: Option<u32>) -> Self {
        Self { arena, curr: start }
    }

    /// Index of the node the iterator currently points at, if any.
    pub fn peek(&self) -> Option<u32> {
        self.curr
    }
}

impl<'a, N: LinkNode, const REVERSE: bool> Iterator for TreeIter<'a, N, REVERSE> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        let out = self.curr?;
        self.curr = if REVERSE {
            prev(self.arena, out)
        } else {
            next(self.arena, out)
        };
        Some(out)
    }
}
