//! A height-augmented AVL tree, plus a sibling character trie.
//!
//! [`AvlTree`] wraps a plain binary search tree, [`OrderedTree`], and restores the AVL balance
//! invariant after every insertion. Each node caches its height; after an insertion the heights
//! along the path to the root are refreshed, the lowest unbalanced node is located, and one or two
//! rotations put the tree back into shape.
//!
//! [`Trie`] is an independent string set supporting exact and prefix queries.

// Conventions used in comments:
// - The height of a node `x` is denoted `h(x)`; a leaf has `h(x) = 0` and a missing child counts
//   as `-1`.
// - The skew of a node `x` is `h(right(x)) - h(left(x))`.
// - A node is unbalanced if `|skew(x)| > 1`.
//
// The fundamental invariants of an AVL tree are:
// 1. Keys are in search-tree order.
// 2. No node is unbalanced.
//
// This implementation additionally maintains:
// 3. Every cached height equals the true height of its subtree.
// 4. Every child's parent link points back at the node holding it.

use core::{mem, ops::Not};

mod avl;
mod debug;
mod error;
mod iter;
mod ordered;
mod trie;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

pub use avl::{AvlTree, ScanStrategy};
pub use error::TreeError;
pub use iter::Iter;
pub use ordered::OrderedTree;
pub use trie::Trie;

/// A handle to a node of an [`OrderedTree`] or [`AvlTree`].
///
/// Handles stay valid for the lifetime of the tree that issued them; rotations relink nodes but
/// never move or free them. Using a handle with a different tree is a logic error and may panic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

pub(crate) type Link = Option<NodeId>;

#[derive(Clone, Debug)]
pub(crate) struct Links {
    parent: Link,
    children: [Link; 2],
    height: i32,
}

impl Links {
    #[must_use]
    pub(crate) const fn new(parent: Link) -> Self {
        Self {
            parent,
            children: [None; 2],
            height: 0,
        }
    }

    #[inline]
    pub(crate) fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub(crate) fn parent(&self) -> Link {
        self.parent
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link {
        self.children[dir as usize]
    }

    #[inline]
    pub(crate) fn left(&self) -> Link {
        self.child(Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Link {
        self.child(Dir::Right)
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Link) -> Link {
        mem::replace(&mut self.parent, parent)
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.children[dir as usize], child)
    }

    #[inline]
    pub(crate) fn set_height(&mut self, height: i32) {
        self.height = height;
    }
}
