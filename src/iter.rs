use core::iter::FusedIterator;

use crate::{Dir, Link, NodeId, OrderedTree};

/// An in-order iterator over the keys of a tree.
///
/// Holds only the next node to visit; successors are found through the parent links.
pub struct Iter<'tree, K> {
    tree: &'tree OrderedTree<K>,
    next: Link,
    len: usize,
}

impl<'tree, K> Iter<'tree, K> {
    pub(crate) fn new(tree: &'tree OrderedTree<K>) -> Self {
        Iter {
            tree,
            next: tree.first(),
            len: tree.len(),
        }
    }

    // The leftmost node of the right subtree if there is one, otherwise the nearest ancestor
    // reached from its left side.
    fn successor(&self, node: NodeId) -> Link {
        if let Some(mut cur) = self.tree.right(node) {
            while let Some(left) = self.tree.left(cur) {
                cur = left;
            }
            return Some(cur);
        }

        let mut cur = node;
        while let Some(parent) = self.tree.parent(cur) {
            if let Dir::Left = self.tree.which_child(parent, cur) {
                return Some(parent);
            }
            cur = parent;
        }

        None
    }
}

impl<'tree, K> Iterator for Iter<'tree, K> {
    type Item = &'tree K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = self.successor(node);
        self.len -= 1;

        Some(self.tree.key(node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

impl<'tree, K> IntoIterator for &'tree OrderedTree<K> {
    type Item = &'tree K;
    type IntoIter = Iter<'tree, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
