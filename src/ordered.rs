use core::{borrow::Borrow, cmp::Ordering, fmt};

use crate::{iter::Iter, Dir, Link, Links, NodeId, TreeError};

struct Node<K> {
    links: Links,
    key: K,
}

/// An unbalanced binary search tree.
///
/// Nodes are kept in an arena and addressed by [`NodeId`]; child and parent links are handles into
/// that arena. Every node carries a `height` slot which this tree allocates but never maintains.
/// [`AvlTree`](crate::AvlTree) keeps it up to date.
///
/// Duplicate keys are ignored.
pub struct OrderedTree<K> {
    nodes: Vec<Node<K>>,
    root: Link,
}

impl<K> OrderedTree<K> {
    /// Returns a new empty tree.
    pub const fn new() -> OrderedTree<K> {
        OrderedTree {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Returns a new empty tree with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> OrderedTree<K> {
        OrderedTree {
            nodes: Vec::with_capacity(capacity),
            root: None,
        }
    }

    /// Returns `true` if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        let empty = self.len() == 0;
        debug_assert_eq!(empty, self.root.is_none());
        empty
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        // Nodes are never removed individually, so every allocated node is live.
        self.nodes.len()
    }

    /// Returns the root node, if any.
    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Returns the key stored at `node`.
    #[inline]
    pub fn key(&self, node: NodeId) -> &K {
        &self.nodes[node.index()].key
    }

    /// Returns the left child of `node`.
    #[inline]
    pub fn left(&self, node: NodeId) -> Option<NodeId> {
        self.links(node).left()
    }

    /// Returns the right child of `node`.
    #[inline]
    pub fn right(&self, node: NodeId) -> Option<NodeId> {
        self.links(node).right()
    }

    /// Returns the parent of `node`, or `None` for the root.
    #[inline]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.links(node).parent()
    }

    /// Returns the minimum node of the tree.
    pub fn first(&self) -> Option<NodeId> {
        self.root.map(|root| self.extreme_in_subtree(root, Dir::Left))
    }

    /// Returns the maximum node of the tree.
    pub fn last(&self) -> Option<NodeId> {
        self.root.map(|root| self.extreme_in_subtree(root, Dir::Right))
    }

    /// Returns an iterator over the keys of the tree, in ascending order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self)
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    // Follows `dir` children from `node` until there are none left.
    fn extreme_in_subtree(&self, node: NodeId, dir: Dir) -> NodeId {
        let mut cur = node;

        while let Some(child) = self.links(cur).child(dir) {
            cur = child;
        }

        cur
    }

    // Support methods ========================================================

    #[inline]
    pub(crate) fn links(&self, node: NodeId) -> &Links {
        &self.nodes[node.index()].links
    }

    #[inline]
    pub(crate) fn links_mut(&mut self, node: NodeId) -> &mut Links {
        &mut self.nodes[node.index()].links
    }

    pub(crate) fn maybe_set_parent(&mut self, opt_node: Link, parent: Link) {
        let Some(node) = opt_node else {
            return;
        };

        self.links_mut(node).set_parent(parent);
    }

    // Points whatever referenced `old_child` (`parent`'s child link, or the root) at `new_child`.
    //
    // `new_child`'s parent link is not updated.
    #[inline]
    pub(crate) fn replace_child_or_set_root(
        &mut self,
        parent: Link,
        old_child: NodeId,
        new_child: Link,
    ) {
        match parent {
            Some(parent) => {
                let dir = self.which_child(parent, old_child);
                self.links_mut(parent).set_child(dir, new_child);
            }
            None => self.root = new_child,
        }
    }

    // `child` must be a child of `parent`.
    pub(crate) fn which_child(&self, parent: NodeId, child: NodeId) -> Dir {
        if self.links(parent).left() == Some(child) {
            Dir::Left
        } else {
            debug_assert_eq!(
                self.links(parent).right(),
                Some(child),
                "`child` must be a child of `parent`"
            );
            Dir::Right
        }
    }

    fn alloc(&mut self, key: K, parent: Link) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            links: Links::new(parent),
            key,
        });
        id
    }
}

impl<K: PartialOrd> OrderedTree<K> {
    /// Inserts `key` as a new leaf.
    ///
    /// Returns the new node, or `None` if an equal key was already present, in which case the
    /// tree is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Incomparable`] if `key` has no ordering relative to a key met on the
    /// way down. The tree is not modified.
    pub fn insert(&mut self, key: K) -> Result<Option<NodeId>, TreeError> {
        let Some(mut parent) = self.root else {
            // Tree is empty. Set `key` as the root and return.
            let root = self.alloc(key, None);
            self.root = Some(root);
            return Ok(Some(root));
        };

        // Descend the tree, looking for a free slot.
        loop {
            let dir = match key.partial_cmp(self.key(parent)) {
                Some(Ordering::Less) => Dir::Left,
                Some(Ordering::Greater) => Dir::Right,
                Some(Ordering::Equal) => return Ok(None),
                None => return Err(TreeError::Incomparable),
            };

            match self.links(parent).child(dir) {
                // Descend.
                Some(child) => parent = child,

                // Set `key` as child.
                None => {
                    let node = self.alloc(key, Some(parent));
                    self.links_mut(parent).set_child(dir, Some(node));
                    return Ok(Some(node));
                }
            }
        }
    }

    /// Returns the node holding `key`.
    ///
    /// A key without an ordering relative to the keys on its search path is never found.
    pub fn find_node<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: PartialOrd + ?Sized,
    {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;

            match key.partial_cmp(self.key(cur).borrow())? {
                Ordering::Less => opt_cur = self.left(cur),
                Ordering::Equal => return Some(cur),
                Ordering::Greater => opt_cur = self.right(cur),
            }
        }
    }

    /// Returns a reference to the stored key equal to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: PartialOrd + ?Sized,
    {
        self.find_node(key).map(|node| self.key(node))
    }

    /// Returns `true` if the tree contains `key`.
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: PartialOrd + ?Sized,
    {
        self.find_node(key).is_some()
    }

    /// Checks search order and parent links, panicking on the first violation.
    #[doc(hidden)]
    pub fn assert_invariants(&self)
    where
        K: fmt::Debug,
    {
        if let Some(root) = self.root {
            assert_eq!(self.parent(root), None, "root parent pointer set");
            self.assert_links_at(root);
        }

        let mut count = 0;
        let mut prev: Option<&K> = None;
        for key in self.iter() {
            if let Some(prev) = prev {
                assert!(prev < key, "keys out of order: {prev:?} before {key:?}");
            }
            prev = Some(key);
            count += 1;
        }

        // Every allocated node must be reachable from the root.
        assert_eq!(count, self.len());
    }

    fn assert_links_at(&self, node: NodeId) {
        for dir in [Dir::Left, Dir::Right] {
            if let Some(child) = self.links(node).child(dir) {
                // Ensure child's parent link points to this node.
                let parent = self
                    .parent(child)
                    .expect("child parent pointer not set");
                assert_eq!(node, parent);

                self.assert_links_at(child);
            }
        }
    }
}

impl<K> Default for OrderedTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug> fmt::Debug for OrderedTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
