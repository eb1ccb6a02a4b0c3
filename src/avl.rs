use core::{borrow::Borrow, fmt};

use crate::{iter::Iter, Dir, Link, NodeId, OrderedTree, TreeError};

/// How [`AvlTree::insert`] searches for the node to rebalance.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ScanStrategy {
    /// Scan every node of the tree with [`AvlTree::find_lowest_unbalanced_node`].
    ///
    /// _O(n)_ per insertion.
    #[default]
    WholeTree,

    /// Walk from the inserted node towards the root and stop at the first unbalanced node.
    ///
    /// Only ancestors of the inserted node can become unbalanced, so this finds the same node as
    /// [`ScanStrategy::WholeTree`] in _O(log(n))_.
    InsertionPath,
}

// The correction applied to an unbalanced node, named by the rotations it performs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Fix {
    Left,
    Right,
    RightLeft,
    LeftRight,
}

/// An AVL tree whose nodes cache their height.
///
/// Built on an [`OrderedTree`]: insertion is delegated to it, after which heights are refreshed
/// and at most two rotations restore balance.
pub struct AvlTree<K> {
    tree: OrderedTree<K>,
    scan: ScanStrategy,
}

impl<K> AvlTree<K> {
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<K> {
        Self::with_scan_strategy(ScanStrategy::WholeTree)
    }

    /// Returns a new empty tree which searches for imbalance using `scan`.
    pub const fn with_scan_strategy(scan: ScanStrategy) -> AvlTree<K> {
        AvlTree {
            tree: OrderedTree::new(),
            scan,
        }
    }

    /// Returns the strategy used to find the node to rebalance.
    pub fn scan_strategy(&self) -> ScanStrategy {
        self.scan
    }

    /// Returns the underlying search tree.
    pub fn as_ordered(&self) -> &OrderedTree<K> {
        &self.tree
    }

    /// Returns `true` if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns the root node, if any.
    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.tree.root()
    }

    /// Returns the key stored at `node`.
    #[inline]
    pub fn key(&self, node: NodeId) -> &K {
        self.tree.key(node)
    }

    /// Returns the left child of `node`.
    #[inline]
    pub fn left(&self, node: NodeId) -> Option<NodeId> {
        self.tree.left(node)
    }

    /// Returns the right child of `node`.
    #[inline]
    pub fn right(&self, node: NodeId) -> Option<NodeId> {
        self.tree.right(node)
    }

    /// Returns the parent of `node`, or `None` for the root.
    #[inline]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.parent(node)
    }

    /// Returns the minimum node of the tree.
    pub fn first(&self) -> Option<NodeId> {
        self.tree.first()
    }

    /// Returns the maximum node of the tree.
    pub fn last(&self) -> Option<NodeId> {
        self.tree.last()
    }

    /// Returns an iterator over the keys of the tree, in ascending order.
    pub fn iter(&self) -> Iter<'_, K> {
        self.tree.iter()
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the height of `node`, derived from its children's cached heights.
    ///
    /// A leaf has height 0. By convention a missing node also reports 0.
    pub fn height(&self, node: impl Into<Option<NodeId>>) -> i32 {
        node.into().map_or(0, |node| self.derived_height(node))
    }

    /// Returns the skew of `node`: the height of its right subtree minus that of its left.
    ///
    /// A missing node has skew 0.
    pub fn skew(&self, node: impl Into<Option<NodeId>>) -> i32 {
        let Some(node) = node.into() else {
            return 0;
        };

        let links = self.tree.links(node);
        self.cached_height(links.right()) - self.cached_height(links.left())
    }

    /// Recomputes the height of `node` and of every ancestor up to the root.
    ///
    /// Heights are derived from the children's cached values, so the children of `node` must
    /// already be up to date.
    pub fn update_augmentation(&mut self, node: impl Into<Option<NodeId>>) {
        let mut opt_cur = node.into();

        while let Some(cur) = opt_cur {
            let height = self.derived_height(cur);
            let links = self.tree.links_mut(cur);
            links.set_height(height);
            opt_cur = links.parent();
        }
    }

    /// Returns the unbalanced node with the smallest height in the subtree rooted at `node`.
    ///
    /// Every node of the subtree is visited. When both subtrees of a node contain a candidate the
    /// lower one is returned; on equal heights either may be.
    pub fn find_lowest_unbalanced_node(&self, node: impl Into<Option<NodeId>>) -> Option<NodeId> {
        let node = node.into()?;

        let from_left = self.find_lowest_unbalanced_node(self.tree.left(node));
        let from_right = self.find_lowest_unbalanced_node(self.tree.right(node));

        // Anything found below is lower than `node` itself.
        self.lower_of(from_left, from_right)
            .or_else(|| self.is_unbalanced(node).then_some(node))
    }

    /// Rotates left around `node`, lifting its right child into its place.
    ///
    /// Does nothing if `node` has no right child.
    pub fn rotate_left(&mut self, node: NodeId) {
        self.rotate(node, Dir::Left);
    }

    /// Rotates right around `node`, lifting its left child into its place.
    ///
    /// Does nothing if `node` has no left child.
    pub fn rotate_right(&mut self, node: NodeId) {
        self.rotate(node, Dir::Right);
    }

    // Performs a rotation, moving `down` down towards `dir` and its `!dir` child up.
    fn rotate(&mut self, down: NodeId, dir: Dir) {
        let Some(up) = self.tree.links(down).child(!dir) else {
            return;
        };

        // - `down` becomes the `dir` child of `up`.
        // - `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
        let across = self.tree.links(up).child(dir);
        self.tree.links_mut(down).set_child(!dir, across);
        self.tree.maybe_set_parent(across, Some(down));

        self.tree.links_mut(up).set_child(dir, Some(down));
        let parent = self.tree.links_mut(down).set_parent(Some(up));
        self.tree.links_mut(up).set_parent(parent);
        self.tree.replace_child_or_set_root(parent, down, Some(up));

        // `down` is now below `up`, so it goes first.
        self.refresh_height(down);
        self.refresh_height(up);

        // A rebalancing rotation lowers the subtree back to its height before the insertion, which
        // the ancestors were refreshed against.
        self.update_augmentation(parent);

        tracing::trace!(?down, ?up, ?dir, "rotated");
    }

    fn rebalance(&mut self, node: NodeId) {
        let Some(fix) = self.classify(node) else {
            return;
        };

        tracing::debug!(?node, skew = self.skew(node), ?fix, "rebalancing");

        match fix {
            Fix::Left => self.rotate_left(node),
            Fix::Right => self.rotate_right(node),
            Fix::RightLeft => {
                if let Some(right) = self.tree.right(node) {
                    self.rotate_right(right);
                }
                self.rotate_left(node);
            }
            Fix::LeftRight => {
                if let Some(left) = self.tree.left(node) {
                    self.rotate_left(left);
                }
                self.rotate_right(node);
            }
        }
    }

    // The heavy side is read off `node`; the child on that side decides between a single and a
    // double rotation.
    fn classify(&self, node: NodeId) -> Option<Fix> {
        let skew = self.skew(node);

        if skew > 1 {
            let right_skew = self.skew(self.tree.right(node));
            Some(if right_skew >= 0 {
                Fix::Left
            } else {
                Fix::RightLeft
            })
        } else if skew < -1 {
            let left_skew = self.skew(self.tree.left(node));
            Some(if left_skew <= 0 {
                Fix::Right
            } else {
                Fix::LeftRight
            })
        } else {
            None
        }
    }

    fn find_lowest_unbalanced_ancestor(&self, node: NodeId) -> Option<NodeId> {
        let mut opt_cur = Some(node);

        while let Some(cur) = opt_cur {
            if self.is_unbalanced(cur) {
                return Some(cur);
            }
            opt_cur = self.tree.parent(cur);
        }

        None
    }

    // Support methods ========================================================

    #[inline]
    fn is_unbalanced(&self, node: NodeId) -> bool {
        self.skew(node).abs() > 1
    }

    fn lower_of(&self, a: Link, b: Link) -> Link {
        match (a, b) {
            (Some(a), Some(b)) => {
                if self.cached_height(Some(a)) < self.cached_height(Some(b)) {
                    Some(a)
                } else {
                    Some(b)
                }
            }
            (a, b) => a.or(b),
        }
    }

    /// Returns the cached height of the pointed-to node, `-1` for a missing one.
    #[inline]
    pub(crate) fn cached_height(&self, node: Link) -> i32 {
        node.map_or(-1, |n| self.tree.links(n).height())
    }

    #[inline]
    fn derived_height(&self, node: NodeId) -> i32 {
        let links = self.tree.links(node);
        1 + self
            .cached_height(links.left())
            .max(self.cached_height(links.right()))
    }

    #[inline]
    fn refresh_height(&mut self, node: NodeId) {
        let height = self.derived_height(node);
        self.tree.links_mut(node).set_height(height);
    }
}

impl<K: PartialOrd> AvlTree<K> {
    /// Inserts `key` and rebalances the tree.
    ///
    /// Returns `false` if an equal key was already present, in which case the tree is not
    /// modified.
    ///
    /// This operation completes in _O(n)_ time with [`ScanStrategy::WholeTree`] and in
    /// _O(log(n))_ time with [`ScanStrategy::InsertionPath`].
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Incomparable`] if `key` cannot be ordered against the tree's keys. The
    /// tree is not modified.
    pub fn insert(&mut self, key: K) -> Result<bool, TreeError> {
        let Some(inserted) = self.tree.insert(key)? else {
            tracing::trace!("duplicate key ignored");
            return Ok(false);
        };

        self.update_augmentation(inserted);

        let unbalanced = match self.scan {
            ScanStrategy::WholeTree => self.find_lowest_unbalanced_node(self.tree.root()),
            ScanStrategy::InsertionPath => self.find_lowest_unbalanced_ancestor(inserted),
        };

        if let Some(node) = unbalanced {
            self.rebalance(node);
        }

        Ok(true)
    }

    /// Inserts every key of `iter` in order, rebalancing after each.
    ///
    /// # Errors
    ///
    /// Stops at the first key that cannot be ordered against the tree and returns
    /// [`TreeError::Incomparable`]. Keys inserted before it stay in the tree; the rest of `iter` is
    /// not consumed.
    pub fn try_extend<I: IntoIterator<Item = K>>(&mut self, iter: I) -> Result<(), TreeError> {
        for key in iter {
            self.insert(key)?;
        }

        Ok(())
    }

    /// Returns the node holding `key`.
    pub fn find_node<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: PartialOrd + ?Sized,
    {
        self.tree.find_node(key)
    }

    /// Returns a reference to the stored key equal to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: PartialOrd + ?Sized,
    {
        self.tree.get(key)
    }

    /// Returns `true` if the tree contains `key`.
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: PartialOrd + ?Sized,
    {
        self.tree.contains(key)
    }

    /// Checks every tree invariant, panicking on the first violation.
    ///
    /// Heights are recomputed from scratch rather than trusted.
    #[doc(hidden)]
    pub fn assert_invariants(&self)
    where
        K: fmt::Debug,
    {
        self.tree.assert_invariants();

        if let Some(root) = self.tree.root() {
            self.assert_balanced_at(root);
        }
    }

    // Returns the true height of the subtree at `node`.
    fn assert_balanced_at(&self, node: NodeId) -> i32
    where
        K: fmt::Debug,
    {
        let mut child_heights = [-1; 2];

        for dir in [Dir::Left, Dir::Right] {
            if let Some(child) = self.tree.links(node).child(dir) {
                child_heights[dir as usize] = self.assert_balanced_at(child);
            }
        }

        let [left, right] = child_heights;
        let height = 1 + left.max(right);
        let key = self.tree.key(node);

        assert_eq!(
            self.tree.links(node).height(),
            height,
            "stale height at {key:?}"
        );
        assert!((right - left).abs() <= 1, "unbalanced at {key:?}");

        height
    }
}

impl<K> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug> fmt::Debug for AvlTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'tree, K> IntoIterator for &'tree AvlTree<K> {
    type Item = &'tree K;
    type IntoIter = Iter<'tree, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

