use std::{collections::BTreeMap, fmt, mem};

#[derive(Default)]
struct TrieNode {
    children: BTreeMap<char, TrieNode>,
    is_key: bool,
}

impl TrieNode {
    fn child(&self, label: char) -> Option<&TrieNode> {
        self.children.get(&label)
    }
}

// Descendants are moved onto a heap stack first, so dropping never recurses per character.
impl Drop for TrieNode {
    fn drop(&mut self) {
        let mut stack: Vec<TrieNode> = mem::take(&mut self.children).into_values().collect();

        while let Some(mut node) = stack.pop() {
            stack.extend(mem::take(&mut node.children).into_values());
        }
    }
}

/// A set of strings organised as a prefix tree, one character per edge.
///
/// The empty string is a valid key, stored at the root.
#[derive(Default)]
pub struct Trie {
    root: TrieNode,
    len: usize,
}

impl Trie {
    /// Returns a new empty trie.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys in the trie.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the trie contains no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds `key` to the trie.
    ///
    /// Returns `false` if it was already present.
    pub fn insert(&mut self, key: &str) -> bool {
        let mut node = &mut self.root;

        for label in key.chars() {
            node = node.children.entry(label).or_default();
        }

        let added = !node.is_key;
        node.is_key = true;

        if added {
            self.len += 1;
        }

        added
    }

    /// Returns `true` if `key` was inserted and not since deleted.
    pub fn contains(&self, key: &str) -> bool {
        self.node_at(key).is_some_and(|node| node.is_key)
    }

    /// Removes `key` from the trie, dropping branches that no longer lead to any key.
    ///
    /// Returns `false` if `key` was not present.
    pub fn delete(&mut self, key: &str) -> bool {
        let path: Vec<char> = key.chars().collect();

        // Depth of the deepest node on the path that still leads to another key once `key` is
        // gone. Everything below it along the path can be cut off in one go.
        let mut keep = 0;
        let mut node = &self.root;
        for (depth, &label) in path.iter().enumerate() {
            if node.is_key || node.children.len() > 1 {
                keep = depth;
            }
            match node.child(label) {
                Some(child) => node = child,
                None => return false,
            }
        }

        if !node.is_key {
            return false;
        }

        if path.is_empty() || !node.children.is_empty() {
            if let Some(node) = self.node_at_mut(&path) {
                node.is_key = false;
            }
        } else if let Some(node) = self.node_at_mut(&path[..keep]) {
            let label = path[keep];
            node.children.remove(&label);
            tracing::trace!(%label, depth = keep, "pruned trie branch");
        }

        self.len -= 1;
        true
    }

    /// Returns every key in the trie, in character order.
    pub fn keys(&self) -> Vec<String> {
        self.keys_with_prefix("")
    }

    /// Returns every key starting with `prefix`, in character order.
    ///
    /// `prefix` itself is included if it is a key.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys = Vec::new();

        if let Some(node) = self.node_at(prefix) {
            let mut buf = String::from(prefix);
            Self::collect(node, &mut buf, &mut keys);
        }

        keys
    }

    // Depth-first over an explicit stack of child iterators, so keys come out in the order of
    // their characters. `buf` holds one character per stacked iterator past the first.
    fn collect(node: &TrieNode, buf: &mut String, keys: &mut Vec<String>) {
        if node.is_key {
            keys.push(buf.clone());
        }

        let mut stack = vec![node.children.iter()];

        while let Some(children) = stack.last_mut() {
            match children.next() {
                Some((&label, child)) => {
                    buf.push(label);
                    if child.is_key {
                        keys.push(buf.clone());
                    }
                    stack.push(child.children.iter());
                }
                None => {
                    stack.pop();
                    if !stack.is_empty() {
                        buf.pop();
                    }
                }
            }
        }
    }

    fn node_at(&self, key: &str) -> Option<&TrieNode> {
        key.chars()
            .try_fold(&self.root, |node, label| node.child(label))
    }

    fn node_at_mut(&mut self, path: &[char]) -> Option<&mut TrieNode> {
        path.iter()
            .try_fold(&mut self.root, |node, label| node.children.get_mut(label))
    }
}

impl fmt::Debug for Trie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Trie {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut trie = Trie::new();
        for key in iter {
            trie.insert(key.as_ref());
        }
        trie
    }
}
