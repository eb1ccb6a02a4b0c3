//! Differential models of [`AvlTree`] and [`Trie`] against the standard library's `BTreeSet`,
//! shared by the property tests and the fuzz targets.

use std::collections::BTreeSet;

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{AvlTree, ScanStrategy, Trie};

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Get(ItemValue),
    First,
    Last,
}

impl Op {
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        fn get_value(v: &[u32], i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as u32
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::Get(item) => FinalOp::Get(get_value(sorted, item)),
            Op::First => FinalOp::First,
            Op::Last => FinalOp::Last,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    Get(u32),
    First,
    Last,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::Get),
        Just(Op::First),
        Just(Op::Last),
    ]
}

/// Largest height an AVL tree of `len` nodes may have: `1.44 * log2(len + 2)`, rounded up.
pub fn max_avl_height(len: usize) -> i32 {
    (1.4405 * ((len + 2) as f64).log2()).ceil() as i32
}

/// Applies `ops` to a `BTreeSet` and to two AVL trees, one per [`ScanStrategy`], checking that
/// all three agree and that both trees satisfy every invariant after each step.
pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut sorted_values = Vec::with_capacity(ops.len());
    let mut btree = BTreeSet::new();
    let mut avl: AvlTree<u32> = AvlTree::new();
    let mut avl_path: AvlTree<u32> = AvlTree::with_scan_strategy(ScanStrategy::InsertionPath);

    fn insert_sorted(v: &mut Vec<u32>, value: u32) {
        if let Err(idx) = v.binary_search(&value) {
            v.insert(idx, value);
        }
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_values);

        match final_op {
            FinalOp::Insert(value) => {
                insert_sorted(&mut sorted_values, value);

                let from_btree = btree.insert(value);
                let from_avl = avl.insert(value).unwrap();
                let from_avl_path = avl_path.insert(value).unwrap();

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
                assert_eq!(from_btree, from_avl_path, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Get(value) => {
                let from_btree = btree.get(&value);
                let from_avl = avl.get(&value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_btree = btree.first();
                let from_avl = avl.first().map(|node| avl.key(node));

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last();
                let from_avl = avl.last().map(|node| avl.key(node));

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        avl.assert_invariants();
        avl_path.assert_invariants();
        assert_eq!(btree.len(), avl.len());
        assert!(btree.iter().eq(avl.iter()));
        assert!(avl.height(avl.root()) <= max_avl_height(avl.len()));

        // Both strategies pick the same node to rebalance, so the shapes must match.
        assert_eq!(
            avl.root().map(|root| avl.key(root)),
            avl_path.root().map(|root| avl_path.key(root))
        );
        assert_eq!(avl.height(avl.root()), avl_path.height(avl_path.root()));
    }
}

#[derive(Clone, Debug, Arbitrary)]
pub enum TrieOp {
    Insert(String),
    Contains(String),
    Delete(String),
    KeysWithPrefix(String),
}

// A small alphabet keeps keys sharing prefixes.
fn trie_key_strategy() -> impl Strategy<Value = String> {
    "[abc]{0,4}"
}

pub fn trie_op_strategy() -> impl Strategy<Value = TrieOp> {
    proptest::prop_oneof![
        trie_key_strategy().prop_map(TrieOp::Insert),
        trie_key_strategy().prop_map(TrieOp::Contains),
        trie_key_strategy().prop_map(TrieOp::Delete),
        trie_key_strategy().prop_map(TrieOp::KeysWithPrefix),
    ]
}

pub fn run_trie_equivalence(ops: Vec<TrieOp>) {
    let mut btree = BTreeSet::new();
    let mut trie = Trie::new();

    for (op_id, op) in ops.into_iter().enumerate() {
        match &op {
            TrieOp::Insert(key) => {
                let from_btree = btree.insert(key.clone());
                let from_trie = trie.insert(key);

                assert_eq!(from_btree, from_trie, "TrieOp #{op_id}: {op:?}");
            }

            TrieOp::Contains(key) => {
                assert_eq!(btree.contains(key), trie.contains(key), "TrieOp #{op_id}: {op:?}");
            }

            TrieOp::Delete(key) => {
                let from_btree = btree.remove(key);
                let from_trie = trie.delete(key);

                assert_eq!(from_btree, from_trie, "TrieOp #{op_id}: {op:?}");
            }

            TrieOp::KeysWithPrefix(prefix) => {
                let from_btree: Vec<&String> = btree
                    .range(prefix.clone()..)
                    .take_while(|key| key.starts_with(prefix.as_str()))
                    .collect();
                let from_trie = trie.keys_with_prefix(prefix);

                assert!(
                    from_btree.iter().copied().eq(from_trie.iter()),
                    "TrieOp #{op_id}: {op:?}"
                );
            }
        }

        assert_eq!(btree.len(), trie.len());
    }

    assert!(btree.iter().eq(trie.keys().iter()));
}
