use std::ops::Range;

use proptest::prelude::*;

use crate::model;

use super::*;

fn build(keys: &[u32]) -> AvlTree<u32> {
    let mut tree = AvlTree::new();

    for &key in keys {
        assert!(tree.insert(key).unwrap());
        tree.assert_invariants();
    }

    tree
}

// Height recomputed from the structure alone, ignoring cached values.
fn true_height(tree: &AvlTree<u32>, node: Option<NodeId>) -> i32 {
    match node {
        Some(n) => 1 + true_height(tree, tree.left(n)).max(true_height(tree, tree.right(n))),
        None => -1,
    }
}

fn key_of(tree: &AvlTree<u32>, node: Option<NodeId>) -> Option<u32> {
    node.map(|n| *tree.key(n))
}

fn insert_find_all(keys: &[u32]) {
    let tree = build(keys);

    for key in keys {
        let node = tree.find_node(key).expect("item not found");
        assert_eq!(tree.key(node), key);
    }

    let mut sorted = keys.to_vec();
    sorted.sort_unstable();
    assert!(tree.iter().eq(sorted.iter()));
}

// Calls `f` with every permutation of `keys`.
fn permutations(keys: &mut Vec<u32>, k: usize, f: &mut impl FnMut(&[u32])) {
    if k == keys.len() {
        f(keys);
        return;
    }

    for i in k..keys.len() {
        keys.swap(k, i);
        permutations(keys, k + 1, f);
        keys.swap(k, i);
    }
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn two_elems_find() {
    insert_find_all(&[0, 1]);
    insert_find_all(&[1, 0]);
}

#[test]
fn three_elems_find() {
    insert_find_all(&[0, 1, 2]);
    insert_find_all(&[0, 2, 1]);
    insert_find_all(&[1, 0, 2]);
    insert_find_all(&[1, 2, 0]);
    insert_find_all(&[2, 0, 1]);
    insert_find_all(&[2, 1, 0]);
}

#[test]
fn all_orders_up_to_six_elems() {
    for n in 4..=6 {
        let mut keys: Vec<u32> = (0..n).collect();
        permutations(&mut keys, 0, &mut |keys: &[u32]| insert_find_all(keys));
    }
}

#[test]
fn right_right_single_left_rotation() {
    let tree = build(&[10, 20, 30]);

    let root = tree.root();
    assert_eq!(key_of(&tree, root), Some(20));
    assert_eq!(key_of(&tree, root.and_then(|r| tree.left(r))), Some(10));
    assert_eq!(key_of(&tree, root.and_then(|r| tree.right(r))), Some(30));
    assert_eq!(tree.height(root), 1);
}

#[test]
fn left_left_single_right_rotation() {
    let tree = build(&[30, 20, 10]);

    let root = tree.root();
    assert_eq!(key_of(&tree, root), Some(20));
    assert_eq!(key_of(&tree, root.and_then(|r| tree.left(r))), Some(10));
    assert_eq!(key_of(&tree, root.and_then(|r| tree.right(r))), Some(30));
}

#[test]
fn left_right_double_rotation() {
    let tree = build(&[30, 10, 20]);

    let root = tree.root();
    assert_eq!(key_of(&tree, root), Some(20));
    assert_eq!(key_of(&tree, root.and_then(|r| tree.left(r))), Some(10));
    assert_eq!(key_of(&tree, root.and_then(|r| tree.right(r))), Some(30));
}

#[test]
fn right_left_double_rotation() {
    let tree = build(&[10, 30, 20]);

    let root = tree.root();
    assert_eq!(key_of(&tree, root), Some(20));
    assert_eq!(key_of(&tree, root.and_then(|r| tree.left(r))), Some(10));
    assert_eq!(key_of(&tree, root.and_then(|r| tree.right(r))), Some(30));
}

#[test]
fn balanced_insert_needs_no_rotation() {
    let tree = build(&[20, 10, 30]);

    let root = tree.root().unwrap();
    assert_eq!(*tree.key(root), 20);
    assert_eq!(tree.height(root), 1);
    assert_eq!(tree.height(tree.left(root)), 0);
    assert_eq!(tree.height(tree.right(root)), 0);
    assert_eq!(tree.find_lowest_unbalanced_node(root), None);
}

#[test]
fn ascending_seven_is_perfect() {
    let tree = build(&[1, 2, 3, 4, 5, 6, 7]);

    let root = tree.root().unwrap();
    assert_eq!(*tree.key(root), 4);
    assert_eq!(tree.height(root), 2);

    for node in [tree.left(root), tree.right(root)] {
        assert_eq!(tree.height(node), 1);
        assert_eq!(tree.skew(node), 0);
    }
}

#[test]
fn right_right_below_root_refreshes_ancestors() {
    // Inserting 11 unbalances 9 two levels down; 8 and 5 were refreshed against the taller
    // subtree and must shrink back.
    let tree = build(&[5, 3, 8, 1, 4, 7, 9, 10, 11]);

    let root = tree.root().unwrap();
    assert_eq!(*tree.key(root), 5);
    assert_eq!(tree.height(root), 3);

    let eight = tree.right(root);
    assert_eq!(key_of(&tree, eight), Some(8));
    assert_eq!(tree.height(eight), 2);

    let ten = eight.and_then(|n| tree.right(n));
    assert_eq!(key_of(&tree, ten), Some(10));
    assert_eq!(key_of(&tree, ten.and_then(|n| tree.left(n))), Some(9));
    assert_eq!(key_of(&tree, ten.and_then(|n| tree.right(n))), Some(11));
}

#[test]
fn right_left_below_root_refreshes_ancestors() {
    let tree = build(&[5, 3, 8, 1, 4, 7, 9, 11, 10]);

    let root = tree.root().unwrap();
    assert_eq!(*tree.key(root), 5);
    assert_eq!(tree.height(root), 3);

    let ten = tree.right(root).and_then(|n| tree.right(n));
    assert_eq!(key_of(&tree, ten), Some(10));
    assert_eq!(tree.height(ten), 1);
    assert_eq!(key_of(&tree, ten.and_then(|n| tree.left(n))), Some(9));
    assert_eq!(key_of(&tree, ten.and_then(|n| tree.right(n))), Some(11));
}

#[test]
fn duplicate_insert_is_a_no_op() {
    let mut tree = build(&[10, 20]);

    assert_eq!(tree.insert(20), Ok(false));
    assert_eq!(tree.len(), 2);
    tree.assert_invariants();
}

#[test]
fn incomparable_key_leaves_tree_untouched() {
    let mut tree = AvlTree::new();
    tree.try_extend([1.0, 2.0, 3.0]).unwrap();

    assert_eq!(tree.insert(f64::NAN), Err(TreeError::Incomparable));
    assert_eq!(tree.len(), 3);
    tree.assert_invariants();
}

#[test]
fn try_extend_stops_at_incomparable_key() {
    let mut tree = AvlTree::new();

    assert_eq!(
        tree.try_extend([2.0, 1.0, f64::NAN, 3.0]),
        Err(TreeError::Incomparable)
    );
    assert_eq!(tree.iter().copied().collect::<Vec<f64>>(), [1.0, 2.0]);
    tree.assert_invariants();

    assert_eq!(tree.try_extend([3.0, 2.0]), Ok(()));
    assert_eq!(tree.len(), 3);
}

#[test]
fn height_and_skew_of_missing_node() {
    let tree: AvlTree<u32> = AvlTree::new();

    assert_eq!(tree.height(None::<NodeId>), 0);
    assert_eq!(tree.skew(None::<NodeId>), 0);
    assert_eq!(tree.find_lowest_unbalanced_node(None::<NodeId>), None);
}

#[test]
fn skew_signs() {
    let tree = build(&[2, 1, 3, 4]);

    let root = tree.root().unwrap();
    assert_eq!(tree.skew(root), 1);
    assert_eq!(tree.skew(tree.find_node(&3).unwrap()), 1);
    assert_eq!(tree.skew(tree.find_node(&4).unwrap()), 0);

    let tree = build(&[3, 4, 2, 1]);
    assert_eq!(tree.skew(tree.root()), -1);
}

#[test]
fn rotation_without_pivot_is_a_no_op() {
    let mut tree = build(&[2, 1]);
    let root = tree.root().unwrap();

    tree.rotate_left(root);
    assert_eq!(tree.root(), Some(root));
    tree.assert_invariants();

    let one = tree.find_node(&1).unwrap();
    tree.rotate_right(one);
    tree.rotate_left(one);
    assert_eq!(tree.parent(one), Some(root));
    tree.assert_invariants();
}

#[test]
fn rotate_left_at_root_relinks_everything() {
    let mut tree = build(&[2, 1, 4, 3, 5]);
    let two = tree.find_node(&2).unwrap();
    let three = tree.find_node(&3).unwrap();
    let four = tree.find_node(&4).unwrap();

    tree.rotate_left(two);

    assert_eq!(tree.root(), Some(four));
    assert_eq!(tree.parent(four), None);
    assert_eq!(tree.left(four), Some(two));
    assert_eq!(tree.parent(two), Some(four));
    assert_eq!(tree.right(two), Some(three));
    assert_eq!(tree.parent(three), Some(two));
    assert_eq!(tree.height(two), 1);
    assert_eq!(tree.height(four), 2);
    assert!(tree.iter().copied().eq(1..=5));
}

#[test]
fn rotate_right_below_root_updates_parent_link() {
    let mut tree = build(&[4, 2, 6, 1, 3]);
    let root = tree.root().unwrap();
    let two = tree.find_node(&2).unwrap();
    let one = tree.find_node(&1).unwrap();

    tree.rotate_right(two);

    assert_eq!(tree.left(root), Some(one));
    assert_eq!(tree.parent(one), Some(root));
    assert_eq!(tree.right(one), Some(two));
    assert_eq!(tree.parent(two), Some(one));
    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 6]);

    // Heights stay exact even though the rotation unbalanced the tree.
    assert_eq!(tree.height(one), 2);
    assert_eq!(tree.height(root), 3);
    assert_eq!(tree.skew(one), 2);
    assert_eq!(tree.skew(root), -2);
    assert_eq!(tree.find_lowest_unbalanced_node(root), Some(one));
}

#[test]
fn lowest_unbalanced_across_subtrees() {
    let mut tree = build(&(1..=15).collect::<Vec<u32>>());
    let root = tree.root().unwrap();
    assert_eq!(*tree.key(root), 8);

    // Unbalance one node on each side of the root, at different heights.
    tree.rotate_right(tree.find_node(&2).unwrap());
    tree.rotate_left(tree.find_node(&12).unwrap());

    let one = tree.find_node(&1).unwrap();
    let fourteen = tree.find_node(&14).unwrap();
    assert_eq!(tree.height(one), 2);
    assert_eq!(tree.height(fourteen), 3);
    assert_eq!(tree.skew(one), 2);
    assert_eq!(tree.skew(fourteen), -2);
    assert_eq!(tree.skew(root), 0);

    assert_eq!(tree.find_lowest_unbalanced_node(root), Some(one));
    assert_eq!(tree.find_lowest_unbalanced_node(tree.right(root)), Some(fourteen));
    assert_eq!(tree.find_lowest_unbalanced_node(tree.find_node(&10)), None);
}

#[test]
fn update_augmentation_repairs_whole_path() {
    let mut tree = build(&[2, 1, 3]);
    let three = tree.find_node(&3).unwrap();

    tree.update_augmentation(three);
    assert_eq!(tree.height(tree.root()), 1);
    tree.update_augmentation(None::<NodeId>);
    tree.assert_invariants();
}

#[test]
fn insertion_path_scan_matches_whole_tree() {
    let keys = [50, 40, 30, 45, 47, 46, 10, 20, 15, 60, 70, 65, 80, 75];

    let mut whole = AvlTree::new();
    let mut path = AvlTree::with_scan_strategy(ScanStrategy::InsertionPath);
    assert_eq!(path.scan_strategy(), ScanStrategy::InsertionPath);

    for key in keys {
        whole.insert(key).unwrap();
        path.insert(key).unwrap();
        path.assert_invariants();

        let shape = |tree: &AvlTree<u32>| {
            tree.iter()
                .map(|key| {
                    let node = tree.find_node(key).unwrap();
                    (*key, key_of(tree, tree.parent(node)), tree.height(node))
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(shape(&whole), shape(&path));
    }
}

#[test]
fn large_ascending_stays_logarithmic() {
    let tree = build(&(0..1000).collect::<Vec<u32>>());

    assert!(tree.height(tree.root()) <= model::max_avl_height(tree.len()));
    assert_eq!(tree.first().map(|n| *tree.key(n)), Some(0));
    assert_eq!(tree.last().map(|n| *tree.key(n)), Some(999));
}

#[test]
fn string_keys_borrowed_lookup() {
    let mut tree = AvlTree::new();
    tree.try_extend(["m", "c", "x", "a", "e"].map(String::from)).unwrap();

    assert!(tree.contains("e"));
    assert!(!tree.contains("b"));
    assert_eq!(tree.get("x").map(String::as_str), Some("x"));
    tree.assert_invariants();
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..256;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn trie_equivalence(ops in proptest::collection::vec(model::trie_op_strategy(), FUZZ_RANGE)) {
        model::run_trie_equivalence(ops);
    }

    #[test]
    fn rotation_preserves_order(
        keys in proptest::collection::vec(0u32..500, 1..64),
        pick in any::<prop::sample::Index>(),
        left in any::<bool>(),
    ) {
        let mut tree = AvlTree::new();
        tree.try_extend(keys).unwrap();
        let before: Vec<u32> = tree.iter().copied().collect();

        let node = tree.find_node(pick.get(&before)).unwrap();
        if left {
            tree.rotate_left(node);
        } else {
            tree.rotate_right(node);
        }

        // Rotations may unbalance the tree, but order, links and heights must survive.
        tree.as_ordered().assert_invariants();
        prop_assert!(tree.iter().copied().eq(before.iter().copied()));
        // Check every node's stored height, leaves and the new subtree root included.
        for &key in &before {
            let node = tree.find_node(&key);
            prop_assert!(node.is_some());
            prop_assert_eq!(tree.cached_height(node), true_height(&tree, node));
        }
    }
}
