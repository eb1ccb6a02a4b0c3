use augmented_avl::{AvlTree, Trie};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

fn print_tree(tree: &AvlTree<u32>) {
    let root = tree.root().map(|root| *tree.key(root));
    println!(
        "{:?} root={root:?} height={}",
        tree.iter().collect::<Vec<_>>(),
        tree.height(tree.root())
    );
}

fn main() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let mut tree: AvlTree<u32> = AvlTree::new();

    for key in [2, 0, 3, 4, 5, 1, 6] {
        if let Err(err) = tree.insert(key) {
            tracing::error!(key, %err, "insert failed");
            continue;
        }
        tree.assert_invariants();
        print_tree(&tree);
    }

    let mut dot = String::new();
    match tree.dotgraph("demo", &mut dot) {
        Ok(()) => println!("{dot}"),
        Err(err) => tracing::error!(%err, "failed to render tree"),
    }

    let trie: Trie = ["tea", "ten", "to", "inn"].into_iter().collect();
    println!("{:?}", trie.keys_with_prefix("te"));
}
