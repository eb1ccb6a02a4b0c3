#![no_main]
use libfuzzer_sys::fuzz_target;

use augmented_avl::model::{run_trie_equivalence, TrieOp};

fuzz_target!(|ops: Vec<TrieOp>| { run_trie_equivalence(ops) });
