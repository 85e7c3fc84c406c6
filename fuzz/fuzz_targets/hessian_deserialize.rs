#![no_main]
//! Fuzz target for the Hessian decoder.
//!
//! Feeds arbitrary bytes through `deserialize` and, when a tree comes
//! back, re-serializes it. No input may cause a panic, unbounded
//! allocation, or stack overflow; chunk lengths are validated before
//! allocation and nesting is capped.

use libfuzzer_sys::fuzz_target;
use pepc_core::hessian::{deserialize, serialize};

fuzz_target!(|data: &[u8]| {
    // Phase 1: bounded decoding — must never panic.
    let tree = match deserialize(data) {
        Ok(tree) => tree,
        Err(_) => return, // Expected for most fuzz inputs.
    };

    // Phase 2: anything the decoder accepts must serialize cleanly and
    // decode back to the same tree.
    let bytes = serialize(&tree).expect("decoded tree must re-serialize");
    let again = deserialize(&bytes).expect("re-serialized tree must decode");
    // A NaN double is not self-equal; structural comparison only makes
    // sense for self-equal trees.
    #[allow(clippy::eq_op)]
    let self_equal = tree == tree;
    if self_equal {
        assert_eq!(again, tree);
    }
});
