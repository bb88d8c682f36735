use std::{sync::Arc, thread};

use super::fixtures::{Word, big_leaf, big_leaves, blake3_defaults, mul_xor, word};
use crate::{
    Blake3Combiner, Blake3MerkleTree, DEFAULT_HEIGHT, FrontierState, IncrementalMerkleError,
    IncrementalMerkleTree, RightDefaults, build_root, root_from_leaves,
};

type WordFn = fn(&Word, &Word) -> Word;

fn word_tree(height: u8) -> IncrementalMerkleTree<WordFn, 4> {
    IncrementalMerkleTree::new(height, mul_xor as WordFn).expect("tree")
}

#[test]
fn test_new_tree() {
    let tree = Blake3MerkleTree::new(DEFAULT_HEIGHT, Blake3Combiner).expect("tree");
    assert_eq!(tree.height(), 32);
    assert_eq!(tree.capacity(), 1 << 32);
    assert_eq!(tree.count(), 0);
    assert!(tree.is_empty());
    assert!(!tree.is_full());

    let root = tree.root().unwrap().expect("root");
    assert_eq!(root, tree.right_defaults().empty_root(&Blake3Combiner).value);
}

#[test]
fn test_invalid_heights() {
    assert_eq!(
        Blake3MerkleTree::new(0, Blake3Combiner).err(),
        Some(IncrementalMerkleError::InvalidHeight(0))
    );
    assert_eq!(
        Blake3MerkleTree::new(64, Blake3Combiner).err(),
        Some(IncrementalMerkleError::InvalidHeight(64))
    );
}

#[test]
fn test_append_matches_batch_after_every_leaf() {
    let mut tree = Blake3MerkleTree::new(DEFAULT_HEIGHT, Blake3Combiner).expect("tree");
    let defaults = blake3_defaults();
    let leaves = big_leaves(70);
    for (i, leaf) in leaves.iter().enumerate() {
        let ctx = tree.append(*leaf);
        assert_eq!(ctx.cost.hash_node_calls, u64::from((i as u64).trailing_ones()));
        assert_eq!(ctx.value, Ok(i as u64));

        let expected = root_from_leaves(&leaves[..=i], &defaults, &Blake3Combiner)
            .unwrap()
            .expect("batch root");
        assert_eq!(tree.root().unwrap(), Ok(expected), "after {} leaves", i + 1);
    }
}

#[test]
fn test_root_is_cached_until_next_append() {
    let mut tree = word_tree(4);
    tree.append(word(1)).unwrap().expect("append");

    let first = tree.root();
    assert_eq!(first.cost.hash_node_calls, 4);
    assert_eq!(first.value, Ok(word(0x51)));

    let cached = tree.root();
    assert!(cached.cost.is_nothing());
    assert_eq!(cached.value, first.value);

    tree.append(word(2)).unwrap().expect("append");
    let refreshed = tree.root();
    assert_eq!(refreshed.cost.hash_node_calls, 4);
    assert_eq!(refreshed.value, Ok(word(0x1b)));
}

#[test]
fn test_fill_tree_and_reject_overflow() {
    let mut tree = word_tree(3);
    let leaves: Vec<Word> = (1..=8).map(word).collect();
    for leaf in &leaves {
        tree.append(*leaf).unwrap().expect("append");
    }
    assert!(tree.is_full());

    let root = tree.root();
    assert!(root.cost.is_nothing());
    let expected = root_from_leaves(&leaves, tree.right_defaults(), &mul_xor)
        .unwrap()
        .expect("batch root");
    assert_eq!(root.value, Ok(expected));

    let frontier_before = tree.frontier().clone();
    let overflow = tree.append(word(9));
    assert!(overflow.cost.is_nothing());
    assert_eq!(
        overflow.value,
        Err(IncrementalMerkleError::TreeFull {
            capacity: 8,
            count: 8
        })
    );
    assert_eq!(tree.frontier(), &frontier_before);
    assert_eq!(tree.count(), 8);
    assert_eq!(tree.root().unwrap(), Ok(expected));
}

#[test]
fn test_extend() {
    let mut tree = word_tree(3);
    let leaves: Vec<Word> = (1..=5).map(word).collect();
    let ctx = tree.extend(&leaves);
    assert_eq!(ctx.value, Ok(Some(4)));
    let expected_calls: u64 = (0u64..5).map(|i| u64::from(i.trailing_ones())).sum();
    assert_eq!(ctx.cost.hash_node_calls, expected_calls);

    assert_eq!(tree.extend(&[]).value, Ok(None));

    // 5 + 4 > 8: nothing is appended.
    let more: Vec<Word> = (6..=9).map(word).collect();
    assert_eq!(
        tree.extend(&more).value,
        Err(IncrementalMerkleError::TreeFull {
            capacity: 8,
            count: 9
        })
    );
    assert_eq!(tree.count(), 5);
    assert_eq!(
        tree.root().unwrap(),
        build_root(&leaves, tree.right_defaults(), &mul_xor).unwrap()
    );
}

#[test]
fn test_custom_default_leaf() {
    let custom = [0x11u8; 32];
    let mut tree = Blake3MerkleTree::with_default_leaf(8, custom, Blake3Combiner).expect("tree");
    let leaves = big_leaves(11);
    tree.extend(&leaves).unwrap().expect("extend");

    let defaults = RightDefaults::compute(8, custom, &Blake3Combiner)
        .unwrap()
        .expect("defaults");
    let mut padded = leaves.clone();
    padded.extend(std::iter::repeat_n(custom, 3));
    assert_eq!(
        tree.root().unwrap(),
        root_from_leaves(&padded, &defaults, &Blake3Combiner).unwrap()
    );

    let zero_default = Blake3MerkleTree::new(8, Blake3Combiner).expect("tree");
    assert_ne!(
        zero_default.root().unwrap().expect("root"),
        Blake3MerkleTree::with_default_leaf(8, custom, Blake3Combiner)
            .expect("tree")
            .root()
            .unwrap()
            .expect("root")
    );
}

#[test]
fn test_state_round_trip_and_resume() {
    let leaves = big_leaves(300);
    let mut uninterrupted = Blake3MerkleTree::new(16, Blake3Combiner).expect("tree");
    uninterrupted.extend(&leaves).unwrap().expect("extend");

    let mut first_half = Blake3MerkleTree::new(16, Blake3Combiner).expect("tree");
    first_half.extend(&leaves[..137]).unwrap().expect("extend");
    let bytes = first_half.serialize().expect("serialize");

    let mut resumed = Blake3MerkleTree::deserialize(&bytes, Blake3Combiner).expect("resume");
    assert_eq!(resumed.count(), 137);
    assert_eq!(resumed.frontier(), first_half.frontier());
    assert_eq!(resumed.root().unwrap(), first_half.root().unwrap());

    resumed.extend(&leaves[137..]).unwrap().expect("extend");
    assert_eq!(resumed.root().unwrap(), uninterrupted.root().unwrap());
    assert_eq!(resumed.to_state(), uninterrupted.to_state());
}

#[test]
fn test_state_of_full_tree_keeps_root() {
    let mut tree = word_tree(2);
    tree.extend(&[word(1), word(2), word(3), word(4)])
        .unwrap()
        .expect("extend");
    let state = tree.to_state();
    assert_eq!(state.count, 4);
    assert!(state.completed_root.is_some());

    let bytes = state.to_bytes().expect("encode");
    let decoded = FrontierState::<4>::from_bytes(&bytes).expect("decode");
    assert_eq!(decoded, state);

    let resumed = IncrementalMerkleTree::from_state(decoded, mul_xor as WordFn).expect("resume");
    assert!(resumed.is_full());
    assert_eq!(resumed.root().unwrap(), tree.root().unwrap());
}

#[test]
fn test_state_frontier_is_level_ordered() {
    let mut tree = word_tree(3);
    tree.extend(&[word(1), word(2), word(3)])
        .unwrap()
        .expect("extend");
    let state = tree.to_state();
    assert_eq!(state.height, 3);
    assert_eq!(state.frontier.len(), 3);
    assert_eq!(state.frontier[0], word(3));
    assert_eq!(state.frontier[1], mul_xor(&word(1), &word(2)));
}

#[test]
fn test_from_state_rejects_inconsistent_state() {
    let mut tree = word_tree(3);
    tree.extend(&[word(1), word(2)]).unwrap().expect("extend");
    let good = tree.to_state();
    let resume = |state: FrontierState<4>| {
        IncrementalMerkleTree::from_state(state, mul_xor as WordFn).err()
    };

    let mut state = good.clone();
    state.count = 9;
    assert!(matches!(
        resume(state),
        Some(IncrementalMerkleError::InvalidData(_))
    ));

    let mut state = good.clone();
    state.frontier.pop();
    assert!(matches!(
        resume(state),
        Some(IncrementalMerkleError::InvalidData(_))
    ));

    let mut state = good.clone();
    state.completed_root = Some(word(1));
    assert!(matches!(
        resume(state),
        Some(IncrementalMerkleError::InvalidData(_))
    ));

    let mut state = good.clone();
    state.count = 8;
    assert!(matches!(
        resume(state),
        Some(IncrementalMerkleError::InvalidData(_))
    ));

    let mut state = good;
    state.height = 0;
    assert_eq!(resume(state), Some(IncrementalMerkleError::InvalidHeight(0)));
}

#[test]
fn test_from_bytes_rejects_garbage() {
    let tree = word_tree(3);
    let mut bytes = tree.serialize().expect("serialize");
    bytes.push(0);
    assert!(matches!(
        FrontierState::<4>::from_bytes(&bytes),
        Err(IncrementalMerkleError::InvalidData(_))
    ));
    assert!(matches!(
        FrontierState::<4>::from_bytes(&[]),
        Err(IncrementalMerkleError::InvalidData(_))
    ));
}

#[test]
fn test_from_bytes_rejects_oversized_frontier_length() {
    // height 4, count 0, zero default leaf, then a frontier claiming 2^40 slots
    let mut bytes = vec![4u8, 0, 0, 0, 0, 0, 0xFD];
    bytes.extend_from_slice(&(1u64 << 40).to_le_bytes());
    assert!(matches!(
        FrontierState::<4>::from_bytes(&bytes),
        Err(IncrementalMerkleError::InvalidData(_))
    ));
    assert!(matches!(
        IncrementalMerkleTree::<WordFn, 4>::deserialize(&bytes, mul_xor as WordFn),
        Err(IncrementalMerkleError::InvalidData(_))
    ));
}

#[test]
fn test_from_bytes_rejects_overlong_input() {
    let mut bytes = word_tree(3).serialize().expect("serialize");
    bytes.resize(FrontierState::<4>::max_encoded_len() + 1, 0);
    assert!(matches!(
        FrontierState::<4>::from_bytes(&bytes),
        Err(IncrementalMerkleError::InvalidData(_))
    ));
}

#[test]
fn test_full_height_state_fits_max_encoded_len() {
    let state = FrontierState::<4> {
        height: 63,
        count: 1u64 << 63,
        default_leaf: [0xFF; 4],
        frontier: vec![[0xFF; 4]; 63],
        completed_root: Some([0xFF; 4]),
    };
    let bytes = state.to_bytes().expect("encode");
    assert!(bytes.len() <= FrontierState::<4>::max_encoded_len());
    assert_eq!(FrontierState::<4>::from_bytes(&bytes).expect("decode"), state);
}

#[test]
fn test_from_state_with_foreign_defaults() {
    let tree = word_tree(3);
    let other = Arc::new(
        RightDefaults::compute(4, [0u8; 4], &mul_xor)
            .unwrap()
            .expect("defaults"),
    );
    assert!(matches!(
        IncrementalMerkleTree::from_state_with_defaults(tree.to_state(), other, mul_xor as WordFn),
        Err(IncrementalMerkleError::InvalidData(_))
    ));
}

#[test]
fn test_shared_defaults_across_threads() {
    let defaults = Arc::new(blake3_defaults());
    let handles: Vec<_> = (0..4u64)
        .map(|shard| {
            let defaults = Arc::clone(&defaults);
            thread::spawn(move || {
                let mut tree = Blake3MerkleTree::with_defaults(defaults, Blake3Combiner)
                    .expect("tree");
                for i in 0..(shard + 1) * 10 {
                    tree.append(big_leaf(i)).unwrap().expect("append");
                }
                tree.root().unwrap().expect("root")
            })
        })
        .collect();

    for (shard, handle) in handles.into_iter().enumerate() {
        let root = handle.join().expect("thread");
        let leaves = big_leaves((shard as u64 + 1) * 10);
        assert_eq!(
            root,
            build_root(&leaves, &defaults, &Blake3Combiner)
                .unwrap()
                .expect("root")
        );
    }
}
