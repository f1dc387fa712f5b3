use order_forest::types::default_comparator;
use order_forest::util::height;
use order_forest::{CompactRbNode, RbTree, TreeOptions};

fn checked_insert(tree: &mut RbTree<i32, i32>, key: i32) -> u32 {
    let idx = tree.insert(key, key).expect("multiset insert always attaches");
    if let Err(err) = tree.verify() {
        panic!("invalid red-black tree after insert({key}): {err}");
    }
    idx
}

fn checked_remove(tree: &mut RbTree<i32, i32>, key: i32) {
    let idx = tree.find(&key).expect("key to remove is present");
    tree.remove(idx);
    if let Err(err) = tree.verify() {
        panic!("invalid red-black tree after remove({key}): {err}");
    }
}

fn keys_in_order(tree: &RbTree<i32, i32>) -> Vec<i32> {
    tree.iter().map(|i| *tree.key(i)).collect()
}

#[test]
fn rb_fixed_insert_sequence_matrix() {
    let mut tree = RbTree::new();
    for key in [10, 20, 30, 15, 25, 5, 1] {
        checked_insert(&mut tree, key);
    }

    assert_eq!(keys_in_order(&tree), vec![1, 5, 10, 15, 20, 25, 30]);
    assert_eq!(tree.len(), 7);
    // 2 * floor(log2(n + 1)) for n = 7
    assert!(height(tree.arena(), tree.root_index()) <= 6);
}

#[test]
fn rb_insert_delete_various_numbers_matrix() {
    let mut tree = RbTree::new();
    for key in [10, 11, 12, 50, 60, 25, 100, 88, 33, 22, 55, 59, 51] {
        checked_insert(&mut tree, key);
    }
    assert_eq!(tree.len(), 13);

    for key in [100, 33, 10, 60, 22] {
        checked_remove(&mut tree, key);
    }
    assert_eq!(tree.len(), 8);
    assert_eq!(keys_in_order(&tree), vec![11, 12, 25, 50, 51, 55, 59, 88]);
}

#[test]
fn rb_numbers_from_0_to_100_matrix() {
    let mut tree = RbTree::new();
    for i in 0..=100 {
        checked_insert(&mut tree, i);
        assert_eq!(tree.len(), (i + 1) as usize);
    }
    for i in 0..=100 {
        checked_remove(&mut tree, i);
        assert_eq!(tree.len(), (100 - i) as usize);
    }
    assert!(tree.is_empty());
}

#[test]
fn rb_numbers_from_100_down_matrix() {
    let mut tree = RbTree::new();
    for i in (11..=100).rev() {
        checked_insert(&mut tree, i);
    }
    for i in (11..=100).rev() {
        checked_remove(&mut tree, i);
    }
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
}

#[test]
fn rb_numbers_both_directions_from_50_matrix() {
    let mut tree = RbTree::new();
    for i in 1..=50 {
        checked_insert(&mut tree, 50 + i);
        checked_insert(&mut tree, 50 - i);
    }
    for i in 1..=50 {
        checked_remove(&mut tree, 50 - i);
        checked_remove(&mut tree, 50 + i);
    }
    assert!(tree.is_empty());
}

#[test]
fn rb_hinted_end_inserts_matrix() {
    let mut tree = RbTree::new();
    for i in 0..200 {
        assert!(tree.insert_hinted(i, i, None).is_some());
        if let Err(err) = tree.verify() {
            panic!("invalid tree after hinted insert({i}): {err}");
        }
    }
    assert_eq!(keys_in_order(&tree), (0..200).collect::<Vec<_>>());
}

#[test]
fn rb_hinted_node_inserts_matrix() {
    let mut tree = RbTree::new();
    for i in (0..100).step_by(2) {
        checked_insert(&mut tree, i);
    }
    // Fill the gaps, hinting at the even neighbor every time.
    for i in (1..100).step_by(2) {
        let hint = tree.find(&(i - 1));
        tree.insert_hinted(i, i, hint).expect("gap insert attaches");
        if let Err(err) = tree.verify() {
            panic!("invalid tree after hinted insert({i}): {err}");
        }
    }
    assert_eq!(keys_in_order(&tree), (0..100).collect::<Vec<_>>());
}

#[test]
fn rb_bounds_matrix() {
    let mut tree = RbTree::new();
    for key in [10, 20, 30, 40, 50] {
        checked_insert(&mut tree, key);
    }

    assert_eq!(tree.lower_bound(&10).map(|i| *tree.key(i)), Some(10));
    assert_eq!(tree.lower_bound(&15).map(|i| *tree.key(i)), Some(20));
    assert_eq!(tree.lower_bound(&50).map(|i| *tree.key(i)), Some(50));
    assert_eq!(tree.lower_bound(&51), None);

    assert_eq!(tree.upper_bound(&10).map(|i| *tree.key(i)), Some(20));
    assert_eq!(tree.upper_bound(&9).map(|i| *tree.key(i)), Some(10));
    assert_eq!(tree.upper_bound(&45).map(|i| *tree.key(i)), Some(50));
    assert_eq!(tree.upper_bound(&50), None);

    assert_eq!(tree.find(&30).map(|i| *tree.key(i)), Some(30));
    assert_eq!(tree.find(&31), None);
}

#[test]
fn rb_unique_keys_reject_duplicates_matrix() {
    let mut tree: RbTree<i32, i32> = RbTree::with_options(TreeOptions {
        multiple: false,
        ..TreeOptions::default()
    });

    assert!(tree.insert(7, 1).is_some());
    assert!(tree.insert(7, 2).is_none());
    assert_eq!(tree.len(), 1);
    assert!(tree.verify_integrity());
    assert_eq!(tree.value(tree.find(&7).unwrap()), &1);
}

#[test]
fn rb_compact_color_node_matrix() {
    let mut tree = RbTree::<i32, i32, _, CompactRbNode<i32, i32>>::with(
        default_comparator::<i32>,
        CompactRbNode::new,
        TreeOptions::default(),
    );

    for i in 0..=100 {
        assert!(tree.insert(i, i).is_some());
        if let Err(err) = tree.verify() {
            panic!("invalid compact-node tree after insert({i}): {err}");
        }
    }
    for i in (0..=100).rev() {
        let idx = tree.find(&i).expect("key present");
        tree.remove(idx);
        if let Err(err) = tree.verify() {
            panic!("invalid compact-node tree after remove({i}): {err}");
        }
    }
    assert!(tree.is_empty());
}

#[test]
fn rb_reverse_iteration_matrix() {
    let mut tree = RbTree::new();
    for key in [4, 2, 6, 1, 3, 5, 7] {
        checked_insert(&mut tree, key);
    }
    let backwards: Vec<i32> = tree.iter_rev().map(|i| *tree.key(i)).collect();
    assert_eq!(backwards, vec![7, 6, 5, 4, 3, 2, 1]);
}

#[test]
fn rb_clear_resets_the_tree_matrix() {
    let mut tree = RbTree::new();
    for i in 0..32 {
        checked_insert(&mut tree, i);
    }
    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.iter().count(), 0);
    checked_insert(&mut tree, 5);
    assert_eq!(tree.len(), 1);
}

#[test]
fn rb_dump_to_dot_writes_a_digraph() {
    let mut tree = RbTree::new();
    for key in [2, 1, 3] {
        checked_insert(&mut tree, key);
    }

    let path = std::env::temp_dir().join("order_forest_rb_dump.dot");
    tree.dump_to_dot(&path).expect("dot dump succeeds");
    let text = std::fs::read_to_string(&path).expect("dot file readable");
    std::fs::remove_file(&path).ok();

    assert!(text.starts_with("digraph G {"));
    assert!(text.contains("label=\"2\""));
    assert!(text.contains("color=black"));
    assert!(text.contains("color=red"));
    assert!(text.contains("[label=\"L\"]"));
    assert!(text.contains("[label=\"R\"]"));
}
