use order_forest::red_black::chain;
use order_forest::{RbTree, TreeOptions};

fn order_query_options() -> TreeOptions {
    TreeOptions {
        multiple: true,
        order_queries: true,
        constant_time_size: true,
    }
}

fn checked_verify(tree: &RbTree<i32, i32>, what: &str) {
    if let Err(err) = tree.verify() {
        panic!("invalid tree after {what}: {err}");
    }
}

#[test]
fn chain_of_five_equal_keys_matrix() {
    let mut tree = RbTree::new();
    let mut inserted = Vec::new();
    for tag in 0..5 {
        let idx = tree.insert(42, tag).expect("equal keys are kept");
        checked_verify(&tree, "equal insert");
        inserted.push(idx);
    }
    assert_eq!(tree.len(), 5);

    // find lands on the chain head, which is the first-inserted node.
    let head = tree.find(&42).expect("42 is present");
    assert_eq!(head, inserted[0]);

    // Walking the chain visits all five, then ends.
    let mut curr = Some(head);
    let mut walked = Vec::new();
    while let Some(i) = curr {
        walked.push(i);
        curr = chain::next(tree.arena(), i);
    }
    assert_eq!(walked, inserted);

    // Removing the middle node leaves a chain of four and a valid tree.
    tree.remove(inserted[2]);
    checked_verify(&tree, "removing the chain middle");
    assert_eq!(tree.len(), 4);

    let mut curr = Some(tree.find(&42).unwrap());
    let mut walked = Vec::new();
    while let Some(i) = curr {
        walked.push(i);
        curr = chain::next(tree.arena(), i);
    }
    assert_eq!(walked, vec![inserted[0], inserted[1], inserted[3], inserted[4]]);
}

#[test]
fn chain_order_law_matrix() {
    let mut tree: RbTree<i32, i32> = RbTree::with_options(order_query_options());

    let a = tree.insert(7, 0).unwrap();
    let b = tree.insert(7, 1).unwrap();
    checked_verify(&tree, "two equal inserts");

    assert!(tree.precedes(a, b));
    assert!(!tree.precedes(b, a));
    assert!(!tree.precedes(a, a));

    // Unequal keys never answer true.
    let c = tree.insert(9, 2).unwrap();
    assert!(!tree.precedes(a, c));
    assert!(!tree.precedes(c, a));
}

#[test]
fn chain_survives_interleaved_removals_matrix() {
    let mut tree = RbTree::new();
    let mut live = Vec::new();

    // Three runs of duplicates woven between unique keys.
    for round in 0..6 {
        for key in [10, 20, 20, 30, 30, 30, 40] {
            live.push((key, tree.insert(key, round).unwrap()));
            checked_verify(&tree, "woven insert");
        }
    }

    // Remove in an order that forces successor swaps inside and around the
    // equal runs.
    live.sort_by_key(|(key, idx)| (*key, std::cmp::Reverse(*idx)));
    while let Some((_key, idx)) = live.pop() {
        tree.remove(idx);
        checked_verify(&tree, "woven remove");
    }
    assert!(tree.is_empty());
}

#[test]
fn chain_end_hinted_inserts_thread_before_the_run_matrix() {
    let mut tree: RbTree<i32, i32> = RbTree::with_options(order_query_options());

    let a = tree.insert_hinted(5, 0, None).unwrap();
    let b = tree.insert_hinted(5, 1, None).unwrap();
    checked_verify(&tree, "hinted equal inserts");

    // Right-biased end insertion puts the newcomer after the run in tree
    // order but before it in the chain.
    let order: Vec<u32> = tree.iter().collect();
    assert_eq!(order, vec![a, b]);
    assert!(tree.precedes(b, a));
    assert_eq!(tree.find(&5), Some(b));
}

#[test]
fn chain_equal_runs_with_left_bias_keep_insertion_order_matrix() {
    let mut tree: RbTree<i32, i32> = RbTree::with_options(order_query_options());

    let mut by_key: Vec<Vec<u32>> = vec![Vec::new(); 4];
    for round in 0..5 {
        for key in 0..4 {
            by_key[key as usize].push(tree.insert(key, round).unwrap());
            checked_verify(&tree, "round insert");
        }
    }

    for key in 0..4 {
        let run = &by_key[key as usize];
        assert_eq!(tree.find(&key), Some(run[0]));
        for pair in run.windows(2) {
            assert!(tree.precedes(pair[0], pair[1]));
            assert!(!tree.precedes(pair[1], pair[0]));
        }
    }
}
