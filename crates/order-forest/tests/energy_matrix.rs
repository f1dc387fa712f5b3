use order_forest::energy::{rebuild_below, verify, EnergyNode};
use order_forest::types::default_comparator;
use order_forest::util::{first, height};
use order_forest::{EnergyOptions, EnergyTree, Iter, TreeOptions};

fn checked_insert(tree: &mut EnergyTree<i32, i32>, key: i32) -> u32 {
    let idx = tree.insert(key, key).expect("multiset insert always attaches");
    if let Err(err) = tree.verify() {
        panic!("invalid energy tree after insert({key}): {err}");
    }
    idx
}

fn checked_remove(tree: &mut EnergyTree<i32, i32>, key: i32) {
    let idx = tree.find(&key).expect("key to remove is present");
    tree.remove(idx);
    if let Err(err) = tree.verify() {
        panic!("invalid energy tree after remove({key}): {err}");
    }
}

fn keys_in_order(tree: &EnergyTree<i32, i32>) -> Vec<i32> {
    tree.iter().map(|i| *tree.key(i)).collect()
}

fn ceil_log2(n: usize) -> usize {
    n.next_power_of_two().trailing_zeros() as usize
}

#[test]
fn energy_sorted_31_rebuilds_to_a_perfect_tree_matrix() {
    let mut tree = EnergyTree::new();
    for i in 1..=31 {
        checked_insert(&mut tree, i);
    }

    // The 31st insert tips the root over the threshold, so the whole tree
    // was just rebuilt: perfectly balanced, all energies spent.
    assert_eq!(height(tree.arena(), tree.root_index()), 5);
    for i in tree.iter() {
        assert_eq!(tree.arena()[i as usize].energy, 0);
    }
    assert_eq!(keys_in_order(&tree), (1..=31).collect::<Vec<_>>());
}

#[test]
fn energy_churn_keeps_the_height_bound_matrix() {
    let mut tree = EnergyTree::new();
    for i in 1..=31 {
        checked_insert(&mut tree, i);
    }
    for i in 1..=16 {
        checked_remove(&mut tree, i);
    }
    assert_eq!(tree.len(), 15);

    for i in 32..=47 {
        checked_insert(&mut tree, i);
    }
    assert_eq!(tree.len(), 31);
    assert_eq!(
        keys_in_order(&tree),
        (17..=47).collect::<Vec<_>>()
    );
    assert!(height(tree.arena(), tree.root_index()) <= ceil_log2(31 + 1) + 3);
}

#[test]
fn energy_sorted_and_reverse_sweeps_matrix() {
    let mut tree = EnergyTree::new();
    for i in 0..=100 {
        checked_insert(&mut tree, i);
        assert_eq!(tree.len(), (i + 1) as usize);
    }
    assert_eq!(keys_in_order(&tree), (0..=100).collect::<Vec<_>>());
    for i in 0..=100 {
        checked_remove(&mut tree, i);
    }
    assert!(tree.is_empty());

    for i in (0..=100).rev() {
        checked_insert(&mut tree, i);
    }
    for i in (0..=100).rev() {
        checked_remove(&mut tree, i);
    }
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
}

#[test]
fn energy_alternating_churn_matrix() {
    let mut tree = EnergyTree::new();
    for i in 0..50 {
        checked_insert(&mut tree, 50 + i);
        checked_insert(&mut tree, 49 - i);
    }
    for i in 0..25 {
        checked_remove(&mut tree, 2 * i);
    }
    for i in 0..25 {
        checked_insert(&mut tree, 100 + i);
    }
    assert_eq!(tree.len(), 100);
    let keys = keys_in_order(&tree);
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn energy_equal_keys_matrix() {
    let mut tree = EnergyTree::new();
    for _ in 0..17 {
        checked_insert(&mut tree, 9);
    }
    assert_eq!(tree.len(), 17);
    for _ in 0..17 {
        checked_remove(&mut tree, 9);
    }
    assert!(tree.is_empty());
}

#[test]
fn energy_unique_keys_reject_duplicates_matrix() {
    let mut tree: EnergyTree<i32, i32> = EnergyTree::with_options(
        TreeOptions {
            multiple: false,
            ..TreeOptions::default()
        },
        EnergyOptions::default(),
    );
    assert!(tree.insert(1, 1).is_some());
    assert!(tree.insert(1, 2).is_none());
    assert_eq!(tree.len(), 1);
}

#[test]
fn energy_tighter_alpha_stays_within_threshold_matrix() {
    let mut tree: EnergyTree<i32, i32> =
        EnergyTree::with_options(TreeOptions::default(), EnergyOptions { alpha: 0.25 });
    for i in 0..200 {
        tree.insert(i, i).unwrap();
        if let Err(err) = tree.verify() {
            panic!("invalid energy tree (alpha 0.25) after insert({i}): {err}");
        }
    }
    for i in (0..200).rev() {
        let idx = tree.find(&i).unwrap();
        tree.remove(idx);
        if let Err(err) = tree.verify() {
            panic!("invalid energy tree (alpha 0.25) after remove({i}): {err}");
        }
    }
    assert!(tree.is_empty());
}

/// Builds a right spine of `n` nodes with honest sizes, the worst shape a
/// rebuild can receive.
fn right_spine(n: usize) -> Vec<EnergyNode<i32, i32>> {
    let mut arena = Vec::with_capacity(n);
    for i in 0..n {
        let mut node = EnergyNode::new(i as i32, 0);
        node.p = (i > 0).then(|| (i - 1) as u32);
        node.r = (i + 1 < n).then(|| (i + 1) as u32);
        node.size = (n - i) as u32;
        arena.push(node);
    }
    arena
}

#[test]
fn energy_rebuild_layout_is_correct_for_awkward_sizes_matrix() {
    let cmp = default_comparator::<i32>;
    for n in [1usize, 2, 3, 4, 5, 7, 8, 15, 16, 31, 32] {
        let mut arena = right_spine(n);
        let mut buf = Vec::new();
        let root = rebuild_below(&mut arena, Some(0), 0, &mut buf);

        if let Err(err) = verify(&arena, root, &EnergyOptions::default(), &cmp) {
            panic!("invalid rebuilt tree for n = {n}: {err}");
        }

        let keys: Vec<i32> = Iter::new(&arena[..], first(&arena[..], root))
            .map(|i| arena[i as usize].k)
            .collect();
        assert_eq!(keys, (0..n as i32).collect::<Vec<_>>(), "n = {n}");

        assert_eq!(height(&arena[..], root), ceil_log2(n + 1), "n = {n}");
    }
}

#[test]
fn energy_rebuild_buffer_grows_monotonically() {
    // Two rebuilds through the same buffer: the second, smaller one must
    // reuse it without shrinking the allocation.
    let mut buf = Vec::new();
    let mut arena = right_spine(31);
    let root = rebuild_below(&mut arena, Some(0), 0, &mut buf);
    assert!(root.is_some());
    let cap_after_big = buf.capacity();
    assert!(cap_after_big >= 31);

    let mut small = right_spine(7);
    let root = rebuild_below(&mut small, Some(0), 0, &mut buf);
    assert!(root.is_some());
    assert_eq!(buf.capacity(), cap_after_big);
}
