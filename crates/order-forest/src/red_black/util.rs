//! Red-black structural core: free functions over a caller-owned arena.
//!
//! Every function takes the arena plus the current root index and returns
//! the (possibly changed) root, so the storage always stays with the caller.
//! Structural events are reported through the [`RbTraits`] hooks after the
//! links they describe have been rewired.

use std::collections::HashSet;

use crate::error::VerifyError;
use crate::util::{first, get_l, get_p, get_r, next, set_l, set_p, set_r, verify_order, verify_tree};

use super::chain;
use super::traits::RbTraits;
use super::types::RbNodeLike;

#[inline]
fn is_black<K, V, N: RbNodeLike<K, V>>(arena: &[N], i: u32) -> bool {
    arena[i as usize].is_black()
}

#[inline]
fn set_black<K, V, N: RbNodeLike<K, V>>(arena: &mut [N], i: u32, v: bool) {
    arena[i as usize].set_black(v);
}

fn rotate_left<K, V, N, T>(arena: &mut [N], mut root: Option<u32>, parent: u32) -> Option<u32>
where
    N: RbNodeLike<K, V>,
    T: RbTraits<K, V, N>,
{
    let right_child = get_r(arena, parent).expect("rotate_left needs a right child");
    let inner = get_l(arena, right_child);

    set_r(arena, parent, inner);
    if let Some(inner) = inner {
        set_p(arena, inner, Some(parent));
    }

    set_l(arena, right_child, Some(parent));
    let gp = get_p(arena, parent);
    set_p(arena, right_child, gp);
    match gp {
        Some(gp) => {
            if get_l(arena, gp) == Some(parent) {
                set_l(arena, gp, Some(right_child));
            } else {
                set_r(arena, gp, Some(right_child));
            }
        }
        None => root = Some(right_child),
    }
    set_p(arena, parent, Some(right_child));

    T::rotated_left(arena, parent);
    root
}

fn rotate_right<K, V, N, T>(arena: &mut [N], mut root: Option<u32>, parent: u32) -> Option<u32>
where
    N: RbNodeLike<K, V>,
    T: RbTraits<K, V, N>,
{
    let left_child = get_l(arena, parent).expect("rotate_right needs a left child");
    let inner = get_r(arena, left_child);

    set_l(arena, parent, inner);
    if let Some(inner) = inner {
        set_p(arena, inner, Some(parent));
    }

    set_r(arena, left_child, Some(parent));
    let gp = get_p(arena, parent);
    set_p(arena, left_child, gp);
    match gp {
        Some(gp) => {
            if get_l(arena, gp) == Some(parent) {
                set_l(arena, gp, Some(left_child));
            } else {
                set_r(arena, gp, Some(left_child));
            }
        }
        None => root = Some(left_child),
    }
    set_p(arena, parent, Some(left_child));

    T::rotated_right(arena, parent);
    root
}

/// Inserts `n` by descending from the root, left-biased on equal keys.
///
/// Returns the new root and whether the node was attached; with `multiple`
/// off an equal-key insert attaches nothing.
pub fn insert<K, V, N, T, C>(
    arena: &mut [N],
    root: Option<u32>,
    n: u32,
    comparator: &C,
    multiple: bool,
) -> (Option<u32>, bool)
where
    N: RbNodeLike<K, V>,
    T: RbTraits<K, V, N>,
    C: Fn(&K, &K) -> i32,
{
    insert_leaf::<K, V, N, T, C>(arena, root, n, root, true, multiple, comparator)
}

/// Inserts `n` starting the descent near `hint`.
///
/// From a node hint, first walks up while the new key is smaller than the
/// ancestor, then descends as usual. `None` is the end hint: the node is
/// attached below the rightmost node, right-biased so that equal keys land
/// after their run.
pub fn insert_hinted<K, V, N, T, C>(
    arena: &mut [N],
    root: Option<u32>,
    n: u32,
    hint: Option<u32>,
    comparator: &C,
    multiple: bool,
) -> (Option<u32>, bool)
where
    N: RbNodeLike<K, V>,
    T: RbTraits<K, V, N>,
    C: Fn(&K, &K) -> i32,
{
    match hint {
        Some(hint) => {
            let mut start = hint;
            while let Some(up) = get_p(arena, start) {
                if comparator(arena[n as usize].key(), arena[up as usize].key()) < 0 {
                    start = up;
                } else {
                    break;
                }
            }
            insert_leaf::<K, V, N, T, C>(arena, root, n, Some(start), true, multiple, comparator)
        }
        None => {
            let mut start = root;
            while let Some(s) = start {
                match get_r(arena, s) {
                    Some(r) => start = Some(r),
                    None => break,
                }
            }
            insert_leaf::<K, V, N, T, C>(arena, root, n, start, false, multiple, comparator)
        }
    }
}

fn insert_leaf<K, V, N, T, C>(
    arena: &mut [N],
    root: Option<u32>,
    n: u32,
    start: Option<u32>,
    prefer_left_on_equal: bool,
    multiple: bool,
    comparator: &C,
) -> (Option<u32>, bool)
where
    N: RbNodeLike<K, V>,
    T: RbTraits<K, V, N>,
    C: Fn(&K, &K) -> i32,
{
    set_l(arena, n, None);
    set_r(arena, n, None);

    // Descend by comparison, following the bias at equal nodes. The last
    // equal node passed becomes the chain pivot: with left bias the new node
    // ends up as its in-order predecessor, with right bias its successor,
    // no matter what smaller or larger keys sit in between.
    let mut parent = None;
    let mut last_equal: Option<u32> = None;
    let mut cur = start;
    while let Some(c) = cur {
        parent = Some(c);
        let cmp = comparator(arena[c as usize].key(), arena[n as usize].key());
        cur = if cmp < 0 {
            get_r(arena, c)
        } else if cmp > 0 {
            get_l(arena, c)
        } else {
            if !multiple {
                return (root, false);
            }
            last_equal = Some(c);
            if prefer_left_on_equal {
                get_l(arena, c)
            } else {
                get_r(arena, c)
            }
        };
    }

    let Some(parent) = parent else {
        set_p(arena, n, None);
        set_black(arena, n, true);
        chain::make_singleton(arena, n);
        T::leaf_inserted(arena, n);
        return (Some(n), true);
    };

    set_p(arena, n, Some(parent));
    set_black(arena, n, false);

    let cmp = comparator(arena[n as usize].key(), arena[parent as usize].key());
    if cmp < 0 || (cmp == 0 && prefer_left_on_equal) {
        set_l(arena, parent, Some(n));
    } else {
        set_r(arena, parent, Some(n));
    }

    match last_equal {
        // Tree-left of the pivot threads in after it, keeping the chain in
        // insertion order; tree-right threads in before it.
        Some(e) if prefer_left_on_equal => chain::insert_after(arena, n, e),
        Some(e) => chain::insert_before(arena, n, e),
        None => chain::make_singleton(arena, n),
    }

    T::leaf_inserted(arena, n);
    let root = fixup_after_insert::<K, V, N, T>(arena, root, n);
    (root, true)
}

fn fixup_after_insert<K, V, N, T>(
    arena: &mut [N],
    mut root: Option<u32>,
    mut node: u32,
) -> Option<u32>
where
    N: RbNodeLike<K, V>,
    T: RbTraits<K, V, N>,
{
    loop {
        let Some(parent) = get_p(arena, node) else {
            return root;
        };
        if is_black(arena, parent) {
            return root;
        }
        // A red parent cannot be the root.
        let grandparent = get_p(arena, parent).expect("red parent has a parent");
        let uncle = if get_l(arena, grandparent) == Some(parent) {
            get_r(arena, grandparent)
        } else {
            get_l(arena, grandparent)
        };
        match uncle {
            Some(u) if !is_black(arena, u) => {
                set_black(arena, parent, true);
                set_black(arena, u, true);
                if get_p(arena, grandparent).is_some() {
                    set_black(arena, grandparent, false);
                    node = grandparent;
                } else {
                    // Never color the root red.
                    return root;
                }
            }
            _ => break,
        }
    }

    let parent = get_p(arena, node).expect("fixup node has a parent");
    let grandparent = get_p(arena, parent).expect("red parent has a parent");

    if get_l(arena, grandparent) == Some(parent) {
        if get_r(arena, parent) == Some(node) {
            // folded
            root = rotate_left::<K, V, N, T>(arena, root, parent);
            set_black(arena, node, true);
        } else {
            // straight
            set_black(arena, parent, true);
        }
        root = rotate_right::<K, V, N, T>(arena, root, grandparent);
    } else {
        if get_l(arena, parent) == Some(node) {
            root = rotate_right::<K, V, N, T>(arena, root, parent);
            set_black(arena, node, true);
        } else {
            set_black(arena, parent, true);
        }
        root = rotate_left::<K, V, N, T>(arena, root, grandparent);
    }
    set_black(arena, grandparent, false);

    root
}

/// Detaches `node` from the tree. `node` must be attached to this tree.
pub fn remove<K, V, N, T, C>(
    arena: &mut [N],
    mut root: Option<u32>,
    node: u32,
    comparator: &C,
) -> Option<u32>
where
    N: RbNodeLike<K, V>,
    T: RbTraits<K, V, N>,
    C: Fn(&K, &K) -> i32,
{
    // Pick the physical victim position.
    let mut child = node;
    if get_r(arena, node).is_some() && get_l(arena, node).is_some() {
        child = first(arena, get_r(arena, node)).expect("right subtree is non-empty");
    } else if let Some(l) = get_l(arena, node) {
        // A lone left child is red and childless.
        child = l;
    }

    if child != node {
        root = swap_nodes::<K, V, N, T, C>(arena, root, node, child, false, comparator);
    }
    // node is now a pseudo-leaf carrying child's former color.

    if let Some(right_child) = get_r(arena, node) {
        // The only possible child here is a red right child: splice by
        // swapping the two and cutting the node off.
        root = swap_nodes::<K, V, N, T, C>(arena, root, node, right_child, true, comparator);
        set_black(arena, right_child, true);
        set_r(arena, right_child, None);
        chain::unlink(arena, node);
        T::deleted_below(arena, right_child);
        return root;
    }

    let Some(parent) = get_p(arena, node) else {
        // Sole node of the tree.
        return None;
    };

    let deleted_left = get_l(arena, parent) == Some(node);
    if deleted_left {
        set_l(arena, parent, None);
    } else {
        set_r(arena, parent, None);
    }
    chain::unlink(arena, node);
    T::deleted_below(arena, parent);

    if is_black(arena, node) {
        root = fixup_after_delete::<K, V, N, T>(arena, root, parent, deleted_left);
    }
    root
}

fn fixup_after_delete<K, V, N, T>(
    arena: &mut [N],
    mut root: Option<u32>,
    mut parent: u32,
    mut deleted_left: bool,
) -> Option<u32>
where
    N: RbNodeLike<K, V>,
    T: RbTraits<K, V, N>,
{
    let mut sibling;
    loop {
        // A black node vanished below parent, so the other branch holds at
        // least one black and the sibling exists.
        let s = if deleted_left {
            get_r(arena, parent)
        } else {
            get_l(arena, parent)
        };
        sibling = s.expect("sibling of a deleted black node exists");

        // Case 3: recolor and propagate the missing black upward.
        if is_black(arena, parent)
            && is_black(arena, sibling)
            && get_l(arena, sibling).map_or(true, |x| is_black(arena, x))
            && get_r(arena, sibling).map_or(true, |x| is_black(arena, x))
        {
            set_black(arena, sibling, false);
            let Some(gp) = get_p(arena, parent) else {
                // parent is the root; the whole tree lost one black.
                return root;
            };
            deleted_left = get_l(arena, gp) == Some(parent);
            parent = gp;
        } else {
            break;
        }
    }

    // Case 2: red sibling; rotate it over the parent.
    if !is_black(arena, sibling) {
        set_black(arena, sibling, true);
        set_black(arena, parent, false);
        if deleted_left {
            root = rotate_left::<K, V, N, T>(arena, root, parent);
            sibling = get_r(arena, parent).expect("rotation leaves a right sibling");
        } else {
            root = rotate_right::<K, V, N, T>(arena, root, parent);
            sibling = get_l(arena, parent).expect("rotation leaves a left sibling");
        }
    }

    // Case 4: red parent, all-black sibling family.
    if is_black(arena, sibling)
        && get_l(arena, sibling).map_or(true, |x| is_black(arena, x))
        && get_r(arena, sibling).map_or(true, |x| is_black(arena, x))
    {
        set_black(arena, parent, true);
        set_black(arena, sibling, false);
        return root;
    }

    if deleted_left {
        if get_r(arena, sibling).map_or(true, |x| is_black(arena, x)) {
            // Case 5: folded nephew; unfold.
            root = rotate_right::<K, V, N, T>(arena, root, sibling);
            set_black(arena, sibling, false);
            sibling = get_p(arena, sibling).expect("rotated sibling has a parent");
            set_black(arena, sibling, true);
        }

        // Case 6: straight.
        root = rotate_left::<K, V, N, T>(arena, root, parent);
        let pb = is_black(arena, parent);
        let sb = is_black(arena, sibling);
        set_black(arena, parent, sb);
        set_black(arena, sibling, pb);
        let sr = get_r(arena, sibling).expect("straight case has a right nephew");
        set_black(arena, sr, true);
    } else {
        if get_l(arena, sibling).map_or(true, |x| is_black(arena, x)) {
            root = rotate_left::<K, V, N, T>(arena, root, sibling);
            set_black(arena, sibling, false);
            sibling = get_p(arena, sibling).expect("rotated sibling has a parent");
            set_black(arena, sibling, true);
        }

        root = rotate_right::<K, V, N, T>(arena, root, parent);
        let pb = is_black(arena, parent);
        let sb = is_black(arena, sibling);
        set_black(arena, parent, sb);
        set_black(arena, sibling, pb);
        let sl = get_l(arena, sibling).expect("straight case has a left nephew");
        set_black(arena, sl, true);
    }

    root
}

/// Exchanges the tree positions of `n1` and `n2` and, unless `swap_colors`
/// is set, their colors. Repairs the equality chain and reports the swap.
pub fn swap_nodes<K, V, N, T, C>(
    arena: &mut [N],
    mut root: Option<u32>,
    n1: u32,
    n2: u32,
    swap_colors: bool,
    comparator: &C,
) -> Option<u32>
where
    N: RbNodeLike<K, V>,
    T: RbTraits<K, V, N>,
    C: Fn(&K, &K) -> i32,
{
    root = if get_p(arena, n1) == Some(n2) {
        swap_neighbors(arena, root, n2, n1)
    } else if get_p(arena, n2) == Some(n1) {
        swap_neighbors(arena, root, n1, n2)
    } else {
        swap_unrelated(arena, root, n1, n2)
    };

    chain::swap_if_necessary(arena, n1, n2, comparator);

    if !swap_colors {
        let b1 = is_black(arena, n1);
        set_black(arena, n1, is_black(arena, n2));
        set_black(arena, n2, b1);
    }

    T::swapped(arena, n1, n2);
    root
}

fn swap_neighbors<N: crate::types::LinkNode>(
    arena: &mut [N],
    mut root: Option<u32>,
    parent: u32,
    child: u32,
) -> Option<u32> {
    let gp = get_p(arena, parent);
    set_p(arena, child, gp);
    set_p(arena, parent, Some(child));
    match gp {
        Some(gp) => {
            if get_l(arena, gp) == Some(parent) {
                set_l(arena, gp, Some(child));
            } else {
                set_r(arena, gp, Some(child));
            }
        }
        None => root = Some(child),
    }

    if get_l(arena, parent) == Some(child) {
        set_l(arena, parent, get_l(arena, child));
        if let Some(x) = get_l(arena, parent) {
            set_p(arena, x, Some(parent));
        }
        set_l(arena, child, Some(parent));

        let pr = get_r(arena, parent);
        set_r(arena, parent, get_r(arena, child));
        set_r(arena, child, pr);
        if let Some(x) = get_r(arena, child) {
            set_p(arena, x, Some(child));
        }
        if let Some(x) = get_r(arena, parent) {
            set_p(arena, x, Some(parent));
        }
    } else {
        set_r(arena, parent, get_r(arena, child));
        if let Some(x) = get_r(arena, parent) {
            set_p(arena, x, Some(parent));
        }
        set_r(arena, child, Some(parent));

        let pl = get_l(arena, parent);
        set_l(arena, parent, get_l(arena, child));
        set_l(arena, child, pl);
        if let Some(x) = get_l(arena, child) {
            set_p(arena, x, Some(child));
        }
        if let Some(x) = get_l(arena, parent) {
            set_p(arena, x, Some(parent));
        }
    }

    root
}

fn swap_unrelated<N: crate::types::LinkNode>(
    arena: &mut [N],
    mut root: Option<u32>,
    n1: u32,
    n2: u32,
) -> Option<u32> {
    let l1 = get_l(arena, n1);
    set_l(arena, n1, get_l(arena, n2));
    set_l(arena, n2, l1);
    if let Some(x) = get_l(arena, n1) {
        set_p(arena, x, Some(n1));
    }
    if let Some(x) = get_l(arena, n2) {
        set_p(arena, x, Some(n2));
    }

    let r1 = get_r(arena, n1);
    set_r(arena, n1, get_r(arena, n2));
    set_r(arena, n2, r1);
    if let Some(x) = get_r(arena, n1) {
        set_p(arena, x, Some(n1));
    }
    if let Some(x) = get_r(arena, n2) {
        set_p(arena, x, Some(n2));
    }

    let p1 = get_p(arena, n1);
    set_p(arena, n1, get_p(arena, n2));
    set_p(arena, n2, p1);
    match get_p(arena, n1) {
        Some(p) => {
            if get_r(arena, p) == Some(n2) {
                set_r(arena, p, Some(n1));
            } else {
                set_l(arena, p, Some(n1));
            }
        }
        None => root = Some(n1),
    }
    match get_p(arena, n2) {
        Some(p) => {
            if get_r(arena, p) == Some(n1) {
                set_r(arena, p, Some(n2));
            } else {
                set_l(arena, p, Some(n2));
            }
        }
        None => root = Some(n2),
    }

    root
}

/// Looks `query` up; an equal-key hit is rewound to the chain head, the
/// first-inserted equal node.
pub fn find<K, V, N, C>(arena: &[N], root: Option<u32>, query: &K, comparator: &C) -> Option<u32>
where
    N: RbNodeLike<K, V>,
    C: Fn(&K, &K) -> i32,
{
    let mut curr = root;
    while let Some(i) = curr {
        let c = comparator(query, arena[i as usize].key());
        if c == 0 {
            return Some(chain::find_first(arena, i));
        }
        curr = if c < 0 {
            get_l(arena, i)
        } else {
            get_r(arena, i)
        };
    }
    None
}

/// Checks every red-black invariant: shape, order, black root, equal black
/// heights, no red-red edge, and well-formed equality chains.
pub fn verify<K, V, N, C>(arena: &[N], root: Option<u32>, comparator: &C) -> Result<(), VerifyError>
where
    N: RbNodeLike<K, V>,
    C: Fn(&K, &K) -> i32,
{
    verify_tree(arena, root)?;
    verify_order(arena, root, comparator)?;

    let Some(root) = root else {
        return Ok(());
    };
    if !is_black(arena, root) {
        return Err(VerifyError::RootNotBlack { root });
    }
    black_height(arena, Some(root))?;
    verify_chains(arena, Some(root), comparator)
}

fn black_height<K, V, N>(arena: &[N], node: Option<u32>) -> Result<usize, VerifyError>
where
    N: RbNodeLike<K, V>,
{
    let Some(i) = node else {
        return Ok(0);
    };

    let l = get_l(arena, i);
    let r = get_r(arena, i);

    if !is_black(arena, i) {
        if l.map_or(false, |x| !is_black(arena, x)) || r.map_or(false, |x| !is_black(arena, x)) {
            return Err(VerifyError::RedRed { node: i });
        }
    }

    let lh = black_height(arena, l)?;
    let rh = black_height(arena, r)?;
    if lh != rh {
        return Err(VerifyError::BlackHeightMismatch { node: i });
    }

    Ok(lh + usize::from(is_black(arena, i)))
}

fn verify_chains<K, V, N, C>(
    arena: &[N],
    root: Option<u32>,
    comparator: &C,
) -> Result<(), VerifyError>
where
    N: RbNodeLike<K, V>,
    C: Fn(&K, &K) -> i32,
{
    let mut curr = first(arena, root);
    while let Some(i) = curr {
        chain::verify(arena, i)?;

        // Collect the maximal in-order run of keys equal to this one, then
        // demand that the chain through it holds exactly those nodes.
        let mut run = vec![i];
        let mut j = next(arena, i);
        while let Some(jj) = j {
            if comparator(arena[i as usize].key(), arena[jj as usize].key()) == 0 {
                run.push(jj);
                j = next(arena, jj);
            } else {
                break;
            }
        }

        let mut members = HashSet::new();
        let mut c = Some(chain::find_first(arena, i));
        while let Some(cc) = c {
            members.insert(cc);
            c = chain::next(arena, cc);
        }

        if members.len() != run.len() || !run.iter().all(|m| members.contains(m)) {
            return Err(VerifyError::ChainBroken { node: i });
        }

        curr = j;
    }
    Ok(())
}
