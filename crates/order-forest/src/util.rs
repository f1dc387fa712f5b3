//! Order stepping and shape checks shared by every tree variant.

use std::collections::HashSet;

use crate::error::VerifyError;
use crate::types::{KeyNode, LinkNode};

#[inline]
pub(crate) fn get_p<N: LinkNode>(arena: &[N], idx: u32) -> Option<u32> {
    arena[idx as usize].p()
}

#[inline]
pub(crate) fn get_l<N: LinkNode>(arena: &[N], idx: u32) -> Option<u32> {
    arena[idx as usize].l()
}

#[inline]
pub(crate) fn get_r<N: LinkNode>(arena: &[N], idx: u32) -> Option<u32> {
    arena[idx as usize].r()
}

#[inline]
pub(crate) fn set_p<N: LinkNode>(arena: &mut [N], idx: u32, v: Option<u32>) {
    arena[idx as usize].set_p(v);
}

#[inline]
pub(crate) fn set_l<N: LinkNode>(arena: &mut [N], idx: u32, v: Option<u32>) {
    arena[idx as usize].set_l(v);
}

#[inline]
pub(crate) fn set_r<N: LinkNode>(arena: &mut [N], idx: u32, v: Option<u32>) {
    arena[idx as usize].set_r(v);
}

/// Leftmost node of the subtree rooted at `root`.
pub fn first<N: LinkNode>(arena: &[N], root: Option<u32>) -> Option<u32> {
    let mut curr = root?;
    while let Some(l) = get_l(arena, curr) {
        curr = l;
    }
    Some(curr)
}

/// Rightmost node of the subtree rooted at `root`.
pub fn last<N: LinkNode>(arena: &[N], root: Option<u32>) -> Option<u32> {
    let mut curr = root?;
    while let Some(r) = get_r(arena, curr) {
        curr = r;
    }
    Some(curr)
}

/// In-order successor.
pub fn next<N: LinkNode>(arena: &[N], node: u32) -> Option<u32> {
    if let Some(r) = get_r(arena, node) {
        return first(arena, Some(r));
    }
    let mut curr = node;
    let mut p = get_p(arena, node);
    while let Some(pi) = p {
        if get_r(arena, pi) == Some(curr) {
            curr = pi;
            p = get_p(arena, pi);
        } else {
            return Some(pi);
        }
    }
    None
}

/// In-order predecessor.
pub fn prev<N: LinkNode>(arena: &[N], node: u32) -> Option<u32> {
    if let Some(l) = get_l(arena, node) {
        return last(arena, Some(l));
    }
    let mut curr = node;
    let mut p = get_p(arena, node);
    while let Some(pi) = p {
        if get_l(arena, pi) == Some(curr) {
            curr = pi;
            p = get_p(arena, pi);
        } else {
            return Some(pi);
        }
    }
    None
}

/// Plain BST lookup. Returns the first match hit on the descent, which for
/// equal-key runs is not necessarily the in-order first; variant-specific
/// `find`s refine this.
pub fn find<K, N, C>(arena: &[N], root: Option<u32>, query: &K, comparator: &C) -> Option<u32>
where
    N: KeyNode<K>,
    C: Fn(&K, &K) -> i32,
{
    let mut curr = root;
    while let Some(i) = curr {
        let c = comparator(query, arena[i as usize].key());
        if c == 0 {
            return Some(i);
        }
        curr = if c < 0 {
            get_l(arena, i)
        } else {
            get_r(arena, i)
        };
    }
    None
}

/// Least node whose key is not less than `query`.
pub fn lower_bound<K, N, C>(arena: &[N], root: Option<u32>, query: &K, comparator: &C) -> Option<u32>
where
    N: KeyNode<K>,
    C: Fn(&K, &K) -> i32,
{
    let mut bound = None;
    let mut curr = root;
    while let Some(i) = curr {
        if comparator(arena[i as usize].key(), query) < 0 {
            curr = get_r(arena, i);
        } else {
            bound = Some(i);
            curr = get_l(arena, i);
        }
    }
    bound
}

/// Least node whose key is strictly greater than `query`.
pub fn upper_bound<K, N, C>(arena: &[N], root: Option<u32>, query: &K, comparator: &C) -> Option<u32>
where
    N: KeyNode<K>,
    C: Fn(&K, &K) -> i32,
{
    let mut bound = None;
    let mut curr = root;
    while let Some(i) = curr {
        if comparator(arena[i as usize].key(), query) <= 0 {
            curr = get_r(arena, i);
        } else {
            bound = Some(i);
            curr = get_l(arena, i);
        }
    }
    bound
}

/// Number of nodes in the subtree rooted at `root`, by traversal.
pub fn subtree_size<N: LinkNode>(arena: &[N], root: Option<u32>) -> usize {
    let Some(root) = root else {
        return 0;
    };
    let stop = last(arena, Some(root));
    let mut count = 0;
    let mut curr = first(arena, Some(root));
    while let Some(i) = curr {
        count += 1;
        if Some(i) == stop {
            break;
        }
        curr = next(arena, i);
    }
    count
}

/// Height of the tree in nodes; an empty tree has height 0.
pub fn height<N: LinkNode>(arena: &[N], root: Option<u32>) -> usize {
    match root {
        None => 0,
        Some(i) => {
            1 + height(arena, get_l(arena, i)).max(height(arena, get_r(arena, i)))
        }
    }
}

/// Checks reachability, acyclicity and parent coherence of the tree rooted
/// at `root`.
pub fn verify_tree<N: LinkNode>(arena: &[N], root: Option<u32>) -> Result<(), VerifyError> {
    let Some(root) = root else {
        return Ok(());
    };

    if get_p(arena, root).is_some() {
        return Err(VerifyError::RootHasParent { root });
    }

    let mut seen = HashSet::new();
    let mut curr = first(arena, Some(root));
    while let Some(i) = curr {
        if !seen.insert(i) {
            return Err(VerifyError::Cycle { node: i });
        }

        if let Some(l) = get_l(arena, i) {
            if get_p(arena, l) != Some(i) {
                return Err(VerifyError::BrokenParentLink {
                    parent: i,
                    child: l,
                });
            }
        }
        if let Some(r) = get_r(arena, i) {
            if get_p(arena, r) != Some(i) {
                return Err(VerifyError::BrokenParentLink {
                    parent: i,
                    child: r,
                });
            }
        }

        curr = next(arena, i);
    }

    Ok(())
}

/// Checks the BST order invariant: no left child greater than its parent, no
/// right child smaller.
pub fn verify_order<K, N, C>(
    arena: &[N],
    root: Option<u32>,
    comparator: &C,
) -> Result<(), VerifyError>
where
    N: KeyNode<K>,
    C: Fn(&K, &K) -> i32,
{
    let mut curr = first(arena, root);
    let mut prev_node: Option<u32> = None;
    while let Some(i) = curr {
        if let Some(p) = prev_node {
            if comparator(arena[p as usize].key(), arena[i as usize].key()) > 0 {
                return Err(VerifyError::OrderViolation { node: i });
            }
        }
        prev_node = Some(i);
        curr = next(arena, i);
    }
    Ok(())
}
