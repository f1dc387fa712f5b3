//! The equality chain: a doubly-linked list threading every maximal run of
//! equal-comparing nodes, in insertion order.
//!
//! When a tree never holds equal keys the links simply stay `None` and every
//! operation here is a cheap no-op, so the callers never need to branch on
//! the `multiple` option.

use std::collections::HashSet;

use crate::error::VerifyError;

use super::types::RbNodeLike;

#[inline]
fn get_prev<K, V, N: RbNodeLike<K, V>>(arena: &[N], i: u32) -> Option<u32> {
    arena[i as usize].chain_prev()
}

#[inline]
fn get_next<K, V, N: RbNodeLike<K, V>>(arena: &[N], i: u32) -> Option<u32> {
    arena[i as usize].chain_next()
}

#[inline]
fn set_prev<K, V, N: RbNodeLike<K, V>>(arena: &mut [N], i: u32, v: Option<u32>) {
    arena[i as usize].set_chain_prev(v);
}

#[inline]
fn set_next<K, V, N: RbNodeLike<K, V>>(arena: &mut [N], i: u32, v: Option<u32>) {
    arena[i as usize].set_chain_next(v);
}

/// Starts a fresh single-node chain.
pub fn make_singleton<K, V, N: RbNodeLike<K, V>>(arena: &mut [N], node: u32) {
    set_prev(arena, node, None);
    set_next(arena, node, None);
}

/// Threads `node` in as the chain successor of `pivot`.
pub fn insert_after<K, V, N: RbNodeLike<K, V>>(arena: &mut [N], node: u32, pivot: u32) {
    let pivot_next = get_next(arena, pivot);
    set_next(arena, node, pivot_next);
    set_prev(arena, node, Some(pivot));
    if let Some(pn) = pivot_next {
        set_prev(arena, pn, Some(node));
    }
    set_next(arena, pivot, Some(node));
}

/// Threads `node` in as the chain predecessor of `pivot`.
pub fn insert_before<K, V, N: RbNodeLike<K, V>>(arena: &mut [N], node: u32, pivot: u32) {
    let pivot_prev = get_prev(arena, pivot);
    set_prev(arena, node, pivot_prev);
    set_next(arena, node, Some(pivot));
    if let Some(pp) = pivot_prev {
        set_next(arena, pp, Some(node));
    }
    set_prev(arena, pivot, Some(node));
}

/// Unlinks `node` from its chain. The node's own links are left stale; a
/// detached node's links must not be read.
pub fn unlink<K, V, N: RbNodeLike<K, V>>(arena: &mut [N], node: u32) {
    let prev = get_prev(arena, node);
    let next = get_next(arena, node);
    if let Some(n) = next {
        set_prev(arena, n, prev);
    }
    if let Some(p) = prev {
        set_next(arena, p, next);
    }
}

/// Head of the chain `node` belongs to: the first-inserted equal node.
pub fn find_first<K, V, N: RbNodeLike<K, V>>(arena: &[N], node: u32) -> u32 {
    let mut curr = node;
    while let Some(p) = get_prev(arena, curr) {
        curr = p;
    }
    curr
}

/// Chain successor.
pub fn next<K, V, N: RbNodeLike<K, V>>(arena: &[N], node: u32) -> Option<u32> {
    get_next(arena, node)
}

/// Chain predecessor.
pub fn prev<K, V, N: RbNodeLike<K, V>>(arena: &[N], node: u32) -> Option<u32> {
    get_prev(arena, node)
}

/// True when `a` comes before `b` in their shared chain, i.e. `a` was
/// inserted earlier. False when the two are not chained together.
pub fn precedes<K, V, N: RbNodeLike<K, V>>(arena: &[N], a: u32, b: u32) -> bool {
    if a == b {
        return false;
    }
    let mut curr = get_next(arena, a);
    while let Some(i) = curr {
        if i == b {
            return true;
        }
        curr = get_next(arena, i);
    }
    false
}

/// Swaps the chain positions of two tree-swapped nodes. A no-op when the
/// comparator distinguishes them (they then live in different chains, which
/// the tree swap does not disturb).
pub fn swap_if_necessary<K, V, N, C>(arena: &mut [N], n1: u32, n2: u32, comparator: &C)
where
    N: RbNodeLike<K, V>,
    C: Fn(&K, &K) -> i32,
{
    if comparator(arena[n1 as usize].key(), arena[n2 as usize].key()) != 0 {
        return;
    }

    if get_next(arena, n1) == Some(n2) {
        // n1 directly precedes n2: the links interleave.
        let n2_next = get_next(arena, n2);
        let n1_prev = get_prev(arena, n1);
        set_next(arena, n1, n2_next);
        set_prev(arena, n2, n1_prev);
        set_prev(arena, n1, Some(n2));
        set_next(arena, n2, Some(n1));

        if let Some(nn) = get_next(arena, n1) {
            set_prev(arena, nn, Some(n1));
        }
        if let Some(pp) = get_prev(arena, n2) {
            set_next(arena, pp, Some(n2));
        }
    } else if get_next(arena, n2) == Some(n1) {
        let n1_next = get_next(arena, n1);
        let n2_prev = get_prev(arena, n2);
        set_next(arena, n2, n1_next);
        set_prev(arena, n1, n2_prev);
        set_prev(arena, n2, Some(n1));
        set_next(arena, n1, Some(n2));

        if let Some(nn) = get_next(arena, n2) {
            set_prev(arena, nn, Some(n2));
        }
        if let Some(pp) = get_prev(arena, n1) {
            set_next(arena, pp, Some(n1));
        }
    } else {
        let p1 = get_prev(arena, n1);
        let x1 = get_next(arena, n1);
        set_prev(arena, n1, get_prev(arena, n2));
        set_next(arena, n1, get_next(arena, n2));
        set_prev(arena, n2, p1);
        set_next(arena, n2, x1);

        for n in [n1, n2] {
            if let Some(nn) = get_next(arena, n) {
                set_prev(arena, nn, Some(n));
            }
            if let Some(pp) = get_prev(arena, n) {
                set_next(arena, pp, Some(n));
            }
        }
    }
}

/// Walks the chain in both directions from `node`, checking back-links and
/// cycle freedom.
pub fn verify<K, V, N: RbNodeLike<K, V>>(arena: &[N], node: u32) -> Result<(), VerifyError> {
    let mut seen = HashSet::new();
    seen.insert(node);

    let mut curr = node;
    while let Some(p) = get_prev(arena, curr) {
        if get_next(arena, p) != Some(curr) {
            return Err(VerifyError::ChainBroken { node: curr });
        }
        curr = p;
        if !seen.insert(curr) {
            return Err(VerifyError::ChainBroken { node: curr });
        }
    }

    curr = node;
    while let Some(n) = get_next(arena, curr) {
        if get_prev(arena, n) != Some(curr) {
            return Err(VerifyError::ChainBroken { node: curr });
        }
        curr = n;
        if !seen.insert(curr) {
            return Err(VerifyError::ChainBroken { node: curr });
        }
    }

    Ok(())
}
