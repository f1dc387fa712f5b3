//! Energy tree: a weight-balanced BST that rebalances by lazily rebuilding
//! whole subtrees.
//!
//! Every insert or delete that passes through a node bumps its energy
//! counter. Once a node's energy exceeds `alpha` times its subtree size, the
//! topmost such node on the touched path has its subtree rebuilt into a
//! perfectly balanced layout, resetting all energies below it to zero.

pub mod types;

pub use types::{EnergyNode, EnergyNodeLike};

use std::io;
use std::path::Path;

use crate::dot;
use crate::error::VerifyError;
use crate::iter::{Iter, RevIter};
use crate::options::{EnergyOptions, TreeOptions};
use crate::types::default_comparator;
use crate::util::{
    find, first, get_l, get_p, get_r, last, lower_bound, next, set_l, set_p, set_r, subtree_size,
    upper_bound, verify_order, verify_tree,
};

#[inline]
fn size_of<K, V, N: EnergyNodeLike<K, V>>(arena: &[N], i: u32) -> u32 {
    arena[i as usize].size()
}

#[inline]
fn violates<K, V, N: EnergyNodeLike<K, V>>(arena: &[N], i: u32, alpha: f64) -> bool {
    arena[i as usize].energy() as f64 > alpha * arena[i as usize].size() as f64
}

#[inline]
fn touch<K, V, N: EnergyNodeLike<K, V>>(arena: &mut [N], i: u32, size_delta: i32) {
    let node = &mut arena[i as usize];
    node.set_size(node.size().wrapping_add(size_delta as u32));
    node.set_energy(node.energy() + 1);
}

/// Inserts `n`, bumping size and energy along the descent and rebuilding at
/// the highest node that tipped over the threshold.
pub fn insert<K, V, N, C>(
    arena: &mut [N],
    root: Option<u32>,
    n: u32,
    options: &EnergyOptions,
    comparator: &C,
    rebuild_buffer: &mut Vec<u32>,
) -> Option<u32>
where
    N: EnergyNodeLike<K, V>,
    C: Fn(&K, &K) -> i32,
{
    {
        let node = &mut arena[n as usize];
        node.set_size(1);
        node.set_energy(0);
        node.set_l(None);
        node.set_r(None);
    }

    let Some(mut cur) = root else {
        set_p(arena, n, None);
        return Some(n);
    };
    let mut root = root;
    let mut rebuild_at: Option<u32> = None;

    loop {
        touch(arena, cur, 1);
        if rebuild_at.is_none() && violates(arena, cur, options.alpha) {
            rebuild_at = Some(cur);
        }

        if comparator(arena[cur as usize].key(), arena[n as usize].key()) < 0 {
            match get_r(arena, cur) {
                Some(r) => cur = r,
                None => {
                    set_r(arena, cur, Some(n));
                    set_p(arena, n, Some(cur));
                    break;
                }
            }
        } else {
            match get_l(arena, cur) {
                Some(l) => cur = l,
                None => {
                    set_l(arena, cur, Some(n));
                    set_p(arena, n, Some(cur));
                    break;
                }
            }
        }
    }

    if let Some(rb) = rebuild_at {
        root = rebuild_below(arena, root, rb, rebuild_buffer);
    }
    root
}

/// Detaches `node` with left-leaning predecessor splicing, bumping energies
/// on every touched path and rebuilding at the topmost node over the
/// threshold.
pub fn remove<K, V, N>(
    arena: &mut [N],
    mut root: Option<u32>,
    node: u32,
    options: &EnergyOptions,
    rebuild_buffer: &mut Vec<u32>,
) -> Option<u32>
where
    N: EnergyNodeLike<K, V>,
{
    // Walk up first: every ancestor loses one descendant. The last
    // assignment wins, which is the topmost violator.
    let mut rebuild_at: Option<u32> = None;
    let mut rebuild_set_upwards = false;
    let mut cur = node;
    while let Some(p) = get_p(arena, cur) {
        cur = p;
        touch(arena, p, -1);
        if violates(arena, p, options.alpha) {
            rebuild_at = Some(p);
            rebuild_set_upwards = true;
        }
    }

    let l = get_l(arena, node);
    let r = get_r(arena, node);

    if l.is_none() && r.is_none() {
        match get_p(arena, node) {
            None => return None,
            Some(p) => {
                if get_l(arena, p) == Some(node) {
                    set_l(arena, p, None);
                } else {
                    set_r(arena, p, None);
                }
            }
        }
    } else {
        let mut descent_rebuild: Option<u32> = None;
        let child;

        if let Some(l0) = l {
            // Predecessor: rightmost of the left subtree. The nodes passed
            // on the way keep their counters honest for the departure.
            let mut c = l0;
            while let Some(rr) = get_r(arena, c) {
                touch(arena, c, -1);
                if descent_rebuild.is_none() && violates(arena, c, options.alpha) {
                    descent_rebuild = Some(c);
                }
                c = rr;
            }
            if c != l0 {
                let cp = get_p(arena, c).expect("descended node has a parent");
                set_r(arena, cp, get_l(arena, c));
                if let Some(cl) = get_l(arena, c) {
                    set_p(arena, cl, Some(cp));
                }
                set_l(arena, c, Some(l0));
                set_p(arena, l0, Some(c));
            }
            set_r(arena, c, r);
            if let Some(r0) = r {
                set_p(arena, r0, Some(c));
            }
            child = c;
        } else {
            // Only a right subtree: successor splice, the mirror image.
            let r0 = r.expect("node has at least one child");
            let mut c = r0;
            while let Some(ll) = get_l(arena, c) {
                touch(arena, c, -1);
                if descent_rebuild.is_none() && violates(arena, c, options.alpha) {
                    descent_rebuild = Some(c);
                }
                c = ll;
            }
            if c != r0 {
                let cp = get_p(arena, c).expect("descended node has a parent");
                set_l(arena, cp, get_r(arena, c));
                if let Some(cr) = get_r(arena, c) {
                    set_p(arena, cr, Some(cp));
                }
                set_r(arena, c, Some(r0));
                set_p(arena, r0, Some(c));
            }
            child = c;
        }

        // The replacement takes the node's slot and counters.
        let np = get_p(arena, node);
        set_p(arena, child, np);
        match np {
            None => root = Some(child),
            Some(pp) => {
                if get_l(arena, pp) == Some(node) {
                    set_l(arena, pp, Some(child));
                } else {
                    set_r(arena, pp, Some(child));
                }
            }
        }
        {
            let (e, s) = {
                let n = &arena[node as usize];
                (n.energy() + 1, n.size() - 1)
            };
            let c = &mut arena[child as usize];
            c.set_energy(e);
            c.set_size(s);
        }

        if !rebuild_set_upwards {
            // The replacement sits above the splice path, so it is checked
            // first; a violating path node below it is covered either way.
            rebuild_at = if violates(arena, child, options.alpha) {
                Some(child)
            } else {
                descent_rebuild
            };
        }
    }

    if let Some(rb) = rebuild_at {
        root = rebuild_below(arena, root, rb, rebuild_buffer);
    }
    root
}

fn level_offset(levels: usize, level: usize) -> usize {
    (1 << levels) - (1 << (levels - level))
}

/// Slot of the `c`-th in-order node (1-based) in the bottom-up layout.
///
/// Nodes at odd in-order positions fill the partial bottom level left to
/// right; the rest land in the perfect upper tree, addressed by the trailing
/// zeros of their remapped counter. Past the interleaved region (`c` beyond
/// twice the bottom occupancy) everything is an upper node.
fn slot_for(c: usize, bottom_real: usize) -> (usize, usize) {
    if c <= 2 * bottom_real {
        if c % 2 == 1 {
            (0, (c - 1) / 2)
        } else {
            upper_slot(c / 2)
        }
    } else {
        upper_slot(c - bottom_real)
    }
}

fn upper_slot(c2: usize) -> (usize, usize) {
    let t = c2.trailing_zeros() as usize;
    (t + 1, c2 >> (t + 1))
}

/// Rebuilds the subtree rooted at `node` into a perfectly balanced layout:
/// collect in order into the buffer, relink level by level from the bottom
/// up, recompute sizes, zero all energies, reattach to the original parent.
pub fn rebuild_below<K, V, N>(
    arena: &mut [N],
    mut root: Option<u32>,
    node: u32,
    rebuild_buffer: &mut Vec<u32>,
) -> Option<u32>
where
    N: EnergyNodeLike<K, V>,
{
    let count = size_of(arena, node) as usize;
    let levels = (count + 1).next_power_of_two().trailing_zeros() as usize;
    let full = (1usize << levels) - 1;
    let bottom_real = count - ((1 << (levels - 1)) - 1);

    rebuild_buffer.clear();
    rebuild_buffer.resize(full, 0);

    let original_parent = get_p(arena, node);
    let original_size = size_of(arena, node);

    let mut cur = first(arena, Some(node)).expect("subtree is non-empty");
    for c in 1..=count {
        let (level, idx) = slot_for(c, bottom_real);
        rebuild_buffer[level_offset(levels, level) + idx] = cur;
        if c < count {
            cur = next(arena, cur).expect("in-order walk stays inside the subtree");
        }
    }

    if levels > 1 {
        // The bottom level may be partial; its parents take whatever
        // children are real and the children become leaves.
        let l1_off = level_offset(levels, 1);
        let l1_count = 1usize << (levels - 2);
        for j in 0..l1_count {
            let parent = rebuild_buffer[l1_off + j];
            let lc = (2 * j < bottom_real).then(|| rebuild_buffer[2 * j]);
            let rc = (2 * j + 1 < bottom_real).then(|| rebuild_buffer[2 * j + 1]);
            set_l(arena, parent, lc);
            set_r(arena, parent, rc);
            let mut s = 1;
            for c in [lc, rc].into_iter().flatten() {
                set_l(arena, c, None);
                set_r(arena, c, None);
                set_p(arena, c, Some(parent));
                arena[c as usize].set_size(1);
                arena[c as usize].set_energy(0);
                s += 1;
            }
            arena[parent as usize].set_size(s);
            arena[parent as usize].set_energy(0);
        }

        // Every level above the bottom is full.
        for level in 2..levels {
            let off = level_offset(levels, level);
            let below = level_offset(levels, level - 1);
            for j in 0..(1usize << (levels - 1 - level)) {
                let parent = rebuild_buffer[off + j];
                let lc = rebuild_buffer[below + 2 * j];
                let rc = rebuild_buffer[below + 2 * j + 1];
                set_l(arena, parent, Some(lc));
                set_r(arena, parent, Some(rc));
                set_p(arena, lc, Some(parent));
                set_p(arena, rc, Some(parent));
                let s = size_of(arena, lc) + size_of(arena, rc) + 1;
                arena[parent as usize].set_size(s);
                arena[parent as usize].set_energy(0);
            }
        }
    }

    let top = rebuild_buffer[full - 1];
    set_p(arena, top, original_parent);
    match original_parent {
        None => root = Some(top),
        Some(op) => {
            if get_l(arena, op) == Some(node) {
                set_l(arena, op, Some(top));
            } else {
                set_r(arena, op, Some(top));
            }
        }
    }
    arena[top as usize].set_size(original_size);
    arena[top as usize].set_energy(0);

    root
}

/// Checks shape, order, size sums and the energy threshold.
pub fn verify<K, V, N, C>(
    arena: &[N],
    root: Option<u32>,
    options: &EnergyOptions,
    comparator: &C,
) -> Result<(), VerifyError>
where
    N: EnergyNodeLike<K, V>,
    C: Fn(&K, &K) -> i32,
{
    verify_tree(arena, root)?;
    verify_order(arena, root, comparator)?;

    let mut curr = first(arena, root);
    while let Some(i) = curr {
        let ls = get_l(arena, i).map_or(0, |l| size_of(arena, l));
        let rs = get_r(arena, i).map_or(0, |r| size_of(arena, r));
        if size_of(arena, i) != ls + rs + 1 {
            return Err(VerifyError::SizeMismatch { node: i });
        }
        if violates(arena, i, options.alpha) {
            return Err(VerifyError::EnergyOverflow { node: i });
        }
        curr = next(arena, i);
    }
    Ok(())
}

/// Owning energy-tree wrapper; holds the reusable rebuild buffer, which
/// grows monotonically to the largest rebuild seen.
pub struct EnergyTree<K, V, C = fn(&K, &K) -> i32>
where
    C: Fn(&K, &K) -> i32,
{
    arena: Vec<EnergyNode<K, V>>,
    root: Option<u32>,
    len: usize,
    options: TreeOptions,
    energy_options: EnergyOptions,
    comparator: C,
    rebuild_buffer: Vec<u32>,
}

impl<K: PartialOrd, V> EnergyTree<K, V> {
    pub fn new() -> Self {
        Self::with(
            default_comparator::<K>,
            TreeOptions::default(),
            EnergyOptions::default(),
        )
    }

    pub fn with_options(options: TreeOptions, energy_options: EnergyOptions) -> Self {
        Self::with(default_comparator::<K>, options, energy_options)
    }
}

impl<K: PartialOrd, V> Default for EnergyTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> EnergyTree<K, V, C>
where
    C: Fn(&K, &K) -> i32,
{
    pub fn with(comparator: C, options: TreeOptions, energy_options: EnergyOptions) -> Self {
        options.assert_coherent();
        assert!(
            energy_options.alpha > 0.0 && energy_options.alpha < 1.0,
            "alpha must be in (0, 1)"
        );
        Self {
            arena: Vec::new(),
            root: None,
            len: 0,
            options,
            energy_options,
            comparator,
            rebuild_buffer: Vec::new(),
        }
    }

    /// Inserts a key/value pair and returns the new node's index, or `None`
    /// when the key already exists and `multiple` is off.
    pub fn insert(&mut self, key: K, value: V) -> Option<u32> {
        if !self.options.multiple && self.find(&key).is_some() {
            return None;
        }
        let idx = self.arena.len() as u32;
        self.arena.push(EnergyNode::new(key, value));
        self.root = insert(
            &mut self.arena,
            self.root,
            idx,
            &self.energy_options,
            &self.comparator,
            &mut self.rebuild_buffer,
        );
        self.len += 1;
        Some(idx)
    }

    /// Detaches the node at `idx`.
    pub fn remove(&mut self, idx: u32) {
        self.root = remove(
            &mut self.arena,
            self.root,
            idx,
            &self.energy_options,
            &mut self.rebuild_buffer,
        );
        self.len -= 1;
    }

    pub fn find(&self, key: &K) -> Option<u32> {
        find(&self.arena, self.root, key, &self.comparator)
    }

    pub fn lower_bound(&self, key: &K) -> Option<u32> {
        lower_bound(&self.arena, self.root, key, &self.comparator)
    }

    pub fn upper_bound(&self, key: &K) -> Option<u32> {
        upper_bound(&self.arena, self.root, key, &self.comparator)
    }

    pub fn key(&self, idx: u32) -> &K {
        &self.arena[idx as usize].k
    }

    pub fn value(&self, idx: u32) -> &V {
        &self.arena[idx as usize].v
    }

    pub fn value_mut(&mut self, idx: u32) -> &mut V {
        &mut self.arena[idx as usize].v
    }

    pub fn arena(&self) -> &[EnergyNode<K, V>] {
        &self.arena
    }

    pub fn root_index(&self) -> Option<u32> {
        self.root
    }

    pub fn len(&self) -> usize {
        if self.options.constant_time_size {
            self.len
        } else {
            subtree_size(&self.arena, self.root)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.len = 0;
    }

    pub fn first(&self) -> Option<u32> {
        first(&self.arena, self.root)
    }

    pub fn last(&self) -> Option<u32> {
        last(&self.arena, self.root)
    }

    pub fn iter(&self) -> Iter<'_, EnergyNode<K, V>> {
        Iter::new(&self.arena, self.first())
    }

    pub fn iter_rev(&self) -> RevIter<'_, EnergyNode<K, V>> {
        RevIter::new(&self.arena, self.last())
    }

    pub fn iter_from(&self, idx: u32) -> Iter<'_, EnergyNode<K, V>> {
        Iter::new(&self.arena, Some(idx))
    }

    pub fn verify(&self) -> Result<(), VerifyError> {
        verify(
            &self.arena,
            self.root,
            &self.energy_options,
            &self.comparator,
        )
    }

    pub fn verify_integrity(&self) -> bool {
        self.verify().is_ok()
    }

    pub fn dump_to_dot<P: AsRef<Path>>(&self, path: P) -> io::Result<()>
    where
        K: std::fmt::Display,
    {
        dot::dump_to_dot(
            &self.arena,
            self.root,
            path,
            |n: &EnergyNode<K, V>| format!("{} ({}/{})", n.k, n.energy, n.size),
            |_| "black",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_layout_is_in_order_for_small_sizes() {
        // Walking levels bottom-up must reproduce 1..=count in order for
        // every size, partial bottom levels included.
        for count in 1usize..=64 {
            let levels = (count + 1).next_power_of_two().trailing_zeros() as usize;
            let full = (1usize << levels) - 1;
            let bottom_real = count - ((1 << (levels - 1)) - 1);

            let mut buf = vec![0usize; full];
            let mut filled = vec![false; full];
            for c in 1..=count {
                let (level, idx) = slot_for(c, bottom_real);
                let slot = level_offset(levels, level) + idx;
                assert!(!filled[slot], "count {count}: slot {slot} filled twice");
                filled[slot] = true;
                buf[slot] = c;
            }

            // Real slots: the first bottom_real of the bottom level and the
            // whole upper tree.
            for (slot, &f) in filled.iter().enumerate() {
                let expected = slot >= level_offset(levels, 1) || slot < bottom_real;
                assert_eq!(f, expected, "count {count}: slot {slot}");
            }

            // Reconstruct the in-order sequence from the layout.
            fn walk(
                buf: &[usize],
                filled: &[bool],
                levels: usize,
                level: usize,
                idx: usize,
                out: &mut Vec<usize>,
            ) {
                if level_offset(levels, level) + idx >= buf.len()
                    || !filled[level_offset(levels, level) + idx]
                {
                    return;
                }
                if level > 0 {
                    walk(buf, filled, levels, level - 1, 2 * idx, out);
                }
                out.push(buf[level_offset(levels, level) + idx]);
                if level > 0 {
                    walk(buf, filled, levels, level - 1, 2 * idx + 1, out);
                }
            }
            let mut seq = Vec::new();
            walk(&buf, &filled, levels, levels - 1, 0, &mut seq);
            assert_eq!(seq, (1..=count).collect::<Vec<_>>(), "count {count}");
        }
    }
}
