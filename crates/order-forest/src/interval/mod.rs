//! Interval tree: the red-black core augmented through its hooks with the
//! maximum upper endpoint of every subtree, which prunes overlap queries.

pub mod types;

pub use types::{iv_cmp, IntervalNodeLike, Iv, IvNode};

use std::io;
use std::path::Path;

use crate::dot;
use crate::error::VerifyError;
use crate::iter::{Iter, RevIter};
use crate::options::TreeOptions;
use crate::red_black::traits::RbTraits;
use crate::red_black::util as rb;
use crate::util::{first, get_l, get_p, get_r, last, next, subtree_size};

/// Recomputes a node's cached maximum from its own upper endpoint and its
/// children's caches. Returns whether the stored value changed.
fn fix_node<K, V, N>(arena: &mut [N], i: u32) -> bool
where
    K: PartialOrd + Clone,
    N: IntervalNodeLike<K, V>,
{
    let mut m = arena[i as usize].key().hi.clone();
    if let Some(l) = get_l(arena, i) {
        let lm = arena[l as usize].max_upper();
        if *lm > m {
            m = lm.clone();
        }
    }
    if let Some(r) = get_r(arena, i) {
        let rm = arena[r as usize].max_upper();
        if *rm > m {
            m = rm.clone();
        }
    }

    if *arena[i as usize].max_upper() == m {
        false
    } else {
        arena[i as usize].set_max_upper(m);
        true
    }
}

/// Fixes `i`, then walks up while the stored maximum keeps changing.
fn fix_upward<K, V, N>(arena: &mut [N], i: u32)
where
    K: PartialOrd + Clone,
    N: IntervalNodeLike<K, V>,
{
    fix_node(arena, i);
    let mut cur = i;
    while let Some(p) = get_p(arena, cur) {
        if !fix_node(arena, p) {
            break;
        }
        cur = p;
    }
}

/// Hook bundle maintaining the cached maxima through every structural event.
pub struct IvTraits;

impl<K, V, N> RbTraits<Iv<K>, V, N> for IvTraits
where
    K: PartialOrd + Clone,
    N: IntervalNodeLike<K, V>,
{
    fn leaf_inserted(arena: &mut [N], node: u32) {
        fix_upward(arena, node);
    }

    fn rotated_left(arena: &mut [N], node: u32) {
        // A rotation moves no content across its top, so fixing the two
        // rotated nodes bottom-up is enough.
        fix_node(arena, node);
        if let Some(p) = get_p(arena, node) {
            fix_node(arena, p);
        }
    }

    fn rotated_right(arena: &mut [N], node: u32) {
        fix_node(arena, node);
        if let Some(p) = get_p(arena, node) {
            fix_node(arena, p);
        }
    }

    fn deleted_below(arena: &mut [N], node: u32) {
        fix_upward(arena, node);
    }

    fn swapped(arena: &mut [N], n1: u32, n2: u32) {
        fix_upward(arena, n1);
        fix_upward(arena, n2);
    }
}

fn overlaps<K: PartialOrd>(iv: &Iv<K>, ql: &K, qu: &K) -> bool {
    iv.lo <= *qu && iv.hi >= *ql
}

/// Leftmost node overlapping `[ql, qu]`: descend left while the left child's
/// cached maximum can still reach `ql`, then scan forward.
pub fn first_overlapping<K, V, N>(
    arena: &[N],
    root: Option<u32>,
    ql: &K,
    qu: &K,
) -> Option<u32>
where
    K: PartialOrd,
    N: IntervalNodeLike<K, V>,
{
    let mut cur = root?;
    while let Some(l) = get_l(arena, cur) {
        if *arena[l as usize].max_upper() >= *ql {
            cur = l;
        } else {
            break;
        }
    }

    if arena[cur as usize].key().lo > *qu {
        return None;
    }
    if overlaps(arena[cur as usize].key(), ql, qu) {
        return Some(cur);
    }
    next_overlapping(arena, cur, ql, qu)
}

/// In-order successor scan from `start`, skipping right subtrees whose upper
/// endpoints all fall short of `ql` and stopping for good once the lower
/// endpoints have passed `qu`.
pub fn next_overlapping<K, V, N>(arena: &[N], start: u32, ql: &K, qu: &K) -> Option<u32>
where
    K: PartialOrd,
    N: IntervalNodeLike<K, V>,
{
    let mut cur = start;
    loop {
        match get_r(arena, cur) {
            Some(r) if *arena[r as usize].max_upper() >= *ql => {
                cur = r;
                while let Some(l) = get_l(arena, cur) {
                    if *arena[l as usize].max_upper() >= *ql {
                        cur = l;
                    } else {
                        break;
                    }
                }
            }
            _ => {
                // Climb until we arrive from a left child.
                loop {
                    let p = get_p(arena, cur)?;
                    let from_left = get_l(arena, p) == Some(cur);
                    cur = p;
                    if from_left {
                        break;
                    }
                }
            }
        }

        if arena[cur as usize].key().lo > *qu {
            return None;
        }
        if arena[cur as usize].key().hi >= *ql {
            return Some(cur);
        }
    }
}

/// Single-pass iterator over the nodes overlapping a query interval, in
/// order.
pub struct QueryIter<'a, K, V, N = IvNode<K, V>>
where
    K: PartialOrd,
    N: IntervalNodeLike<K, V>,
{
    arena: &'a [N],
    curr: Option<u32>,
    ql: K,
    qu: K,
    _marker: std::marker::PhantomData<V>,
}

impl<'a, K, V, N> Iterator for QueryIter<'a, K, V, N>
where
    K: PartialOrd,
    N: IntervalNodeLike<K, V>,
{
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        let out = self.curr?;
        self.curr = next_overlapping(self.arena, out, &self.ql, &self.qu);
        Some(out)
    }
}

/// Owning interval-tree wrapper. Nodes are ordered by `(lo, hi)`; every
/// structural change keeps the cached subtree maxima current.
pub struct IntervalTree<K, V>
where
    K: PartialOrd + Clone,
{
    arena: Vec<IvNode<K, V>>,
    root: Option<u32>,
    len: usize,
    options: TreeOptions,
}

impl<K, V> IntervalTree<K, V>
where
    K: PartialOrd + Clone,
{
    pub fn new() -> Self {
        Self::with_options(TreeOptions::default())
    }

    pub fn with_options(options: TreeOptions) -> Self {
        options.assert_coherent();
        Self {
            arena: Vec::new(),
            root: None,
            len: 0,
            options,
        }
    }

    /// Inserts the interval `[lo, hi]` and returns the new node's index, or
    /// `None` when an equal interval exists and `multiple` is off.
    pub fn insert(&mut self, lo: K, hi: K, value: V) -> Option<u32> {
        let idx = self.arena.len() as u32;
        self.arena.push(IvNode::new(Iv::new(lo, hi), value));
        let cmp = iv_cmp::<K>;
        let (root, inserted) = rb::insert::<Iv<K>, V, IvNode<K, V>, IvTraits, _>(
            &mut self.arena,
            self.root,
            idx,
            &cmp,
            self.options.multiple,
        );
        self.root = root;
        if inserted {
            self.len += 1;
            Some(idx)
        } else {
            self.arena.pop();
            None
        }
    }

    /// Detaches the node at `idx`.
    pub fn remove(&mut self, idx: u32) {
        let cmp = iv_cmp::<K>;
        self.root = rb::remove::<Iv<K>, V, IvNode<K, V>, IvTraits, _>(
            &mut self.arena,
            self.root,
            idx,
            &cmp,
        );
        self.len -= 1;
    }

    /// Finds a node holding exactly `[lo, hi]` (the first-inserted one of an
    /// equal run).
    pub fn find(&self, lo: &K, hi: &K) -> Option<u32> {
        let cmp = iv_cmp::<K>;
        let query = Iv::new(lo.clone(), hi.clone());
        rb::find::<Iv<K>, V, IvNode<K, V>, _>(&self.arena, self.root, &query, &cmp)
    }

    /// All nodes whose intervals overlap `[ql, qu]`, in order.
    pub fn query(&self, ql: K, qu: K) -> QueryIter<'_, K, V> {
        let curr = first_overlapping(&self.arena, self.root, &ql, &qu);
        QueryIter {
            arena: &self.arena,
            curr,
            ql,
            qu,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn interval(&self, idx: u32) -> &Iv<K> {
        &self.arena[idx as usize].k
    }

    pub fn value(&self, idx: u32) -> &V {
        &self.arena[idx as usize].v
    }

    pub fn value_mut(&mut self, idx: u32) -> &mut V {
        &mut self.arena[idx as usize].v
    }

    pub fn arena(&self) -> &[IvNode<K, V>] {
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

    pub fn iter(&self) -> Iter<'_, IvNode<K, V>> {
        Iter::new(&self.arena, self.first())
    }

    pub fn iter_rev(&self) -> RevIter<'_, IvNode<K, V>> {
        RevIter::new(&self.arena, self.last())
    }

    pub fn iter_from(&self, idx: u32) -> Iter<'_, IvNode<K, V>> {
        Iter::new(&self.arena, Some(idx))
    }

    /// Checks the red-black invariants plus the cached maxima.
    pub fn verify(&self) -> Result<(), VerifyError> {
        let cmp = iv_cmp::<K>;
        rb::verify::<Iv<K>, V, IvNode<K, V>, _>(&self.arena, self.root, &cmp)?;
        self.verify_maxima()
    }

    pub fn verify_integrity(&self) -> bool {
        self.verify().is_ok()
    }

    fn verify_maxima(&self) -> Result<(), VerifyError> {
        let mut curr = first(&self.arena, self.root);
        while let Some(i) = curr {
            let node = &self.arena[i as usize];
            let mut expected = node.k.hi.clone();
            if let Some(l) = get_l(&self.arena, i) {
                let lm = &self.arena[l as usize].max;
                if *lm > expected {
                    expected = lm.clone();
                }
            }
            if let Some(r) = get_r(&self.arena, i) {
                let rm = &self.arena[r as usize].max;
                if *rm > expected {
                    expected = rm.clone();
                }
            }
            if self.arena[i as usize].max != expected {
                return Err(VerifyError::MaxUpperMismatch { node: i });
            }
            curr = next(&self.arena, i);
        }
        Ok(())
    }

    pub fn dump_to_dot<P: AsRef<Path>>(&self, path: P) -> io::Result<()>
    where
        K: std::fmt::Display,
    {
        dot::dump_to_dot(
            &self.arena,
            self.root,
            path,
            |n: &IvNode<K, V>| format!("[{}, {}] max {}", n.k.lo, n.k.hi, n.max),
            |n: &IvNode<K, V>| if n.b { "black" } else { "red" },
        )
    }
}

impl<K, V> Default for IntervalTree<K, V>
where
    K: PartialOrd + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
