//! Zip tree: a randomized BST whose shape is fixed by per-node ranks.
//!
//! The rank of a node is the number of trailing zero bits of its key's
//! 64-bit hash, which is geometrically distributed with parameter ½. The
//! discipline is weak on the left and strict on the right:
//! `rank(l) ≤ rank(n)` and `rank(r) < rank(n)`, so runs of equal ranks lean
//! left. Insertion unzips the subtree it displaces; deletion zips the two
//! orphaned children back together.

pub mod types;

pub use types::{ZipNode, ZipNodeLike};

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::Path;

use crate::dot;
use crate::error::VerifyError;
use crate::iter::{Iter, RevIter};
use crate::options::{RankSource, TreeOptions, ZipOptions};
use crate::types::default_comparator;
use crate::util::{
    first, get_l, get_p, get_r, last, lower_bound, next, set_l, set_p, set_r, subtree_size,
    upper_bound, verify_order, verify_tree,
};

/// Rank of a key: trailing zeros of its hash, optionally universalized
/// through `(h · c) mod m` first.
pub fn derive_rank<K: Hash>(key: &K, options: &ZipOptions) -> u8 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let mut h = hasher.finish();
    if let Some(u) = options.universalize {
        h = h.wrapping_mul(u.coefficient) % u.modul;
    }
    h.trailing_zeros() as u8
}

fn rank_of<K, V, N>(arena: &[N], i: u32, options: &ZipOptions) -> u8
where
    K: Hash,
    N: ZipNodeLike<K, V>,
{
    match options.rank_source {
        RankSource::Stored => arena[i as usize].rank(),
        RankSource::Derived => derive_rank(arena[i as usize].key(), options),
    }
}

/// Inserts `n` with a rank derived from its key hash.
pub fn insert<K, V, N, C>(
    arena: &mut [N],
    root: Option<u32>,
    n: u32,
    options: &ZipOptions,
    comparator: &C,
) -> Option<u32>
where
    K: Hash,
    N: ZipNodeLike<K, V>,
    C: Fn(&K, &K) -> i32,
{
    let rank = derive_rank(arena[n as usize].key(), options);
    insert_ranked(arena, root, n, rank, options, comparator)
}

/// Inserts `n` with an explicit rank, for callers that bring their own rank
/// source. Under `RankSource::Stored` the rank is written into the node.
pub fn insert_ranked<K, V, N, C>(
    arena: &mut [N],
    root: Option<u32>,
    n: u32,
    rank: u8,
    options: &ZipOptions,
    comparator: &C,
) -> Option<u32>
where
    K: Hash,
    N: ZipNodeLike<K, V>,
    C: Fn(&K, &K) -> i32,
{
    if options.rank_source == RankSource::Stored {
        arena[n as usize].set_rank(rank);
    }
    set_l(arena, n, None);
    set_r(arena, n, None);

    // Descend while the current node outranks the new one; on a rank tie a
    // larger key keeps us descending (the new node may still sit below it
    // on the left, where equality is allowed).
    let mut prev: Option<u32> = None;
    let mut cur = root;
    while let Some(c) = cur {
        let cr = rank_of(arena, c, options);
        let keep_going = cr > rank
            || (cr == rank && comparator(arena[c as usize].key(), arena[n as usize].key()) > 0);
        if !keep_going {
            break;
        }
        prev = Some(c);
        cur = if comparator(arena[n as usize].key(), arena[c as usize].key()) < 0 {
            get_l(arena, c)
        } else {
            get_r(arena, c)
        };
    }

    // The new node takes cur's place below prev.
    set_p(arena, n, prev);
    if let Some(p) = prev {
        if comparator(arena[n as usize].key(), arena[p as usize].key()) < 0 {
            set_l(arena, p, Some(n));
        } else {
            set_r(arena, p, Some(n));
        }
    }

    // Unzip the displaced subtree: keys ≤ the new key form the left spine,
    // the rest the right spine.
    let mut left_tail: Option<u32> = None;
    let mut right_tail: Option<u32> = None;
    let mut sub = cur;
    while let Some(c) = sub {
        if comparator(arena[c as usize].key(), arena[n as usize].key()) <= 0 {
            match left_tail {
                None => {
                    set_l(arena, n, Some(c));
                    set_p(arena, c, Some(n));
                }
                Some(t) => {
                    set_r(arena, t, Some(c));
                    set_p(arena, c, Some(t));
                }
            }
            left_tail = Some(c);
            sub = get_r(arena, c);
        } else {
            match right_tail {
                None => {
                    set_r(arena, n, Some(c));
                    set_p(arena, c, Some(n));
                }
                Some(t) => {
                    set_l(arena, t, Some(c));
                    set_p(arena, c, Some(t));
                }
            }
            right_tail = Some(c);
            sub = get_l(arena, c);
        }
    }
    if let Some(t) = left_tail {
        set_r(arena, t, None);
    }
    if let Some(t) = right_tail {
        set_l(arena, t, None);
    }

    if prev.is_none() {
        Some(n)
    } else {
        root
    }
}

/// Detaches `node`, zipping its children back into one subtree.
pub fn remove<K, V, N>(
    arena: &mut [N],
    root: Option<u32>,
    node: u32,
    options: &ZipOptions,
) -> Option<u32>
where
    K: Hash,
    N: ZipNodeLike<K, V>,
{
    let merged = zip(arena, get_l(arena, node), get_r(arena, node), options);
    let p = get_p(arena, node);
    if let Some(m) = merged {
        set_p(arena, m, p);
    }
    match p {
        None => merged,
        Some(pp) => {
            if get_l(arena, pp) == Some(node) {
                set_l(arena, pp, merged);
            } else {
                set_r(arena, pp, merged);
            }
            root
        }
    }
}

/// Merges two subtrees where every key of `a` orders before every key of
/// `b`, repeatedly taking the higher-ranked root. Rank ties go to `b`, so an
/// equal rank only ever ends up hanging off a left link.
fn zip<K, V, N>(arena: &mut [N], a: Option<u32>, b: Option<u32>, options: &ZipOptions) -> Option<u32>
where
    K: Hash,
    N: ZipNodeLike<K, V>,
{
    let (Some(_), Some(_)) = (a, b) else {
        return a.or(b);
    };

    let mut a = a;
    let mut b = b;
    let mut head: Option<u32> = None;
    let mut tail: Option<u32> = None;
    let mut tail_from_a = false;

    while let (Some(x), Some(y)) = (a, b) {
        let from_a = rank_of(arena, x, options) > rank_of(arena, y, options);
        let winner = if from_a {
            a = get_r(arena, x);
            x
        } else {
            b = get_l(arena, y);
            y
        };

        match tail {
            None => head = Some(winner),
            Some(t) => {
                if tail_from_a {
                    set_r(arena, t, Some(winner));
                } else {
                    set_l(arena, t, Some(winner));
                }
                set_p(arena, winner, Some(t));
            }
        }
        tail = Some(winner);
        tail_from_a = from_a;
    }

    let rem = a.or(b);
    let t = tail.expect("both sides were non-empty");
    if tail_from_a {
        set_r(arena, t, rem);
    } else {
        set_l(arena, t, rem);
    }
    if let Some(rm) = rem {
        set_p(arena, rm, Some(t));
    }
    head
}

/// Checks shape, order and the rank discipline.
pub fn verify<K, V, N, C>(
    arena: &[N],
    root: Option<u32>,
    options: &ZipOptions,
    comparator: &C,
) -> Result<(), VerifyError>
where
    K: Hash,
    N: ZipNodeLike<K, V>,
    C: Fn(&K, &K) -> i32,
{
    verify_tree(arena, root)?;
    verify_order(arena, root, comparator)?;

    let mut curr = first(arena, root);
    while let Some(i) = curr {
        let rank = rank_of(arena, i, options);
        if let Some(l) = get_l(arena, i) {
            if rank_of(arena, l, options) > rank {
                return Err(VerifyError::RankViolation { node: i });
            }
        }
        if let Some(r) = get_r(arena, i) {
            if rank_of(arena, r, options) >= rank {
                return Err(VerifyError::RankViolation { node: i });
            }
        }
        curr = next(arena, i);
    }
    Ok(())
}

/// Owning zip-tree wrapper around the arena core.
pub struct ZipTree<K, V, C = fn(&K, &K) -> i32>
where
    C: Fn(&K, &K) -> i32,
{
    arena: Vec<ZipNode<K, V>>,
    root: Option<u32>,
    len: usize,
    options: TreeOptions,
    zip_options: ZipOptions,
    comparator: C,
}

impl<K: PartialOrd + Hash, V> ZipTree<K, V> {
    pub fn new() -> Self {
        Self::with(
            default_comparator::<K>,
            TreeOptions::default(),
            ZipOptions::default(),
        )
    }

    pub fn with_options(options: TreeOptions, zip_options: ZipOptions) -> Self {
        Self::with(default_comparator::<K>, options, zip_options)
    }
}

impl<K: PartialOrd + Hash, V> Default for ZipTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> ZipTree<K, V, C>
where
    K: Hash,
    C: Fn(&K, &K) -> i32,
{
    pub fn with(comparator: C, options: TreeOptions, zip_options: ZipOptions) -> Self {
        options.assert_coherent();
        Self {
            arena: Vec::new(),
            root: None,
            len: 0,
            options,
            zip_options,
            comparator,
        }
    }

    /// Inserts a key/value pair; the rank comes from the key hash. Returns
    /// the new node's index, or `None` when the key already exists and
    /// `multiple` is off.
    pub fn insert(&mut self, key: K, value: V) -> Option<u32> {
        if !self.options.multiple && self.find(&key).is_some() {
            return None;
        }
        let idx = self.arena.len() as u32;
        self.arena.push(ZipNode::new(key, value));
        self.root = insert(
            &mut self.arena,
            self.root,
            idx,
            &self.zip_options,
            &self.comparator,
        );
        self.len += 1;
        Some(idx)
    }

    /// Inserts with an explicit rank instead of the hash-derived one.
    pub fn insert_ranked(&mut self, key: K, value: V, rank: u8) -> Option<u32> {
        if !self.options.multiple && self.find(&key).is_some() {
            return None;
        }
        let idx = self.arena.len() as u32;
        self.arena.push(ZipNode::new(key, value));
        self.root = insert_ranked(
            &mut self.arena,
            self.root,
            idx,
            rank,
            &self.zip_options,
            &self.comparator,
        );
        self.len += 1;
        Some(idx)
    }

    /// Detaches the node at `idx`.
    pub fn remove(&mut self, idx: u32) {
        self.root = remove(&mut self.arena, self.root, idx, &self.zip_options);
        self.len -= 1;
    }

    pub fn find(&self, key: &K) -> Option<u32> {
        crate::util::find(&self.arena, self.root, key, &self.comparator)
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

    pub fn arena(&self) -> &[ZipNode<K, V>] {
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

    pub fn iter(&self) -> Iter<'_, ZipNode<K, V>> {
        Iter::new(&self.arena, self.first())
    }

    pub fn iter_rev(&self) -> RevIter<'_, ZipNode<K, V>> {
        RevIter::new(&self.arena, self.last())
    }

    pub fn iter_from(&self, idx: u32) -> Iter<'_, ZipNode<K, V>> {
        Iter::new(&self.arena, Some(idx))
    }

    pub fn verify(&self) -> Result<(), VerifyError> {
        verify(&self.arena, self.root, &self.zip_options, &self.comparator)
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
            |n: &ZipNode<K, V>| format!("{} (r{})", n.k, n.rank),
            |_| "black",
        )
    }
}
