//! Red-black tree: bottom-up rebalanced BST with equality chains, pluggable
//! structural-event hooks and a configurable equal-key insertion bias.

pub mod chain;
pub mod traits;
pub mod types;
pub mod util;

pub use traits::{NoopTraits, RbTraits};
pub use types::{CompactRbNode, RbNode, RbNodeLike};

use std::io;
use std::marker::PhantomData;
use std::path::Path;

use crate::dot;
use crate::error::VerifyError;
use crate::iter::{Iter, RevIter};
use crate::options::TreeOptions;
use crate::types::default_comparator;
use crate::util as tree_util;

/// Owning red-black tree wrapper around the arena core.
///
/// Keys live in an internal `Vec` arena and are addressed by the `u32`
/// indices the mutating methods hand out. Equal keys are kept (multiset)
/// unless the options say otherwise. Removal unlinks a node but does not
/// reclaim its arena slot.
pub struct RbTree<K, V, C = fn(&K, &K) -> i32, N = RbNode<K, V>, T = NoopTraits>
where
    C: Fn(&K, &K) -> i32,
    N: RbNodeLike<K, V>,
    T: RbTraits<K, V, N>,
{
    arena: Vec<N>,
    root: Option<u32>,
    len: usize,
    options: TreeOptions,
    comparator: C,
    new_node: fn(K, V) -> N,
    _traits: PhantomData<T>,
}

impl<K: PartialOrd, V> RbTree<K, V> {
    pub fn new() -> Self {
        Self::with(default_comparator::<K>, RbNode::new, TreeOptions::default())
    }

    pub fn with_options(options: TreeOptions) -> Self {
        Self::with(default_comparator::<K>, RbNode::new, options)
    }
}

impl<K: PartialOrd, V> Default for RbTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C, N, T> RbTree<K, V, C, N, T>
where
    C: Fn(&K, &K) -> i32,
    N: RbNodeLike<K, V>,
    T: RbTraits<K, V, N>,
{
    pub fn with(comparator: C, new_node: fn(K, V) -> N, options: TreeOptions) -> Self {
        options.assert_coherent();
        Self {
            arena: Vec::new(),
            root: None,
            len: 0,
            options,
            comparator,
            new_node,
            _traits: PhantomData,
        }
    }

    /// Inserts a key/value pair and returns the new node's index, or `None`
    /// when the key already exists and `multiple` is off.
    pub fn insert(&mut self, key: K, value: V) -> Option<u32> {
        let idx = self.arena.len() as u32;
        self.arena.push((self.new_node)(key, value));
        let (root, inserted) = util::insert::<K, V, N, T, C>(
            &mut self.arena,
            self.root,
            idx,
            &self.comparator,
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

    /// Inserts starting the descent near `hint`; `None` hints at the end of
    /// the tree (right-biased, so equal keys land after their run).
    pub fn insert_hinted(&mut self, key: K, value: V, hint: Option<u32>) -> Option<u32> {
        let idx = self.arena.len() as u32;
        self.arena.push((self.new_node)(key, value));
        let (root, inserted) = util::insert_hinted::<K, V, N, T, C>(
            &mut self.arena,
            self.root,
            idx,
            hint,
            &self.comparator,
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

    /// Detaches the node at `idx`. The index must refer to an attached node.
    pub fn remove(&mut self, idx: u32) {
        self.root = util::remove::<K, V, N, T, C>(&mut self.arena, self.root, idx, &self.comparator);
        self.len -= 1;
    }

    /// Finds a node with this key; an equal-key hit is rewound to the chain
    /// head (the first-inserted equal node).
    pub fn find(&self, key: &K) -> Option<u32> {
        util::find::<K, V, N, C>(&self.arena, self.root, key, &self.comparator)
    }

    pub fn lower_bound(&self, key: &K) -> Option<u32> {
        tree_util::lower_bound(&self.arena, self.root, key, &self.comparator)
    }

    pub fn upper_bound(&self, key: &K) -> Option<u32> {
        tree_util::upper_bound(&self.arena, self.root, key, &self.comparator)
    }

    pub fn key(&self, idx: u32) -> &K {
        self.arena[idx as usize].key()
    }

    pub fn value(&self, idx: u32) -> &V {
        self.arena[idx as usize].value()
    }

    pub fn value_mut(&mut self, idx: u32) -> &mut V {
        self.arena[idx as usize].value_mut()
    }

    pub fn node(&self, idx: u32) -> &N {
        &self.arena[idx as usize]
    }

    pub fn arena(&self) -> &[N] {
        &self.arena
    }

    pub fn root_index(&self) -> Option<u32> {
        self.root
    }

    /// Element count: O(1) under `constant_time_size`, otherwise a full
    /// traversal.
    pub fn len(&self) -> usize {
        if self.options.constant_time_size {
            self.len
        } else {
            tree_util::subtree_size(&self.arena, self.root)
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
        tree_util::first(&self.arena, self.root)
    }

    pub fn last(&self) -> Option<u32> {
        tree_util::last(&self.arena, self.root)
    }

    pub fn iter(&self) -> Iter<'_, N> {
        Iter::new(&self.arena, self.first())
    }

    pub fn iter_rev(&self) -> RevIter<'_, N> {
        RevIter::new(&self.arena, self.last())
    }

    /// Iterator positioned on an attached node.
    pub fn iter_from(&self, idx: u32) -> Iter<'_, N> {
        Iter::new(&self.arena, Some(idx))
    }

    /// Whether `a` was inserted before `b` within one equal-key run.
    /// Requires the `order_queries` option.
    pub fn precedes(&self, a: u32, b: u32) -> bool {
        debug_assert!(self.options.order_queries);
        chain::precedes(&self.arena, a, b)
    }

    pub fn verify(&self) -> Result<(), VerifyError> {
        util::verify::<K, V, N, C>(&self.arena, self.root, &self.comparator)
    }

    pub fn verify_integrity(&self) -> bool {
        self.verify().is_ok()
    }

    /// Writes the tree as a Graphviz digraph, nodes colored by their
    /// red-black color.
    pub fn dump_to_dot<P: AsRef<Path>>(&self, path: P) -> io::Result<()>
    where
        K: std::fmt::Display,
    {
        dot::dump_to_dot(
            &self.arena,
            self.root,
            path,
            |n: &N| n.key().to_string(),
            |n: &N| if n.is_black() { "black" } else { "red" },
        )
    }
}
