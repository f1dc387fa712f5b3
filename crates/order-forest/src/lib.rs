//! Arena-backed self-balancing search trees.
//!
//! Four tree cores over one representation: nodes live in a caller-owned
//! arena (`Vec<N>` or `&mut [N]`) and every structural "pointer" is an
//! `Option<u32>` index into it.
//!
//! - [`red_black`]: bottom-up rebalanced red-black tree with equality
//!   chains for equal-comparing keys, structural-event hooks, and a
//!   configurable equal-key insertion bias.
//! - [`zip`]: randomized BST shaped by hash-derived per-node ranks.
//! - [`energy`]: weight-balanced BST that rebalances by rebuilding whole
//!   subtrees once a per-node energy counter exceeds its threshold.
//! - [`interval`]: the red-black core augmented with cached subtree
//!   maxima, answering overlap queries.
//!
//! Each variant has two layers: free functions over `(arena, root, node)`
//! that return the new root and never own storage, and an owning wrapper
//! (`RbTree`, `ZipTree`, `EnergyTree`, `IntervalTree`) for callers who want
//! a container.

pub mod dot;
pub mod energy;
pub mod error;
pub mod interval;
pub mod iter;
pub mod options;
pub mod red_black;
pub mod types;
pub mod util;
pub mod zip;

pub use energy::{EnergyNode, EnergyTree};
pub use error::VerifyError;
pub use interval::{IntervalTree, Iv, IvNode};
pub use iter::{Iter, RevIter};
pub use options::{EnergyOptions, RankSource, TreeOptions, Universalize, ZipOptions};
pub use red_black::{CompactRbNode, NoopTraits, RbNode, RbTraits, RbTree};
pub use types::{default_comparator, Comparator, KeyNode, KvNode, LinkNode};
pub use zip::{ZipNode, ZipTree};
