//! Construction-time option bundles.
//!
//! The trees take their variant behavior from plain config values passed at
//! construction. Color representation is the one choice made at the type
//! level instead: [`RbNode`](crate::red_black::RbNode) keeps the color as a
//! separate flag, [`CompactRbNode`](crate::red_black::CompactRbNode) packs it
//! into the parent word; both sit behind the same trait, so picking the node
//! type picks the representation without touching the API.

/// Options shared by all tree variants.
#[derive(Clone, Copy, Debug)]
pub struct TreeOptions {
    /// Allow keys that compare equal. Without it, an equal-key insert is a
    /// no-op. For the red-black tree this also activates the equality chain.
    pub multiple: bool,
    /// Support "is a before b" queries on equal-key runs. Requires
    /// `multiple`.
    pub order_queries: bool,
    /// Keep an element counter so `len()` is O(1); otherwise `len()` counts
    /// by traversal, O(N).
    pub constant_time_size: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            multiple: true,
            order_queries: false,
            constant_time_size: true,
        }
    }
}

impl TreeOptions {
    /// Panics if the combination is incoherent (`order_queries` without
    /// `multiple`).
    pub fn assert_coherent(&self) {
        assert!(
            self.multiple || !self.order_queries,
            "order_queries requires multiple"
        );
    }
}

/// Where a zip-tree node's rank lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankSource {
    /// Compute the rank once at insert and store it in the node.
    Stored,
    /// Recompute the rank from the key hash whenever it is needed. Saves the
    /// rank field; requires keys to hash stably.
    Derived,
}

/// Universal-hashing pass `(h · coefficient) mod modul` applied to the key
/// hash before the rank is extracted. Repairs poorly distributed hash
/// functions; pick a random coefficient and a prime modulus.
#[derive(Clone, Copy, Debug)]
pub struct Universalize {
    pub coefficient: u64,
    pub modul: u64,
}

impl Default for Universalize {
    fn default() -> Self {
        Self {
            coefficient: 1103515245,
            modul: u64::MAX,
        }
    }
}

/// Zip-tree rank configuration.
#[derive(Clone, Copy, Debug)]
pub struct ZipOptions {
    pub rank_source: RankSource,
    /// Active only when present; both parameters come together.
    pub universalize: Option<Universalize>,
}

impl Default for ZipOptions {
    fn default() -> Self {
        Self {
            rank_source: RankSource::Stored,
            universalize: None,
        }
    }
}

/// Energy-tree rebuild threshold.
///
/// A subtree is rebuilt once its root's energy exceeds `alpha` times its
/// size. Smaller values rebuild more often and keep the tree flatter.
#[derive(Clone, Copy, Debug)]
pub struct EnergyOptions {
    pub alpha: f64,
}

impl Default for EnergyOptions {
    fn default() -> Self {
        Self { alpha: 0.5 }
    }
}
