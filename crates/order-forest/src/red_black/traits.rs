use super::types::RbNodeLike;

/// Structural-event hooks invoked by the red-black core.
///
/// Augmentations (the interval tree's cached maxima, for instance) implement
/// the hooks they care about; the defaults do nothing. All hooks run
/// synchronously inside the mutating operation, after the links they report
/// on have been rewired.
pub trait RbTraits<K, V, N: RbNodeLike<K, V>> {
    /// `node` was attached as a leaf.
    fn leaf_inserted(_arena: &mut [N], _node: u32) {}
    /// `node` was rotated left; it is now the left child of its former right
    /// child.
    fn rotated_left(_arena: &mut [N], _node: u32) {}
    /// `node` was rotated right; it is now the right child of its former
    /// left child.
    fn rotated_right(_arena: &mut [N], _node: u32) {}
    /// A node was detached somewhere below `node`.
    fn deleted_below(_arena: &mut [N], _node: u32) {}
    /// `n1` and `n2` exchanged positions.
    fn swapped(_arena: &mut [N], _n1: u32, _n2: u32) {}
}

/// The no-augmentation default.
pub struct NoopTraits;

impl<K, V, N: RbNodeLike<K, V>> RbTraits<K, V, N> for NoopTraits {}
