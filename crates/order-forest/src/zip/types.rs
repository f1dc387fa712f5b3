use crate::types::{KeyNode, KvNode, LinkNode};

/// Zip-tree node behavior: the structural links plus rank storage.
///
/// With [`RankSource::Derived`](crate::options::RankSource) the stored rank
/// is never consulted; a custom node may then implement the accessors as
/// no-ops.
pub trait ZipNodeLike<K, V>: KvNode<K, V> {
    fn rank(&self) -> u8;
    fn set_rank(&mut self, rank: u8);
}

#[derive(Clone, Debug)]
pub struct ZipNode<K, V> {
    pub p: Option<u32>,
    pub l: Option<u32>,
    pub r: Option<u32>,
    pub k: K,
    pub v: V,
    pub rank: u8,
}

impl<K, V> ZipNode<K, V> {
    pub fn new(k: K, v: V) -> Self {
        Self {
            p: None,
            l: None,
            r: None,
            k,
            v,
            rank: 0,
        }
    }
}

impl<K, V> LinkNode for ZipNode<K, V> {
    fn p(&self) -> Option<u32> {
        self.p
    }

    fn l(&self) -> Option<u32> {
        self.l
    }

    fn r(&self) -> Option<u32> {
        self.r
    }

    fn set_p(&mut self, v: Option<u32>) {
        self.p = v;
    }

    fn set_l(&mut self, v: Option<u32>) {
        self.l = v;
    }

    fn set_r(&mut self, v: Option<u32>) {
        self.r = v;
    }
}

impl<K, V> KeyNode<K> for ZipNode<K, V> {
    fn key(&self) -> &K {
        &self.k
    }
}

impl<K, V> KvNode<K, V> for ZipNode<K, V> {
    fn value(&self) -> &V {
        &self.v
    }

    fn value_mut(&mut self) -> &mut V {
        &mut self.v
    }
}

impl<K, V> ZipNodeLike<K, V> for ZipNode<K, V> {
    fn rank(&self) -> u8 {
        self.rank
    }

    fn set_rank(&mut self, rank: u8) {
        self.rank = rank;
    }
}
