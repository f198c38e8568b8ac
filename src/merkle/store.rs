//! Indexed leaf storage and witness generation
//!
//! Registries never hold the leaves of their trees; they only keep roots and
//! consume witnesses. A host pairs them with a leaf store like
//! [`MemoryLeafStore`], writes each newly registered member's leaf hash at its
//! position, and asks the store for the witness to submit alongside it.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use super::config::{GuardianTreeV0Config, DEFAULT_CONFIG};
use super::hasher::{Poseidon2Hasher, DEFAULT_HASHER};
use super::tree::{subtree_width, NodeHasher, TreeConfig};
use super::witness::{Witness, WitnessNode};
use crate::errors::WitnessError;
use crate::{Bytes32, Result};

/// Provides witnesses for leaf positions
///
/// # Example
///
/// ```rust
/// use merkle_guardian::merkle::{MemoryLeafStore, WitnessProvider};
///
/// let mut store = MemoryLeafStore::new();
/// store.set_leaf(3, [7u8; 32])?;
///
/// let witness = store.witness(3)?;
/// assert_eq!(witness.leaf_index(), 3);
/// assert_eq!(witness.compute_root([7u8; 32])?, store.root());
/// # Ok::<(), merkle_guardian::Error>(())
/// ```
pub trait WitnessProvider {
    /// Returns the witness for the leaf at `index` in the current tree
    fn witness(&mut self, index: u64) -> Result<Witness>;
}

/// In-memory leaf store
///
/// Leaves are kept in a map keyed by position; absent positions hold the
/// hasher's zero hash. Node hashes are recomputed on demand, with empty
/// subtrees short-circuited to precomputed zero hashes.
#[derive(Clone, Debug)]
pub struct MemoryLeafStore<H = Poseidon2Hasher, C = GuardianTreeV0Config> {
    leaves: BTreeMap<u64, Bytes32>,
    /// `zeros[level]` is the root of an empty subtree whose leaves are `level` levels down
    zeros: Vec<Bytes32>,
    hasher: H,
    config: C,
}

impl MemoryLeafStore {
    /// Creates an empty store with the default hasher and tree height
    pub fn new() -> Self { Self::with_hasher_and_config(DEFAULT_HASHER, DEFAULT_CONFIG) }
}

impl Default for MemoryLeafStore {
    fn default() -> Self { Self::new() }
}

impl<H: NodeHasher, C: TreeConfig> MemoryLeafStore<H, C> {
    /// Creates an empty store with a custom hasher and config
    pub fn with_hasher_and_config(hasher: H, config: C) -> Self {
        let zeros = zero_hashes(&hasher, &config);
        Self { leaves: BTreeMap::new(), zeros, hasher, config }
    }

    /// Root of the tree with no leaves set
    pub fn empty_root(&self) -> Bytes32 { self.zeros[self.config.witness_len()] }

    /// Number of leaf positions
    pub fn capacity(&self) -> u64 { self.config.leaf_count() }

    /// Number of positions holding a leaf
    pub fn len(&self) -> usize { self.leaves.len() }

    /// Returns `true` when no leaf has been set
    pub fn is_empty(&self) -> bool { self.leaves.is_empty() }

    /// Writes `leaf` at position `index`, replacing any previous leaf
    ///
    /// # Errors
    /// * `Err(Error::Witness(WitnessError::LeafIndexOutOfRange))` - If `index >= capacity()`
    pub fn set_leaf(&mut self, index: u64, leaf: Bytes32) -> Result<()> {
        self.ensure_in_range(index)?;
        self.leaves.insert(index, leaf);
        Ok(())
    }

    /// Returns the leaf at `index`, or `None` if the position is empty
    pub fn leaf(&self, index: u64) -> Option<Bytes32> { self.leaves.get(&index).copied() }

    /// Current root of the tree
    pub fn root(&self) -> Bytes32 { self.node(self.config.witness_len(), 0) }

    /// Hash of the node at `level` (0 = leaves) and horizontal `position`
    fn node(&self, level: usize, position: u64) -> Bytes32 {
        let Some(leaves) = leaf_range(level, position) else {
            return self.zeros[level];
        };
        if self.leaves.range(leaves).next().is_none() {
            return self.zeros[level];
        }
        if level == 0 {
            return self.leaves.get(&position).copied().unwrap_or(self.zeros[0]);
        }

        let left = self.node(level - 1, position * 2);
        let right = self.node(level - 1, position * 2 + 1);
        self.hasher.hash_internal(self.config.internal_domain_tag(), left, right)
    }

    fn ensure_in_range(&self, index: u64) -> Result<()> {
        let capacity = self.capacity();
        if index >= capacity {
            return Err(WitnessError::LeafIndexOutOfRange { index, capacity }.into());
        }
        Ok(())
    }
}

/// Leaf positions below the node at `level` and `position`
///
/// `None` when the node lies entirely past the last `u64` position.
fn leaf_range(level: usize, position: u64) -> Option<RangeInclusive<u64>> {
    match subtree_width(level) {
        Some(width) => {
            let first = position.checked_mul(width)?;
            Some(first..=first.saturating_add(width - 1))
        }
        None => (position == 0).then_some(0..=u64::MAX),
    }
}

/// Root of a tree with no leaves set
///
/// Registries start from this root so that the first witnesses a host
/// produces from an empty store fold into it.
pub fn empty_root<H: NodeHasher, C: TreeConfig>(hasher: &H, config: &C) -> Bytes32 {
    let zeros = zero_hashes(hasher, config);
    zeros[config.witness_len()]
}

/// `zeros[level]` for every level from the leaves to the root
fn zero_hashes<H: NodeHasher, C: TreeConfig>(hasher: &H, config: &C) -> Vec<Bytes32> {
    let tag = config.internal_domain_tag();
    let mut zeros = Vec::with_capacity(config.witness_len() + 1);
    zeros.push(hasher.zero_hash());
    for level in 0..config.witness_len() {
        let below = zeros[level];
        zeros.push(hasher.hash_internal(tag, below, below));
    }
    zeros
}

impl<H: NodeHasher, C: TreeConfig> WitnessProvider for MemoryLeafStore<H, C> {
    fn witness(&mut self, index: u64) -> Result<Witness> {
        self.ensure_in_range(index)?;

        let path = (0..self.config.witness_len())
            .map(|level| {
                let position = u32::try_from(level)
                    .ok()
                    .and_then(|shift| index.checked_shr(shift))
                    .unwrap_or(0);
                WitnessNode::new(self.node(level, position ^ 1), position & 1 == 0)
            })
            .collect();
        Witness::for_config(path, &self.config)
    }
}
