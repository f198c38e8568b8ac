//! Merkle tree traits and abstractions
//!
//! This module defines traits for the hash function and the tree parameters,
//! allowing different hash functions and tree heights to be used while the
//! witness verifier and the registries keep a consistent interface.

/// Trait for hash functions used in Merkle tree operations
///
/// # Example
///
/// ```rust
/// use merkle_guardian::merkle::NodeHasher;
/// use merkle_guardian::types::Bytes32;
///
/// struct XorHasher;
///
/// impl NodeHasher for XorHasher {
///     fn hash_leaf(&self, _domain_tag: &[u8], inputs: &[&[u8]]) -> Bytes32 {
///         let mut out = [0u8; 32];
///         for (i, byte) in inputs.iter().flat_map(|x| x.iter()).enumerate() {
///             out[i % 32] ^= byte;
///         }
///         out
///     }
///
///     fn hash_internal(&self, _domain_tag: &[u8], left: Bytes32, right: Bytes32) -> Bytes32 {
///         let mut out = left;
///         for (o, r) in out.iter_mut().zip(right) {
///             *o ^= r.rotate_left(1);
///         }
///         out
///     }
///
///     fn zero_hash(&self) -> Bytes32 {
///         [0u8; 32]
///     }
/// }
/// ```
pub trait NodeHasher {
    /// Computes the hash of a leaf from its encoded fields
    ///
    /// # Arguments
    /// * `domain_tag` - Domain separation tag (e.g., `"MG_MEMBER_v0"`)
    /// * `inputs` - Encoded leaf fields, hashed as their concatenation
    fn hash_leaf(&self, domain_tag: &[u8], inputs: &[&[u8]]) -> crate::Bytes32;

    /// Computes the hash for an internal node from its two children
    ///
    /// # Arguments
    /// * `domain_tag` - Domain separation tag (e.g., `"MG_NODE_v0"`)
    /// * `left` - Left child hash
    /// * `right` - Right child hash
    fn hash_internal(
        &self,
        domain_tag: &[u8],
        left: crate::Bytes32,
        right: crate::Bytes32,
    ) -> crate::Bytes32;

    /// Returns the hash of an empty leaf
    fn zero_hash(&self) -> crate::Bytes32;
}

/// Trait for tree configuration parameters
pub trait TreeConfig {
    /// Returns the domain tag for leaf hashes
    fn leaf_domain_tag(&self) -> &[u8];

    /// Returns the domain tag for internal nodes
    fn internal_domain_tag(&self) -> &[u8];

    /// Returns the height of the tree, counting the leaf level
    ///
    /// A tree of height `H` has `2^(H-1)` leaves and witnesses of length `H-1`.
    fn height(&self) -> u8;

    /// Returns the number of `(sibling, is_left)` pairs in a witness
    fn witness_len(&self) -> usize { usize::from(self.height()).saturating_sub(1) }

    /// Returns the number of leaf positions in the tree
    ///
    /// Saturates at `u64::MAX` for trees taller than 64 levels.
    fn leaf_count(&self) -> u64 { subtree_width(self.witness_len()).unwrap_or(u64::MAX) }
}

/// Number of leaves below a node `level` levels above the leaves
///
/// `None` once the count no longer fits in a `u64`.
pub(crate) fn subtree_width(level: usize) -> Option<u64> {
    u32::try_from(level).ok().and_then(|shift| 1u64.checked_shl(shift))
}
