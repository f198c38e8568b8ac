//! Hasher implementations for tree operations

use sha2::{Digest, Sha256};

use super::tree::NodeHasher;
use crate::hash::poseidon2_hash_fixed;
use crate::types::Bytes32;

/// Poseidon2 hasher implementation
///
/// This struct implements the [`NodeHasher`] trait using Poseidon2.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Poseidon2Hasher;

impl NodeHasher for Poseidon2Hasher {
    fn hash_leaf(&self, domain_tag: &[u8], inputs: &[&[u8]]) -> Bytes32 {
        let mut parts = Vec::with_capacity(inputs.len() + 1);
        parts.push(domain_tag);
        parts.extend_from_slice(inputs);
        poseidon2_hash_fixed(&parts)
    }

    fn hash_internal(&self, domain_tag: &[u8], left: Bytes32, right: Bytes32) -> Bytes32 {
        poseidon2_hash_fixed(&[domain_tag, &left[..], &right[..]])
    }

    fn zero_hash(&self) -> Bytes32 { [0u8; 32] }
}

/// SHA-256 hasher implementation
///
/// Cheaper than Poseidon2 outside of a proof system; useful for hosts that
/// never need to verify memberships in-circuit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha256Hasher;

impl NodeHasher for Sha256Hasher {
    fn hash_leaf(&self, domain_tag: &[u8], inputs: &[&[u8]]) -> Bytes32 {
        let mut hasher = Sha256::new();
        hasher.update(domain_tag);
        for input in inputs {
            hasher.update(input);
        }
        hasher.finalize().into()
    }

    fn hash_internal(&self, domain_tag: &[u8], left: Bytes32, right: Bytes32) -> Bytes32 {
        let mut hasher = Sha256::new();
        hasher.update(domain_tag);
        hasher.update(left);
        hasher.update(right);
        hasher.finalize().into()
    }

    fn zero_hash(&self) -> Bytes32 { [0u8; 32] }
}

/// Default hasher instance (Poseidon2)
pub(crate) const DEFAULT_HASHER: Poseidon2Hasher = Poseidon2Hasher;
