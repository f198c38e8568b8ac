//! Merkle witnesses and root recomputation
//!
//! A witness is the ordered list of siblings from a leaf up to (but not
//! including) the root. The same recomputation serves two purposes:
//! verifying that a leaf is in a known root, and folding a new leaf into a
//! root along the path the witness describes.

use serde::{Deserialize, Serialize};

use super::config::DEFAULT_CONFIG;
use super::hasher::DEFAULT_HASHER;
use super::tree::{subtree_width, NodeHasher, TreeConfig};
use crate::errors::WitnessError;
use crate::types::WITNESS_LENGTH;
use crate::{Bytes32, Result};

/// One level of a witness path
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WitnessNode {
    /// Hash of the sibling subtree at this level
    pub sibling: Bytes32,
    /// `true` when the running hash is the left input at this level
    pub is_left: bool,
}

impl WitnessNode {
    /// Creates a witness node
    pub fn new(sibling: Bytes32, is_left: bool) -> Self { Self { sibling, is_left } }
}

/// Inclusion proof path for a leaf, ordered from the leaf level upwards
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<WitnessNode>", into = "Vec<WitnessNode>")]
pub struct Witness {
    path: Vec<WitnessNode>,
}

impl Witness {
    /// Creates a witness for the default tree height
    ///
    /// # Errors
    /// * `Err(Error::Witness(WitnessError::MalformedWitness))` - If the path length is not
    ///   [`WITNESS_LENGTH`]
    ///
    /// # Examples
    ///
    /// ```rust
    /// use merkle_guardian::merkle::{Witness, WitnessNode};
    ///
    /// let witness = Witness::new(vec![WitnessNode::new([0u8; 32], true); 7])?;
    /// assert_eq!(witness.leaf_index(), 0);
    ///
    /// assert!(Witness::new(vec![WitnessNode::default(); 3]).is_err());
    /// # Ok::<(), merkle_guardian::Error>(())
    /// ```
    pub fn new(path: Vec<WitnessNode>) -> Result<Self> { Self::for_config(path, &DEFAULT_CONFIG) }

    /// Creates a witness for the height given by `config`
    pub fn for_config<C: TreeConfig>(path: Vec<WitnessNode>, config: &C) -> Result<Self> {
        ensure_length(path.len(), config.witness_len())?;
        Ok(Self { path })
    }

    /// Placeholder witness: zero siblings, every level a right child
    ///
    /// Freshly created members carry this until the caller fetches a real
    /// witness from its leaf store.
    pub fn empty() -> Self { Self { path: vec![WitnessNode::default(); WITNESS_LENGTH] } }

    /// Returns the path, leaf level first
    pub fn path(&self) -> &[WitnessNode] { &self.path }

    /// Returns the leaf position encoded by the `is_left` flags
    pub fn leaf_index(&self) -> u64 {
        self.path
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.is_left)
            .filter_map(|(level, _)| subtree_width(level))
            .fold(0u64, |index, bit| index | bit)
    }

    /// Recomputes the root implied by `leaf` and this witness using the default hasher
    pub fn compute_root(&self, leaf: Bytes32) -> Result<Bytes32> {
        self.compute_root_with(leaf, &DEFAULT_HASHER, &DEFAULT_CONFIG)
    }

    /// Recomputes the root implied by `leaf` and this witness
    ///
    /// At each level the running hash is combined with the sibling: as the left
    /// input when `is_left` is set, otherwise as the right input.
    ///
    /// # Errors
    /// * `Err(Error::Witness(WitnessError::MalformedWitness))` - If the path length is not
    ///   consistent with `config.height()`
    pub fn compute_root_with<H: NodeHasher, C: TreeConfig>(
        &self,
        leaf: Bytes32,
        hasher: &H,
        config: &C,
    ) -> Result<Bytes32> {
        ensure_length(self.path.len(), config.witness_len())?;

        let tag = config.internal_domain_tag();
        let root = self.path.iter().fold(leaf, |current, node| {
            if node.is_left {
                hasher.hash_internal(tag, current, node.sibling)
            } else {
                hasher.hash_internal(tag, node.sibling, current)
            }
        });
        Ok(root)
    }

    /// Checks that `leaf` and this witness reproduce `root`
    pub fn verify_with<H: NodeHasher, C: TreeConfig>(
        &self,
        leaf: Bytes32,
        root: Bytes32,
        hasher: &H,
        config: &C,
    ) -> Result<bool> {
        Ok(self.compute_root_with(leaf, hasher, config)? == root)
    }

    /// Serializes the path for hash chaining: `sibling || is_left` per level
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.path.len() * 33);
        for node in &self.path {
            bytes.extend_from_slice(&node.sibling);
            bytes.push(u8::from(node.is_left));
        }
        bytes
    }
}

impl Default for Witness {
    fn default() -> Self { Self::empty() }
}

impl TryFrom<Vec<WitnessNode>> for Witness {
    type Error = crate::Error;

    fn try_from(path: Vec<WitnessNode>) -> Result<Self> { Self::new(path) }
}

impl From<Witness> for Vec<WitnessNode> {
    fn from(witness: Witness) -> Self { witness.path }
}

/// Recomputes a root from a leaf hash and witness with the default hasher and config
///
/// # Examples
///
/// ```rust
/// use merkle_guardian::merkle::{compute_root, Witness};
///
/// let witness = Witness::empty();
/// let root = compute_root([1u8; 32], &witness)?;
/// assert_eq!(root, witness.compute_root([1u8; 32])?);
/// # Ok::<(), merkle_guardian::Error>(())
/// ```
pub fn compute_root(leaf: Bytes32, witness: &Witness) -> Result<Bytes32> {
    witness.compute_root(leaf)
}

fn ensure_length(length: usize, expected: usize) -> Result<()> {
    if length != expected {
        return Err(WitnessError::MalformedWitness { length, expected }.into());
    }
    Ok(())
}
