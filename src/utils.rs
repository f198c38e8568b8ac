//! Hash chain helpers for the action log
use sha2::{Digest, Sha256};

use crate::types::{ACTIONS_INIT_DOMAIN, CHAIN_DOMAIN};
use crate::Bytes32;

/// Computes a new hash by chaining the old hash with new input data.
/// Uses domain separation with tag "MG_CHAIN_v0".
pub fn compute_hash_chain(old: Bytes32, input: &[u8]) -> Bytes32 {
    let mut hasher = Sha256::new();
    hasher.update(CHAIN_DOMAIN);
    hasher.update(old);
    hasher.update(input);
    hasher.finalize().into()
}

/// Returns the chain value of an action log that has never been appended to
pub fn initial_chain_value() -> Bytes32 {
    let mut hasher = Sha256::new();
    hasher.update(ACTIONS_INIT_DOMAIN);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_hash_chain() {
        let empty = [0u8; 32];
        let input1 = b"test1";
        let input2 = b"test2";

        let hash1 = compute_hash_chain(empty, input1);
        let hash2 = compute_hash_chain(empty, input2);

        assert_eq!(compute_hash_chain(empty, input1), hash1);
        assert_ne!(hash1, hash2);
        assert_ne!(hash1, empty);

        // chaining != concatenation
        let chain1 = compute_hash_chain(compute_hash_chain(empty, b"a"), b"b");
        let chain2 = compute_hash_chain(empty, b"ab");
        assert_ne!(chain1, chain2);
    }

    #[test]
    fn test_initial_chain_value() {
        let initial = initial_chain_value();

        assert_eq!(initial, initial_chain_value());
        assert_ne!(initial, [0u8; 32]);
        assert_ne!(initial, compute_hash_chain([0u8; 32], b""));
    }
}
