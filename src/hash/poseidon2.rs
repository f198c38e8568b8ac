//! Poseidon2 hash functions for member leaves and tree nodes
//!
//! Round constants are derived from a fixed RNG seed, so every instance of
//! the hasher (and every process) agrees on the same permutation.

use std::sync::LazyLock;

use p3_baby_bear::{BabyBear, Poseidon2BabyBear};
use p3_field::{PrimeCharacteristicRing, PrimeField32};
use p3_poseidon2::ExternalLayerConstants;
use p3_symmetric::{CryptographicHasher, PaddingFreeSponge};
use rand::distr::StandardUniform;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::Bytes32;

/// Poseidon2 permutation width for BabyBear
const POSEIDON2_WIDTH: usize = 16;
/// Poseidon2 sponge rate (width 16, rate 8 leaves a capacity of 8)
const POSEIDON2_RATE: usize = 8;
/// Poseidon2 output size in field elements (8 elements = 32 bytes)
const POSEIDON2_OUTPUT_SIZE: usize = 8;
const POSEIDON2_HALF_FULL_ROUNDS: usize = 4;
const POSEIDON2_PARTIAL_ROUNDS: usize = 20;
const POSEIDON2_CONSTANTS_SEED: u64 = 1;

/// Poseidon2 permutation type for BabyBear (width: 16)
type Perm = Poseidon2BabyBear<POSEIDON2_WIDTH>;
/// Poseidon2 hash sponge (rate: 8, output: 8 field elements = 32 bytes)
type PoseidonHash = PaddingFreeSponge<Perm, POSEIDON2_WIDTH, POSEIDON2_RATE, POSEIDON2_OUTPUT_SIZE>;

static POSEIDON_HASH: LazyLock<PoseidonHash> = LazyLock::new(create_poseidon_hash);

/// Creates a deterministic Poseidon2 hash instance
fn create_poseidon_hash() -> PoseidonHash {
    let mut rng = SmallRng::seed_from_u64(POSEIDON2_CONSTANTS_SEED);

    // Sampling order: initial full rounds, partial rounds, terminal full rounds
    let mut beginning_full_round_constants =
        [[BabyBear::ZERO; POSEIDON2_WIDTH]; POSEIDON2_HALF_FULL_ROUNDS];
    for item in &mut beginning_full_round_constants {
        *item = [(); POSEIDON2_WIDTH].map(|_| rng.sample(StandardUniform));
    }
    let partial_round_constants: [BabyBear; POSEIDON2_PARTIAL_ROUNDS] =
        [(); POSEIDON2_PARTIAL_ROUNDS].map(|_| rng.sample(StandardUniform));
    let mut ending_full_round_constants =
        [[BabyBear::ZERO; POSEIDON2_WIDTH]; POSEIDON2_HALF_FULL_ROUNDS];
    for item in &mut ending_full_round_constants {
        *item = [(); POSEIDON2_WIDTH].map(|_| rng.sample(StandardUniform));
    }

    let external_constants = ExternalLayerConstants::new(
        beginning_full_round_constants.to_vec(),
        ending_full_round_constants.to_vec(),
    );
    let perm = Perm::new(external_constants, partial_round_constants.to_vec());
    PoseidonHash::new(perm)
}

/// Packs a byte stream into field elements, 2 bytes per element, little-endian
///
/// Every 16-bit limb is below the BabyBear modulus, so distinct streams of
/// equal length never pack to the same elements. The byte length follows as
/// four more limbs so that a zero-padded odd tail cannot collide with an
/// explicit trailing zero byte.
fn pack_le_limbs<I: IntoIterator<Item = u8>>(bytes: I) -> Vec<BabyBear> {
    let limb = |low: u8, high: u8| BabyBear::new(u32::from(u16::from_le_bytes([low, high])));
    let mut limbs = Vec::new();
    let mut pending = None;
    let mut length = 0u64;
    for byte in bytes {
        length += 1;
        match pending.take() {
            None => pending = Some(byte),
            Some(low) => limbs.push(limb(low, byte)),
        }
    }
    if let Some(low) = pending {
        limbs.push(limb(low, 0));
    }
    limbs.extend(length.to_le_bytes().chunks_exact(2).map(|pair| limb(pair[0], pair[1])));
    limbs
}

/// Serializes a digest as 8 canonical little-endian words
fn digest_bytes(digest: [BabyBear; POSEIDON2_OUTPUT_SIZE]) -> Bytes32 {
    let mut out = [0u8; 32];
    for (chunk, element) in out.chunks_exact_mut(4).zip(digest) {
        chunk.copy_from_slice(&element.as_canonical_u32().to_le_bytes());
    }
    out
}

/// Poseidon2 digest of `input`
pub fn poseidon2_hash_bytes(input: &[u8]) -> Bytes32 {
    poseidon2_hash_fixed(&[input])
}

/// Poseidon2 digest of the concatenation of `inputs`
///
/// Packing runs over the concatenated stream, so slice boundaries that do
/// not fall on 2-byte limbs do not change the digest.
pub fn poseidon2_hash_fixed(inputs: &[&[u8]]) -> Bytes32 {
    let limbs = pack_le_limbs(inputs.iter().flat_map(|input| input.iter().copied()));
    digest_bytes(POSEIDON_HASH.hash_iter(limbs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poseidon2_hash_bytes() {
        let hash1 = poseidon2_hash_bytes(b"guardian");
        let hash2 = poseidon2_hash_bytes(b"guardians");

        assert_eq!(hash1, poseidon2_hash_bytes(b"guardian"));
        assert_ne!(hash1, hash2);
        assert_ne!(hash1, [0u8; 32]);
    }

    #[test]
    fn test_poseidon2_hash_fixed() {
        let left = [1u8; 32];
        let right = [2u8; 32];

        let fixed = poseidon2_hash_fixed(&[&left[..], &right[..]]);
        let swapped = poseidon2_hash_fixed(&[&right[..], &left[..]]);

        let mut concatenated = left.to_vec();
        concatenated.extend_from_slice(&right);
        assert_eq!(fixed, poseidon2_hash_bytes(&concatenated));
        assert_ne!(fixed, swapped);
    }

    #[test]
    fn test_pack_le_limbs() {
        let limbs: Vec<u32> =
            pack_le_limbs([1, 0, 2]).iter().map(|limb| limb.as_canonical_u32()).collect();

        assert_eq!(limbs, vec![1, 2, 3, 0, 0, 0]);
        assert_eq!(pack_le_limbs([]).len(), 4);
    }

    #[test]
    fn test_words_congruent_mod_p_hash_apart() {
        // 0x78000001 is the BabyBear modulus
        let low = 1u32.to_le_bytes();
        let high = (1u32 + 0x7800_0001).to_le_bytes();

        assert_ne!(poseidon2_hash_bytes(&low), poseidon2_hash_bytes(&high));
        assert_ne!(poseidon2_hash_bytes(&[7]), poseidon2_hash_bytes(&[7, 0]));
    }

    #[test]
    fn test_hash_fixed_ignores_slice_boundaries() {
        let split = poseidon2_hash_fixed(&[&b"gua"[..], &b"rdian"[..]]);

        assert_eq!(split, poseidon2_hash_bytes(b"guardian"));
    }
}
