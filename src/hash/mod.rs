//! Hash primitives
//!
//! Poseidon2 over BabyBear is the hash used for member leaves and tree nodes.

mod poseidon2;

pub use poseidon2::{poseidon2_hash_bytes, poseidon2_hash_fixed};
