//! Merkle witness verification
//!
//! This module provides the hasher and tree configuration traits, the
//! witness type with its root recomputation, and an external leaf store
//! that hosts use to produce witnesses. The registries themselves only hold
//! roots; they never materialize a tree.

mod cache;
mod config;
mod hasher;
mod store;
mod tree;
mod witness;

pub use cache::CachedWitnessProvider;
pub use config::GuardianTreeV0Config;
pub use hasher::{Poseidon2Hasher, Sha256Hasher};
pub use store::{empty_root, MemoryLeafStore, WitnessProvider};
pub use tree::{NodeHasher, TreeConfig};
pub use witness::{compute_root, Witness, WitnessNode};

pub(crate) use config::DEFAULT_CONFIG;
pub(crate) use hasher::DEFAULT_HASHER;
