#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Merkle Guardian
//!
//! A Rust library for guardian-based wallet recovery over Merkle-committed
//! membership sets. Registrations and votes are appended to hash-chained
//! action logs and periodically folded into committed roots; membership is
//! then proven against those roots with caller-supplied witnesses.

// Hash-chained action logs, folds and commitments
pub mod accumulator;

// Deployment configuration
pub mod config;

// Error types
pub mod errors;

// Guardian registry and membership queries
pub mod guardian;

// Poseidon2 hashing primitives
pub mod hash;

// Member records and identities
pub mod member;

// Witnesses, hashers and leaf stores
pub mod merkle;

// Core type definitions
pub mod types;

// Hash chain helpers
pub mod utils;

// Recoverable wallet
pub mod wallet;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types and functions
pub use accumulator::{ActionsHash, PublishReceipt, Snapshot};
pub use errors::{Error, Result};
pub use guardian::{GuardianRegistry, MembershipQuery};
pub use member::{Member, PublicKey};
pub use merkle::{compute_root, Witness};
pub use types::Bytes32;
pub use wallet::{RecoveryPreconditions, Wallet};
