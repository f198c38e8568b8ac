//! Shared test utilities
//!
//! This module provides common helper functions used across module tests.

use crate::member::{Member, PublicKey};
use crate::merkle::{MemoryLeafStore, WitnessProvider};

/// Deterministic public key from a single byte (tests only)
pub fn key(byte: u8) -> PublicKey { PublicKey::from_bytes([byte; 32]) }

/// Places `member` at the next free position of `store`
///
/// Returns the member carrying the witness for that position. The witness is
/// taken before the leaf is written, so folding it with the member's hash
/// yields the store's new root.
pub fn enroll(store: &mut MemoryLeafStore, member: Member) -> Member {
    let index = store.len() as u64;
    let witness = store.witness(index).expect("store has free positions");
    store.set_leaf(index, member.hash()).expect("index in range");
    member.with_membership_witness(witness)
}
