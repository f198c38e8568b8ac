//! Inputs callers pass to wallet operations

use serde::{Deserialize, Serialize};

use crate::accumulator::Snapshot;
use crate::member::{Member, PublicKey};
use crate::merkle::Witness;
use crate::types::Slot;
use crate::Bytes32;

/// Who is calling and what slot they observed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Identity the caller asserts
    pub caller: PublicKey,
    /// Current slot as observed by the caller; re-asserted against the clock
    pub slot: Slot,
}

impl CallContext {
    /// Creates a call context
    pub fn new(caller: PublicKey, slot: Slot) -> Self { Self { caller, slot } }
}

/// A guardian a wallet owner wants to enroll
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianEnrollment {
    /// Candidate carrying its membership witness for the guardian registry's tree
    pub candidate: Member,
    /// Registry root the caller observed and proved the candidate against
    pub registry_root: Bytes32,
    /// Witness placing the candidate in the wallet's own guardian tree
    pub wallet_witness: Witness,
}

/// Both commitment snapshots of a wallet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    /// Guardian set snapshot
    pub guardians: Snapshot,
    /// Votes set snapshot
    pub votes: Snapshot,
}
