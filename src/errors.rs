//! Error types for the Merkle Guardian library
//!
//! Every failure is surfaced synchronously and aborts the whole operation.
//! No operation in this crate leaves partially applied state behind.

use std::fmt;

use thiserror::Error;

use crate::accumulator::ActionsHash;
use crate::member::PublicKey;
use crate::types::{AccountId, Slot};

/// The main error type for the Merkle Guardian library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Precondition violations (authority, stale snapshots, time window, membership)
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// Witness errors
    #[error(transparent)]
    Witness(#[from] WitnessError),

    /// Action log errors
    #[error(transparent)]
    Accumulator(#[from] AccumulatorError),

    /// Member record errors
    #[error(transparent)]
    Member(#[from] MemberError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Internal error (e.g. a poisoned shared registry lock)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Piece of state a caller observed and re-asserted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateField {
    /// Committed root of a guardian set
    CommittedGuardians,
    /// Accumulated pointer of a guardian action log
    AccumulatedGuardians,
    /// Head of a guardian action log
    GuardianActionState,
    /// Committed root of a votes set
    CommittedVotes,
    /// Accumulated pointer of a votes action log
    AccumulatedVotes,
    /// Head of a votes action log
    VoteActionState,
    /// Current logical time
    CurrentSlot,
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CommittedGuardians => "committed guardians",
            Self::AccumulatedGuardians => "accumulated guardians",
            Self::GuardianActionState => "guardian action state",
            Self::CommittedVotes => "committed votes",
            Self::AccumulatedVotes => "accumulated votes",
            Self::VoteActionState => "vote action state",
            Self::CurrentSlot => "current slot",
        };
        f.write_str(name)
    }
}

/// Errors raised when an operation's preconditions do not hold
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PreconditionError {
    /// Caller's asserted identity does not match the configured delegate
    #[error("Unauthorized caller: {caller}")]
    Unauthorized {
        /// The identity the caller asserted
        caller: PublicKey,
    },

    /// Caller's snapshot of a root, pointer or slot no longer matches current state
    #[error("Stale precondition: {field} changed since it was observed")]
    StalePrecondition {
        /// The state that changed
        field: StateField,
    },

    /// Logical time is outside the permitted window
    #[error("Slot {slot} is outside the permitted window [{start}, {end}]")]
    OutsideWindow {
        /// The current slot
        slot: Slot,
        /// First slot of the window
        start: Slot,
        /// Last slot of the window
        end: Slot,
    },

    /// A required membership check failed
    #[error("Not a member of the committed set")]
    NotAMember,
}

/// Errors that can occur when building or checking witnesses
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WitnessError {
    /// Witness path length does not match the configured tree height
    #[error("Malformed witness: path length {length}, expected {expected}")]
    MalformedWitness {
        /// Supplied path length
        length: usize,
        /// Path length required by the tree height
        expected: usize,
    },

    /// Leaf position is outside the tree
    #[error("Leaf index {index} out of range (capacity {capacity})")]
    LeafIndexOutOfRange {
        /// Requested leaf index
        index: u64,
        /// Number of leaves in the tree
        capacity: u64,
    },
}

/// Errors that can occur while reading the action log
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccumulatorError {
    /// The pointer was never produced by this log
    #[error("Unknown action pointer: {0}")]
    UnknownPointer(ActionsHash),
}

/// Errors that can occur on member records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MemberError {
    /// Member has already cast its vote
    #[error("Member {0} has already voted")]
    AlreadyVoted(PublicKey),

    /// The empty sentinel cannot be registered or vote
    #[error("The empty member cannot be used here")]
    EmptyMember,

    /// Vote count is already at its maximum
    #[error("Vote count of member {0} overflows")]
    VoteOverflow(PublicKey),

    /// Every account id has been handed out
    #[error("Account ids exhausted after {0}")]
    AccountIdsExhausted(AccountId),
}

/// Errors that can occur while loading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// Recovery window start is after its end
    #[error("Invalid recovery window: start {start} > end {end}")]
    InvalidRecoveryWindow {
        /// Configured start slot
        start: Slot,
        /// Configured end slot
        end: Slot,
    },

    /// Public key is not 32 hex-encoded bytes
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Configuration document could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Configuration file could not be read
    #[error("Failed to read configuration: {0}")]
    Io(String),
}

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
