//! Core type definitions for the Merkle Guardian library
//!
//! This module defines fundamental types used across multiple modules,
//! providing a common location for shared type definitions and domain tags.

// ============================================================================
// Fundamental Types
// ============================================================================

/// Type alias for 32-byte arrays used across cryptographic operations
pub type Bytes32 = [u8; 32];

/// Logical time (global slot since genesis) supplied by an external clock
pub type Slot = u32;

/// Identity assigned to a member at registration time
///
/// `0` is reserved for the empty sentinel member.
pub type AccountId = u64;

// ============================================================================
// Tree Domain
// ============================================================================

/// Height of the membership and votes trees (number of levels including leaves)
pub const TREE_HEIGHT: u8 = 8;

/// Number of `(sibling, is_left)` pairs in a witness for a tree of [`TREE_HEIGHT`]
pub const WITNESS_LENGTH: usize = TREE_HEIGHT as usize - 1;

/// Domain separation tag for member leaf hashes
pub const MEMBER_DOMAIN_TAG: &[u8] = b"MG_MEMBER_v0";

/// Domain separation tag for internal tree nodes
pub const NODE_DOMAIN_TAG: &[u8] = b"MG_NODE_v0";

// ============================================================================
// Action Log Domain
// ============================================================================

/// Domain separation tag for the action log hash chain
///
/// This tag is used to prefix every chain step so that action pointers
/// cannot collide with any other hash context in the crate.
pub const CHAIN_DOMAIN: &[u8] = b"MG_CHAIN_v0";

/// Domain separation tag for the initial (empty log) action pointer
pub const ACTIONS_INIT_DOMAIN: &[u8] = b"MG_ACTIONS_INIT_v0";

// ============================================================================
// Recovery Domain
// ============================================================================

/// Latest representable slot, used as the open end of the default recovery window
pub const MAX_SLOT: Slot = Slot::MAX;
