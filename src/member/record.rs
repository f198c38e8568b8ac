//! Member record
//!
//! A member is the unit accumulated by both the guardian registry and the
//! wallet: an identity, a vote counter, a voted flag, and two witnesses
//! against two different commitments (membership and votes).
//!
//! # Invariants
//!
//! - A real member has a non-empty public key
//! - The sentinel (`account_id = 0`, empty key) pads the action log and folds as a no-op
//! - `has_voted` is set exactly when a vote has been added

use serde::{Deserialize, Serialize};

use super::key::PublicKey;
use crate::accumulator::Action;
use crate::errors::MemberError;
use crate::merkle::{NodeHasher, TreeConfig, Witness, DEFAULT_CONFIG, DEFAULT_HASHER};
use crate::types::AccountId;
use crate::{Bytes32, Result};

/// Member record
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Identity assigned at registration (`0` for the sentinel)
    pub account_id: AccountId,
    /// Account identity key ([`PublicKey::EMPTY`] for the sentinel)
    pub public_key: PublicKey,
    /// Number of votes recorded for this member
    pub votes: u64,
    /// Whether this member has voted
    pub has_voted: bool,
    /// Inclusion proof against a guardian set commitment
    pub membership_witness: Witness,
    /// Inclusion proof against a votes commitment
    pub votes_witness: Witness,
}

impl Member {
    /// Creates a member with no votes and placeholder witnesses
    ///
    /// # Examples
    ///
    /// ```rust
    /// use merkle_guardian::member::{Member, PublicKey};
    ///
    /// let member = Member::new(1, PublicKey::from_bytes([1u8; 32]));
    /// assert!(!member.is_empty());
    /// assert_eq!(member.votes, 0);
    /// assert!(!member.has_voted);
    /// ```
    pub fn new(account_id: AccountId, public_key: PublicKey) -> Self {
        Self {
            account_id,
            public_key,
            votes: 0,
            has_voted: false,
            membership_witness: Witness::empty(),
            votes_witness: Witness::empty(),
        }
    }

    /// The sentinel member used to pad the action log
    pub fn empty() -> Self { Self::new(0, PublicKey::EMPTY) }

    /// Returns `true` for the sentinel
    pub fn is_empty(&self) -> bool { self.public_key.is_empty() }

    /// Leaf hash of this member using the default hasher and config
    pub fn hash(&self) -> Bytes32 { self.hash_with(&DEFAULT_HASHER, &DEFAULT_CONFIG) }

    /// Leaf hash of this member: `H(tag || public_key || account_id || votes || has_voted)`
    ///
    /// Witnesses are not part of the leaf.
    pub fn hash_with<H: NodeHasher, C: TreeConfig>(&self, hasher: &H, config: &C) -> Bytes32 {
        hasher.hash_leaf(
            config.leaf_domain_tag(),
            &[
                &self.public_key.as_bytes()[..],
                &self.account_id.to_le_bytes()[..],
                &self.votes.to_le_bytes()[..],
                &[u8::from(self.has_voted)][..],
            ],
        )
    }

    /// Record equality used to deduplicate registrations
    ///
    /// Compares identity, key, vote count and voted flag; witnesses are
    /// ignored. The same key at a different vote state is a different record.
    pub fn same_record(&self, other: &Member) -> bool {
        self.account_id == other.account_id
            && self.public_key == other.public_key
            && self.votes == other.votes
            && self.has_voted == other.has_voted
    }

    /// Returns a copy with one more vote and the voted flag set
    ///
    /// # Errors
    /// * `Err(Error::Member(MemberError::AlreadyVoted))` - If the member has already voted
    /// * `Err(Error::Member(MemberError::VoteOverflow))` - If the vote count is at `u64::MAX`
    pub fn add_vote(&self) -> Result<Member> {
        if self.has_voted {
            return Err(MemberError::AlreadyVoted(self.public_key).into());
        }
        let votes =
            self.votes.checked_add(1).ok_or(MemberError::VoteOverflow(self.public_key))?;
        Ok(Member { votes, has_voted: true, ..self.clone() })
    }

    /// Replaces the membership witness
    pub fn with_membership_witness(mut self, witness: Witness) -> Self {
        self.membership_witness = witness;
        self
    }

    /// Replaces the votes witness
    pub fn with_votes_witness(mut self, witness: Witness) -> Self {
        self.votes_witness = witness;
        self
    }
}

impl Action for Member {
    fn action_bytes(&self) -> Vec<u8> {
        let membership = self.membership_witness.to_bytes();
        let votes = self.votes_witness.to_bytes();
        let mut bytes = Vec::with_capacity(32 + 8 + 8 + 1 + membership.len() + votes.len());
        bytes.extend_from_slice(self.public_key.as_bytes());
        bytes.extend_from_slice(&self.account_id.to_le_bytes());
        bytes.extend_from_slice(&self.votes.to_le_bytes());
        bytes.push(u8::from(self.has_voted));
        bytes.extend_from_slice(&membership);
        bytes.extend_from_slice(&votes);
        bytes
    }
}
