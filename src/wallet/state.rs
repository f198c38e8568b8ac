//! Wallet state and operations
//!
//! A wallet owns two commitment pairs, one for its guardians and one for
//! recovery votes, each with its own action log. It references a guardian
//! registry only through a read-only [`MembershipQuery`].
//!
//! # Invariants
//!
//! - Guardians are enrolled only up to the start of recovery
//! - Every enrolled guardian is committed in the external registry at enrollment time
//! - Votes are cast only inside the recovery window, by committed wallet guardians
//! - Every operation either applies completely or leaves the wallet unchanged

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use super::clock::SlotClock;
use super::preconditions::RecoveryPreconditions;
use super::request::{CallContext, GuardianEnrollment, WalletSnapshot};
use crate::accumulator::{Accumulator, ActionLog, ActionsHash, PublishReceipt, Snapshot, TrackedSet};
use crate::config::WalletConfig;
use crate::errors::{MemberError, PreconditionError, StateField};
use crate::guardian::MembershipQuery;
use crate::member::{Member, PublicKey};
use crate::merkle::{
    empty_root, GuardianTreeV0Config, NodeHasher, Poseidon2Hasher, TreeConfig, DEFAULT_CONFIG,
    DEFAULT_HASHER,
};
use crate::types::Slot;
use crate::{Bytes32, Result};

/// Recoverable wallet
pub struct Wallet<H = Poseidon2Hasher, C = GuardianTreeV0Config> {
    user: PublicKey,
    recovery: RecoveryPreconditions,
    registry: Arc<dyn MembershipQuery>,
    clock: Arc<dyn SlotClock>,
    guardians: Accumulator<H, C>,
    votes: Accumulator<H, C>,
}

impl Wallet {
    /// Creates a wallet with empty guardian and votes trees
    ///
    /// # Arguments
    /// * `user` - Delegate key allowed to enroll guardians
    /// * `recovery` - Window gating enrollment and voting
    /// * `registry` - Guardian registry candidates must be committed in
    /// * `clock` - Source of the current slot
    pub fn new(
        user: PublicKey,
        recovery: RecoveryPreconditions,
        registry: Arc<dyn MembershipQuery>,
        clock: Arc<dyn SlotClock>,
    ) -> Self {
        Self::with_hasher_and_config(user, recovery, registry, clock, DEFAULT_HASHER, DEFAULT_CONFIG)
    }

    /// Creates a wallet from deployment configuration
    pub fn from_config(
        config: &WalletConfig,
        registry: Arc<dyn MembershipQuery>,
        clock: Arc<dyn SlotClock>,
    ) -> Self {
        Self::new(config.user, config.recovery, registry, clock)
    }
}

impl<H: NodeHasher + Clone, C: TreeConfig + Clone> Wallet<H, C> {
    /// Creates a wallet with a custom hasher and tree config
    pub fn with_hasher_and_config(
        user: PublicKey,
        recovery: RecoveryPreconditions,
        registry: Arc<dyn MembershipQuery>,
        clock: Arc<dyn SlotClock>,
        hasher: H,
        config: C,
    ) -> Self {
        let root = empty_root(&hasher, &config);
        let guardians =
            Accumulator::new(TrackedSet::Guardians, root, hasher.clone(), config.clone());
        let votes = Accumulator::new(TrackedSet::Votes, root, hasher, config);
        Self { user, recovery, registry, clock, guardians, votes }
    }
}

impl<H: NodeHasher, C: TreeConfig> Wallet<H, C> {
    /// The delegate key allowed to enroll guardians
    pub fn user(&self) -> PublicKey { self.user }

    /// The recovery window
    pub fn recovery(&self) -> RecoveryPreconditions { self.recovery }

    /// Root of the committed guardian set
    pub fn committed_guardians(&self) -> Bytes32 { self.guardians.committed_root() }

    /// Pointer up to which enrollments are folded
    pub fn accumulated_guardians(&self) -> ActionsHash { self.guardians.accumulated() }

    /// Root of the committed votes set
    pub fn committed_votes(&self) -> Bytes32 { self.votes.committed_root() }

    /// Pointer up to which votes are folded
    pub fn accumulated_votes(&self) -> ActionsHash { self.votes.accumulated() }

    /// The enrollment log
    pub fn guardian_log(&self) -> &ActionLog<Member> { self.guardians.log() }

    /// The votes log
    pub fn vote_log(&self) -> &ActionLog<Member> { self.votes.log() }

    /// Current state of both sets for callers to observe and re-assert
    pub fn snapshot(&self) -> WalletSnapshot {
        WalletSnapshot { guardians: self.guardians.snapshot(), votes: self.votes.snapshot() }
    }

    /// Enrolls a guardian
    ///
    /// Checks, in order: the caller is the wallet's user, the observed slot
    /// is current, enrollment is still open (`slot <= start_recovery`), and the
    /// candidate is committed in the guardian registry. Then dedups against
    /// pending enrollments and appends the candidate, carrying its wallet
    /// witness, or the sentinel.
    ///
    /// # Returns
    /// Whether the candidate was already pending
    ///
    /// # Errors
    /// * `Err(Error::Precondition(PreconditionError::Unauthorized))` - If the caller is not the user
    /// * `Err(Error::Precondition(PreconditionError::StalePrecondition))` - If the slot or
    ///   guardian log moved, or the registry root changed
    /// * `Err(Error::Precondition(PreconditionError::OutsideWindow))` - If recovery has started
    /// * `Err(Error::Member(MemberError::EmptyMember))` - If the candidate is the sentinel
    /// * `Err(Error::Precondition(PreconditionError::NotAMember))` - If the registry does not
    ///   hold the candidate
    pub fn add_guardian(
        &mut self,
        enrollment: &GuardianEnrollment,
        ctx: &CallContext,
        observed: &Snapshot,
    ) -> Result<bool> {
        self.user.ensure_delegate_of(&ctx.caller)?;
        self.ensure_slot(ctx.slot)?;
        self.recovery.ensure_enrollment_open(ctx.slot)?;

        let candidate = &enrollment.candidate;
        if candidate.is_empty() {
            return Err(MemberError::EmptyMember.into());
        }
        if !self.registry.is_member(candidate, &enrollment.registry_root)? {
            warn!(public_key = %candidate.public_key, "candidate is not a registered guardian");
            return Err(PreconditionError::NotAMember.into());
        }

        let entry = candidate.clone().with_membership_witness(enrollment.wallet_witness.clone());
        let already_exists = self.guardians.record(entry, observed, Member::same_record)?;
        info!(
            public_key = %candidate.public_key,
            slot = ctx.slot,
            already_exists,
            "guardian enrollment"
        );
        Ok(already_exists)
    }

    /// Folds pending enrollments into the committed guardian root
    pub fn publish_guardians(&mut self, observed: &Snapshot) -> Result<PublishReceipt> {
        self.guardians.publish(observed)
    }

    /// Checks `member`'s membership witness against the committed guardian root
    pub fn is_guardian(&self, member: &Member, observed_root: &Bytes32) -> Result<bool> {
        self.guardians.contains(member, observed_root)
    }

    /// Casts a recovery vote
    ///
    /// `voter` is the guardian record as committed in this wallet, carrying
    /// its wallet membership witness and the votes witness for the slot its
    /// vote will occupy. Ballots are deduplicated by public key across the
    /// whole votes log, so a key counts at most once even after a publish.
    ///
    /// # Returns
    /// Whether a vote from this key was already recorded
    ///
    /// # Errors
    /// * `Err(Error::Precondition(PreconditionError::Unauthorized))` - If the caller is not the voter
    /// * `Err(Error::Precondition(PreconditionError::StalePrecondition))` - If the slot, committed
    ///   guardians or votes log moved
    /// * `Err(Error::Precondition(PreconditionError::OutsideWindow))` - If the slot is outside
    ///   `[start_recovery, end_recovery]`
    /// * `Err(Error::Precondition(PreconditionError::NotAMember))` - If the voter is not a
    ///   committed guardian of this wallet
    /// * `Err(Error::Member(MemberError::AlreadyVoted))` - If the voter record has already voted
    pub fn vote(
        &mut self,
        voter: &Member,
        ctx: &CallContext,
        observed: &WalletSnapshot,
    ) -> Result<bool> {
        if voter.is_empty() {
            return Err(MemberError::EmptyMember.into());
        }
        voter.public_key.ensure_delegate_of(&ctx.caller)?;
        self.ensure_slot(ctx.slot)?;
        self.recovery.ensure_recovery_open(ctx.slot)?;

        if !self.guardians.contains(voter, &observed.guardians.committed)? {
            warn!(public_key = %voter.public_key, "voter is not a wallet guardian");
            return Err(PreconditionError::NotAMember.into());
        }
        let ballot = voter.add_vote()?;

        let already_voted = self.votes.record_unique(ballot, &observed.votes, |entry, candidate| {
            entry.public_key == candidate.public_key
        })?;
        info!(public_key = %voter.public_key, slot = ctx.slot, already_voted, "recovery vote");
        Ok(already_voted)
    }

    /// Folds pending votes into the committed votes root
    pub fn publish_votes(&mut self, observed: &Snapshot) -> Result<PublishReceipt> {
        self.votes.publish(observed)
    }

    /// Checks a ballot's votes witness against the committed votes root
    pub fn has_voted(&self, ballot: &Member, observed_root: &Bytes32) -> Result<bool> {
        self.votes.contains(ballot, observed_root)
    }

    fn ensure_slot(&self, observed: Slot) -> Result<()> {
        let current = self.clock.current_slot();
        if observed != current {
            warn!(observed, current, "stale slot");
            return Err(
                PreconditionError::StalePrecondition { field: StateField::CurrentSlot }.into()
            );
        }
        Ok(())
    }
}

impl<H, C> fmt::Debug for Wallet<H, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("user", &self.user)
            .field("recovery", &self.recovery)
            .finish_non_exhaustive()
    }
}
