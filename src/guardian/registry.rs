//! Guardian registry
//!
//! Keeps the committed root of the guardian set and the pending log of
//! registrations. Registration dedups against the pending log, membership
//! queries check a caller-supplied witness against the committed root, and
//! publish folds the pending log into a new committed root.

use tracing::{info, warn};

use crate::accumulator::{Accumulator, ActionLog, ActionsHash, PublishReceipt, Snapshot, TrackedSet};
use crate::config::GuardianRegistryConfig;
use crate::errors::MemberError;
use crate::member::{Member, PublicKey};
use crate::merkle::{
    empty_root, GuardianTreeV0Config, NodeHasher, Poseidon2Hasher, TreeConfig, DEFAULT_CONFIG,
    DEFAULT_HASHER,
};
use crate::{Bytes32, Result};

/// Registry of accounts authorized to act as guardians
#[derive(Clone, Debug)]
pub struct GuardianRegistry<H = Poseidon2Hasher, C = GuardianTreeV0Config> {
    admin: PublicKey,
    guardians: Accumulator<H, C>,
}

impl GuardianRegistry {
    /// Creates a registry administered by `admin`, committed to the empty tree
    ///
    /// # Examples
    ///
    /// ```rust
    /// use merkle_guardian::guardian::GuardianRegistry;
    /// use merkle_guardian::member::{Member, PublicKey};
    ///
    /// let admin = PublicKey::from_bytes([1u8; 32]);
    /// let mut registry = GuardianRegistry::new(admin);
    /// let member = Member::new(1, PublicKey::from_bytes([2u8; 32]));
    ///
    /// assert!(!registry.register(&member, &admin, &registry.snapshot())?);
    /// assert!(registry.register(&member, &admin, &registry.snapshot())?);
    /// assert_eq!(registry.log().len(), 2);
    /// # Ok::<(), merkle_guardian::Error>(())
    /// ```
    pub fn new(admin: PublicKey) -> Self {
        Self::with_hasher_and_config(admin, DEFAULT_HASHER, DEFAULT_CONFIG)
    }

    /// Creates a registry committed to an existing root (e.g. restored from storage)
    pub fn with_root(admin: PublicKey, root: Bytes32) -> Self {
        Self {
            admin,
            guardians: Accumulator::new(TrackedSet::Guardians, root, DEFAULT_HASHER, DEFAULT_CONFIG),
        }
    }

    /// Creates a registry from deployment configuration
    pub fn from_config(config: &GuardianRegistryConfig) -> Self { Self::new(config.admin) }
}

impl<H: NodeHasher, C: TreeConfig> GuardianRegistry<H, C> {
    /// Creates a registry with a custom hasher and tree config, committed to the empty tree
    pub fn with_hasher_and_config(admin: PublicKey, hasher: H, config: C) -> Self {
        let root = empty_root(&hasher, &config);
        Self { admin, guardians: Accumulator::new(TrackedSet::Guardians, root, hasher, config) }
    }

    /// The delegate key allowed to register guardians
    pub fn admin(&self) -> PublicKey { self.admin }

    /// Root of the committed guardian set
    pub fn committed_guardians(&self) -> Bytes32 { self.guardians.committed_root() }

    /// Pointer up to which registrations are folded into the committed root
    pub fn accumulated_guardians(&self) -> ActionsHash { self.guardians.accumulated() }

    /// Head of the registration log
    pub fn action_state(&self) -> ActionsHash { self.guardians.head() }

    /// The registration log
    pub fn log(&self) -> &ActionLog<Member> { self.guardians.log() }

    /// Current state for callers to observe and re-assert
    pub fn snapshot(&self) -> Snapshot { self.guardians.snapshot() }

    /// Logs a guardian registration
    ///
    /// Scans every registration pending since the accumulated pointer for the
    /// same record (see [`Member::same_record`]). Appends the sentinel if one
    /// is found, the member otherwise.
    ///
    /// # Arguments
    /// * `member` - Candidate carrying its membership witness for the guardian tree
    /// * `caller` - Identity the caller asserts; must be the admin
    /// * `observed` - Snapshot the caller read; accumulated pointer and head are re-asserted
    ///
    /// # Returns
    /// Whether the member was already pending
    ///
    /// # Errors
    /// * `Err(Error::Precondition(PreconditionError::Unauthorized))` - If `caller` is not the admin
    /// * `Err(Error::Member(MemberError::EmptyMember))` - If `member` is the sentinel
    /// * `Err(Error::Precondition(PreconditionError::StalePrecondition))` - If the log moved
    pub fn register(
        &mut self,
        member: &Member,
        caller: &PublicKey,
        observed: &Snapshot,
    ) -> Result<bool> {
        self.admin.ensure_delegate_of(caller)?;
        if member.is_empty() {
            warn!("rejected registration of the empty member");
            return Err(MemberError::EmptyMember.into());
        }

        let already_exists = self.guardians.record(member.clone(), observed, Member::same_record)?;
        info!(
            account_id = member.account_id,
            public_key = %member.public_key,
            already_exists,
            "guardian registration"
        );
        Ok(already_exists)
    }

    /// Checks `member` against the committed guardian root
    ///
    /// Pending registrations are not visible until the next publish.
    ///
    /// # Errors
    /// * `Err(Error::Precondition(PreconditionError::StalePrecondition))` - If `observed_root`
    ///   is not the committed root
    /// * `Err(Error::Witness(WitnessError::MalformedWitness))` - If the witness has the wrong length
    pub fn is_member(&self, member: &Member, observed_root: &Bytes32) -> Result<bool> {
        self.guardians.contains(member, observed_root)
    }

    /// Folds pending registrations into the committed root
    ///
    /// # Errors
    /// * `Err(Error::Precondition(PreconditionError::StalePrecondition))` - If the committed
    ///   root or accumulated pointer moved
    /// * `Err(Error::Witness(WitnessError::MalformedWitness))` - If a pending entry carries a
    ///   malformed witness; nothing changes
    pub fn publish(&mut self, observed: &Snapshot) -> Result<PublishReceipt> {
        self.guardians.publish(observed)
    }
}
