//! Committed root plus its pending action log
//!
//! An [`Accumulator`] pairs a committed Merkle root with the action log
//! whose unfolded tail will become the next root. The root and the
//! accumulated pointer change only through [`Accumulator::publish`]; the log
//! head changes only through [`Accumulator::record`].
//!
//! # Concurrency
//!
//! Nothing here locks. Every mutating call takes the [`Snapshot`] the caller
//! observed and fails with `StalePrecondition` if any part of it moved.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::log::{ActionLog, ActionsHash};
use super::reducer::{pending_contains, pending_root, Folded};
use crate::errors::{PreconditionError, StateField};
use crate::member::Member;
use crate::merkle::{NodeHasher, TreeConfig, Witness};
use crate::{Bytes32, Result};

/// Committed root and accumulated pointer of one tracked set
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentPair {
    /// Authenticated root as of the last publish
    pub committed: Bytes32,
    /// Everything up to this pointer is folded into `committed`
    pub accumulated: ActionsHash,
}

/// State a caller observes and re-asserts on a mutating call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Committed root
    pub committed: Bytes32,
    /// Accumulated pointer
    pub accumulated: ActionsHash,
    /// Action log head
    pub head: ActionsHash,
}

/// Outcome of a publish
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    /// Committed root before the publish
    pub previous_root: Bytes32,
    /// Committed root after the publish
    pub root: Bytes32,
    /// Accumulated pointer after the publish
    pub pointer: ActionsHash,
    /// Log entries folded
    pub visited: usize,
    /// Real (non-sentinel) entries folded
    pub applied: usize,
}

/// Which set an accumulator tracks
///
/// Selects the witness each entry is folded through and the names reported
/// in stale precondition errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackedSet {
    /// Guardian membership, folded through `membership_witness`
    Guardians,
    /// Votes, folded through `votes_witness`
    Votes,
}

impl TrackedSet {
    fn committed_field(self) -> StateField {
        match self {
            Self::Guardians => StateField::CommittedGuardians,
            Self::Votes => StateField::CommittedVotes,
        }
    }

    fn accumulated_field(self) -> StateField {
        match self {
            Self::Guardians => StateField::AccumulatedGuardians,
            Self::Votes => StateField::AccumulatedVotes,
        }
    }

    fn head_field(self) -> StateField {
        match self {
            Self::Guardians => StateField::GuardianActionState,
            Self::Votes => StateField::VoteActionState,
        }
    }

    /// The witness of `member` that proves inclusion in this set
    pub fn witness(self, member: &Member) -> &Witness {
        match self {
            Self::Guardians => &member.membership_witness,
            Self::Votes => &member.votes_witness,
        }
    }
}

/// A committed root with its pending action log
#[derive(Clone, Debug)]
pub struct Accumulator<H, C> {
    set: TrackedSet,
    commitment: CommitmentPair,
    log: ActionLog<Member>,
    hasher: H,
    config: C,
}

impl<H: NodeHasher, C: TreeConfig> Accumulator<H, C> {
    /// Creates an accumulator with an empty log committed to `root`
    pub fn new(set: TrackedSet, root: Bytes32, hasher: H, config: C) -> Self {
        let log = ActionLog::new();
        let commitment = CommitmentPair { committed: root, accumulated: log.head() };
        Self { set, commitment, log, hasher, config }
    }

    /// The tracked set
    pub fn set(&self) -> TrackedSet { self.set }

    /// Current committed root and accumulated pointer
    pub fn commitment(&self) -> CommitmentPair { self.commitment }

    /// Current committed root
    pub fn committed_root(&self) -> Bytes32 { self.commitment.committed }

    /// Current accumulated pointer
    pub fn accumulated(&self) -> ActionsHash { self.commitment.accumulated }

    /// Current log head
    pub fn head(&self) -> ActionsHash { self.log.head() }

    /// The action log
    pub fn log(&self) -> &ActionLog<Member> { &self.log }

    /// Hasher used for leaves and nodes
    pub fn hasher(&self) -> &H { &self.hasher }

    /// Tree configuration
    pub fn config(&self) -> &C { &self.config }

    /// Everything a mutating caller must re-assert
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            committed: self.commitment.committed,
            accumulated: self.commitment.accumulated,
            head: self.log.head(),
        }
    }

    /// Fails unless `observed` is the current committed root
    pub fn ensure_committed(&self, observed: &Bytes32) -> Result<()> {
        self.ensure(observed == &self.commitment.committed, self.set.committed_field())
    }

    /// Fails unless `observed` is the current accumulated pointer
    pub fn ensure_accumulated(&self, observed: &ActionsHash) -> Result<()> {
        self.ensure(observed == &self.commitment.accumulated, self.set.accumulated_field())
    }

    /// Fails unless `observed` is the current log head
    pub fn ensure_head(&self, observed: &ActionsHash) -> Result<()> {
        self.ensure(observed == &self.log.head(), self.set.head_field())
    }

    fn ensure(&self, fresh: bool, field: StateField) -> Result<()> {
        if !fresh {
            warn!(?field, set = ?self.set, "stale precondition");
            return Err(PreconditionError::StalePrecondition { field }.into());
        }
        Ok(())
    }

    /// Checks `member` against the committed root through this set's witness
    ///
    /// The caller re-asserts the committed root it observed.
    pub fn contains(&self, member: &Member, observed_root: &Bytes32) -> Result<bool> {
        self.ensure_committed(observed_root)?;
        let leaf = member.hash_with(&self.hasher, &self.config);
        self.set.witness(member).verify_with(
            leaf,
            self.commitment.committed,
            &self.hasher,
            &self.config,
        )
    }

    /// Dedups `candidate` against the pending tail and appends it or the sentinel
    ///
    /// Something is always appended. Returns whether a match was already
    /// pending. The caller re-asserts the accumulated pointer and log head.
    pub fn record<F>(&mut self, candidate: Member, observed: &Snapshot, same: F) -> Result<bool>
    where
        F: Fn(&Member, &Member) -> bool,
    {
        let from = self.commitment.accumulated;
        self.record_since(&from, candidate, observed, same)
    }

    /// Like [`Accumulator::record`], but dedups against the whole log
    ///
    /// Entries already folded into the committed root count as matches too,
    /// so a candidate is accepted at most once over the life of the set.
    pub fn record_unique<F>(
        &mut self,
        candidate: Member,
        observed: &Snapshot,
        same: F,
    ) -> Result<bool>
    where
        F: Fn(&Member, &Member) -> bool,
    {
        self.record_since(&ActionsHash::initial(), candidate, observed, same)
    }

    fn record_since<F>(
        &mut self,
        from: &ActionsHash,
        candidate: Member,
        observed: &Snapshot,
        same: F,
    ) -> Result<bool>
    where
        F: Fn(&Member, &Member) -> bool,
    {
        self.ensure_accumulated(&observed.accumulated)?;
        self.ensure_head(&observed.head)?;

        let Folded { state: already_exists, .. } =
            pending_contains(&self.log, from, &candidate, same)?;
        let entry = if already_exists { Member::empty() } else { candidate };
        let head = self.log.append(entry);
        debug!(set = ?self.set, already_exists, %head, "appended action");
        Ok(already_exists)
    }

    /// Folds the pending tail into the committed root
    ///
    /// The caller re-asserts the committed root and accumulated pointer.
    /// State changes only after the whole fold succeeds.
    pub fn publish(&mut self, observed: &Snapshot) -> Result<PublishReceipt> {
        self.ensure_committed(&observed.committed)?;
        self.ensure_accumulated(&observed.accumulated)?;

        let previous_root = self.commitment.committed;
        let set = self.set;
        let folded = pending_root(
            &self.log,
            &self.commitment.accumulated,
            previous_root,
            &self.hasher,
            &self.config,
            |member| set.witness(member),
        )?;

        self.commitment =
            CommitmentPair { committed: folded.state.root, accumulated: folded.pointer };
        let receipt = PublishReceipt {
            previous_root,
            root: folded.state.root,
            pointer: folded.pointer,
            visited: folded.visited,
            applied: folded.state.applied,
        };
        info!(
            set = ?set,
            root = %hex::encode(receipt.root),
            pointer = %receipt.pointer,
            visited = receipt.visited,
            applied = receipt.applied,
            "published"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WitnessError;
    use crate::merkle::{
        GuardianTreeV0Config, MemoryLeafStore, Poseidon2Hasher, WitnessProvider, DEFAULT_CONFIG,
        DEFAULT_HASHER,
    };
    use crate::test_utils::key;

    fn accumulator(set: TrackedSet) -> Accumulator<Poseidon2Hasher, GuardianTreeV0Config> {
        Accumulator::new(set, MemoryLeafStore::new().root(), DEFAULT_HASHER, DEFAULT_CONFIG)
    }

    #[test]
    fn test_new() {
        let acc = accumulator(TrackedSet::Guardians);

        let snapshot = acc.snapshot();

        assert_eq!(snapshot.accumulated, ActionsHash::initial());
        assert_eq!(snapshot.head, ActionsHash::initial());
        assert_eq!(snapshot.committed, MemoryLeafStore::new().root());
    }

    #[test]
    fn test_record_dedups() {
        let mut acc = accumulator(TrackedSet::Guardians);
        let member = Member::new(1, key(1));

        let first = acc.record(member.clone(), &acc.snapshot(), Member::same_record);
        let second = acc.record(member.clone(), &acc.snapshot(), Member::same_record);

        assert_eq!(first, Ok(false));
        assert_eq!(second, Ok(true));
        assert_eq!(acc.log().len(), 2);
        assert_eq!(acc.log().entries()[0].action(), &member);
        assert!(acc.log().entries()[1].action().is_empty());
    }

    #[test]
    fn test_record_unique_sees_folded_entries() {
        let mut acc = accumulator(TrackedSet::Votes);
        let ballot = Member::new(1, key(1));
        acc.record_unique(ballot.clone(), &acc.snapshot(), Member::same_record).expect("fresh");
        acc.publish(&acc.snapshot()).expect("fresh");

        let pending_only = acc.record(ballot.clone(), &acc.snapshot(), Member::same_record);
        let whole_log = acc.record_unique(ballot, &acc.snapshot(), Member::same_record);

        assert_eq!(pending_only, Ok(false));
        assert_eq!(whole_log, Ok(true));
        assert_eq!(acc.log().len(), 3);
        assert!(acc.log().entries()[2].action().is_empty());
    }

    #[test]
    fn test_record_rejects_stale_head() {
        let mut acc = accumulator(TrackedSet::Votes);
        let observed = acc.snapshot();
        acc.record(Member::new(1, key(1)), &observed, Member::same_record).expect("fresh");

        let result = acc.record(Member::new(2, key(2)), &observed, Member::same_record);

        assert_eq!(
            result,
            Err(crate::Error::Precondition(PreconditionError::StalePrecondition {
                field: StateField::VoteActionState
            }))
        );
        assert_eq!(acc.log().len(), 1);
    }

    #[test]
    fn test_publish_empty_is_noop() {
        let mut acc = accumulator(TrackedSet::Guardians);
        let before = acc.commitment();

        let receipt = acc.publish(&acc.snapshot()).expect("fresh");

        assert_eq!(acc.commitment(), before);
        assert_eq!(receipt.root, receipt.previous_root);
        assert_eq!((receipt.visited, receipt.applied), (0, 0));
    }

    #[test]
    fn test_publish_folds_through_set_witness() {
        let mut store = MemoryLeafStore::new();
        let mut acc = accumulator(TrackedSet::Votes);
        let voter = Member::new(1, key(1)).add_vote().expect("not voted");
        let voter = voter.with_votes_witness(store.witness(0).expect("in range"));
        store.set_leaf(0, voter.hash()).expect("in range");
        acc.record(voter.clone(), &acc.snapshot(), Member::same_record).expect("fresh");

        let receipt = acc.publish(&acc.snapshot()).expect("fresh");

        assert_eq!(receipt.root, store.root());
        assert_eq!(acc.accumulated(), acc.head());
        assert_eq!(acc.contains(&voter, &store.root()), Ok(true));
    }

    #[test]
    fn test_publish_rejects_stale_root() {
        let mut acc = accumulator(TrackedSet::Guardians);
        let mut observed = acc.snapshot();
        observed.committed = [9u8; 32];

        let result = acc.publish(&observed);

        assert_eq!(
            result,
            Err(crate::Error::Precondition(PreconditionError::StalePrecondition {
                field: StateField::CommittedGuardians
            }))
        );
    }

    #[test]
    fn test_publish_malformed_witness_changes_nothing() {
        let mut acc = Accumulator::new(TrackedSet::Guardians, [0u8; 32], DEFAULT_HASHER, ShortConfig);
        acc.record(Member::empty(), &acc.snapshot(), Member::same_record).expect("fresh");
        acc.record(Member::new(1, key(1)), &acc.snapshot(), Member::same_record).expect("fresh");
        let before = acc.commitment();

        let result = acc.publish(&acc.snapshot());

        assert_eq!(
            result,
            Err(crate::Error::Witness(WitnessError::MalformedWitness { length: 7, expected: 2 }))
        );
        assert_eq!(acc.commitment(), before);
        assert_eq!(acc.accumulated(), ActionsHash::initial());
    }

    struct ShortConfig;

    impl TreeConfig for ShortConfig {
        fn leaf_domain_tag(&self) -> &[u8] { b"leaf" }

        fn internal_domain_tag(&self) -> &[u8] { b"node" }

        fn height(&self) -> u8 { 3 }
    }
}
