//! Sequential fold over the pending tail of an action log
//!
//! The combine step is total: every entry in range is visited exactly once,
//! in append order, and later entries see the effect of earlier ones. "Do
//! nothing" entries (the sentinel) are explicit no-ops inside the combine
//! step rather than omissions from the range.

use tracing::debug;

use super::log::{Action, ActionLog, ActionsHash};
use crate::member::Member;
use crate::merkle::{NodeHasher, TreeConfig, Witness};
use crate::{Bytes32, Result};

/// Result of folding a range of the log
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Folded<S> {
    /// Final aggregate
    pub state: S,
    /// Pointer of the last entry folded, or the starting pointer if none
    pub pointer: ActionsHash,
    /// Number of entries visited
    pub visited: usize,
}

impl<A: Action> ActionLog<A> {
    /// Left-folds every entry appended after `from` into `seed`
    ///
    /// An empty range returns `seed` and `from` unchanged.
    ///
    /// # Errors
    /// * `Err(Error::Accumulator(AccumulatorError::UnknownPointer))` - If `from` was not
    ///   produced by this log
    ///
    /// # Examples
    ///
    /// ```rust
    /// use merkle_guardian::accumulator::{ActionLog, ActionsHash};
    /// use merkle_guardian::member::{Member, PublicKey};
    ///
    /// let mut log = ActionLog::new();
    /// log.append(Member::new(1, PublicKey::from_bytes([1u8; 32])));
    /// log.append(Member::empty());
    ///
    /// let real = log.fold(&ActionsHash::initial(), 0, |count, member: &Member| {
    ///     count + usize::from(!member.is_empty())
    /// })?;
    /// assert_eq!((real.state, real.visited, real.pointer), (1, 2, log.head()));
    /// # Ok::<(), merkle_guardian::Error>(())
    /// ```
    pub fn fold<S, F>(&self, from: &ActionsHash, seed: S, combine: F) -> Result<Folded<S>>
    where
        F: Fn(S, &A) -> S,
    {
        let pending = self.actions_since(from)?;
        let state = pending.iter().fold(seed, |state, entry| combine(state, entry.action()));
        let pointer = pending.last().map_or(*from, |entry| entry.pointer());
        Ok(Folded { state, pointer, visited: pending.len() })
    }
}

/// Scans the whole pending range for an entry matching `candidate`
///
/// No early exit: a match anywhere in the range is found regardless of what
/// follows it.
pub fn pending_contains<F>(
    log: &ActionLog<Member>,
    from: &ActionsHash,
    candidate: &Member,
    same: F,
) -> Result<Folded<bool>>
where
    F: Fn(&Member, &Member) -> bool,
{
    let folded = log.fold(from, false, |found, entry| found | same(entry, candidate))?;
    debug!(visited = folded.visited, found = folded.state, "dedup fold");
    Ok(folded)
}

/// Aggregate of a commit fold
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RootFold {
    /// Root after the last real entry
    pub root: Bytes32,
    /// Number of real (non-sentinel) entries applied
    pub applied: usize,
}

/// Folds pending entries into `committed`
///
/// Each real entry replaces the running root with the root its leaf and
/// `witness(entry)` imply; sentinels leave it unchanged. A malformed witness
/// anywhere in range fails the whole fold.
pub fn pending_root<H, C, W>(
    log: &ActionLog<Member>,
    from: &ActionsHash,
    committed: Bytes32,
    hasher: &H,
    config: &C,
    witness: W,
) -> Result<Folded<RootFold>>
where
    H: NodeHasher,
    C: TreeConfig,
    W: Fn(&Member) -> &Witness,
{
    let seed: Result<RootFold> = Ok(RootFold { root: committed, applied: 0 });
    let folded = log.fold(from, seed, |state, entry| {
        state.and_then(|current| {
            if entry.is_empty() {
                return Ok(current);
            }
            let leaf = entry.hash_with(hasher, config);
            let root = witness(entry).compute_root_with(leaf, hasher, config)?;
            Ok(RootFold { root, applied: current.applied + 1 })
        })
    })?;
    let state = folded.state?;
    debug!(visited = folded.visited, applied = state.applied, "commit fold");
    Ok(Folded { state, pointer: folded.pointer, visited: folded.visited })
}
