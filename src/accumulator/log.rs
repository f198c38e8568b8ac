//! Append-only hash-chained action log
//!
//! Every appended action advances a running SHA-256 chain. The chain value
//! after an entry identifies that entry's position, so "everything appended
//! after pointer P" is a well-defined suffix of the log. Entries are never
//! removed or rewritten.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{AccumulatorError, ConfigError};
use crate::utils::{compute_hash_chain, initial_chain_value};
use crate::{Bytes32, Result};

/// Something that can be recorded in an [`ActionLog`]
pub trait Action {
    /// Canonical bytes folded into the log's hash chain
    fn action_bytes(&self) -> Vec<u8>;
}

/// Hash-chain pointer into an action log
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionsHash(Bytes32);

impl ActionsHash {
    /// Pointer of a log that has never been appended to
    pub fn initial() -> Self { Self(initial_chain_value()) }

    /// Wraps a raw chain value
    pub const fn from_bytes(bytes: Bytes32) -> Self { Self(bytes) }

    /// Returns the raw chain value
    pub fn as_bytes(&self) -> &Bytes32 { &self.0 }

    /// Pointer after appending `action` at this pointer
    pub fn chain<A: Action>(&self, action: &A) -> Self {
        Self(compute_hash_chain(self.0, &action.action_bytes()))
    }
}

impl Default for ActionsHash {
    fn default() -> Self { Self::initial() }
}

impl fmt::Display for ActionsHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&hex::encode(self.0)) }
}

impl fmt::Debug for ActionsHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionsHash({})", hex::encode(self.0))
    }
}

impl FromStr for ActionsHash {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| ConfigError::Parse(format!("actions hash: {e}")))?;
        let bytes: Bytes32 = bytes.try_into().map_err(|bytes: Vec<u8>| {
            ConfigError::Parse(format!("actions hash: expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for ActionsHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for ActionsHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        encoded.parse().map_err(serde::de::Error::custom)
    }
}

/// One logged action with the pointers on either side of it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry<A> {
    previous: ActionsHash,
    action: A,
    pointer: ActionsHash,
}

impl<A> LogEntry<A> {
    /// Chain value immediately before this entry was appended
    pub fn previous(&self) -> ActionsHash { self.previous }

    /// The logged action
    pub fn action(&self) -> &A { &self.action }

    /// Chain value immediately after this entry was appended
    pub fn pointer(&self) -> ActionsHash { self.pointer }
}

/// Append-only, hash-chained log of actions
#[derive(Clone, Debug)]
pub struct ActionLog<A> {
    entries: Vec<LogEntry<A>>,
    /// Pointer -> number of entries up to and including it
    positions: BTreeMap<ActionsHash, usize>,
    head: ActionsHash,
}

impl<A: Action> ActionLog<A> {
    /// Creates an empty log at [`ActionsHash::initial`]
    pub fn new() -> Self {
        let head = ActionsHash::initial();
        Self { entries: Vec::new(), positions: BTreeMap::from([(head, 0)]), head }
    }

    /// Current chain pointer ("action state")
    pub fn head(&self) -> ActionsHash { self.head }

    /// Number of entries ever appended
    pub fn len(&self) -> usize { self.entries.len() }

    /// Returns `true` if nothing has been appended
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// All entries in append order
    pub fn entries(&self) -> &[LogEntry<A>] { &self.entries }

    /// Returns `true` if `pointer` was produced by this log
    pub fn contains_pointer(&self, pointer: &ActionsHash) -> bool {
        self.positions.contains_key(pointer)
    }

    /// Appends `action` and returns the new head
    ///
    /// # Examples
    ///
    /// ```rust
    /// use merkle_guardian::accumulator::{ActionLog, ActionsHash};
    /// use merkle_guardian::member::Member;
    ///
    /// let mut log = ActionLog::new();
    /// let pointer = log.append(Member::empty());
    ///
    /// assert_eq!(pointer, log.head());
    /// assert_eq!(pointer, ActionsHash::initial().chain(&Member::empty()));
    /// assert_eq!(log.len(), 1);
    /// ```
    pub fn append(&mut self, action: A) -> ActionsHash {
        let previous = self.head;
        let pointer = previous.chain(&action);
        self.entries.push(LogEntry { previous, action, pointer });
        // A repeated chain value would need a SHA-256 collision; keep the first position.
        self.positions.entry(pointer).or_insert(self.entries.len());
        self.head = pointer;
        pointer
    }

    /// Entries appended after `pointer`, in append order
    ///
    /// # Errors
    /// * `Err(Error::Accumulator(AccumulatorError::UnknownPointer))` - If `pointer` was not
    ///   produced by this log
    pub fn actions_since(&self, pointer: &ActionsHash) -> Result<&[LogEntry<A>]> {
        let start = self
            .positions
            .get(pointer)
            .copied()
            .ok_or(AccumulatorError::UnknownPointer(*pointer))?;
        Ok(&self.entries[start..])
    }
}

impl<A: Action> Default for ActionLog<A> {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Note(&'static str);

    impl Action for Note {
        fn action_bytes(&self) -> Vec<u8> { self.0.as_bytes().to_vec() }
    }

    #[test]
    fn test_new() {
        let log: ActionLog<Note> = ActionLog::new();

        assert!(log.is_empty());
        assert_eq!(log.head(), ActionsHash::initial());
        assert!(log.contains_pointer(&ActionsHash::initial()));
    }

    #[test]
    fn test_append_chains_pointers() {
        let mut log = ActionLog::new();

        let first = log.append(Note("a"));
        let second = log.append(Note("b"));

        assert_eq!(first, ActionsHash::initial().chain(&Note("a")));
        assert_eq!(second, first.chain(&Note("b")));
        assert_eq!(log.head(), second);
        assert_eq!(log.entries()[1].previous(), first);
        assert_eq!(log.entries()[1].pointer(), second);
        assert_eq!(log.entries()[1].action(), &Note("b"));
    }

    #[test]
    fn test_actions_since() {
        let mut log = ActionLog::new();
        let first = log.append(Note("a"));
        log.append(Note("b"));
        let last = log.append(Note("c"));

        let from_start = log.actions_since(&ActionsHash::initial()).expect("known");
        let after_first = log.actions_since(&first).expect("known");
        let after_last = log.actions_since(&last).expect("known");

        assert_eq!(from_start.len(), 3);
        let names: Vec<_> = after_first.iter().map(|entry| entry.action().0).collect();
        assert_eq!(names, vec!["b", "c"]);
        assert!(after_last.is_empty());
    }

    #[test]
    fn test_actions_since_unknown_pointer() {
        let log: ActionLog<Note> = ActionLog::new();
        let unknown = ActionsHash::from_bytes([5u8; 32]);

        let result = log.actions_since(&unknown);

        assert_eq!(
            result.map(|entries| entries.len()),
            Err(crate::Error::Accumulator(AccumulatorError::UnknownPointer(unknown)))
        );
    }

    #[test]
    fn test_actions_hash_text() {
        let pointer = ActionsHash::initial();

        let parsed: ActionsHash = pointer.to_string().parse().expect("valid hex");
        let json = serde_json::to_string(&pointer).expect("serializes");
        let decoded: ActionsHash = serde_json::from_str(&json).expect("deserializes");

        assert_eq!(parsed, pointer);
        assert_eq!(decoded, pointer);
        assert!("abcd".parse::<ActionsHash>().is_err());
    }
}
