//! Action accumulator
//!
//! - `log`: Append-only hash-chained log ([`ActionLog`], [`ActionsHash`])
//! - `reducer`: Sequential fold over the pending tail ([`Folded`])
//! - `commitment`: Committed root with its pending log ([`Accumulator`])

mod commitment;
mod log;
mod reducer;

pub use commitment::{Accumulator, CommitmentPair, PublishReceipt, Snapshot, TrackedSet};
pub use log::{Action, ActionLog, ActionsHash, LogEntry};
pub use reducer::{pending_contains, pending_root, Folded, RootFold};
