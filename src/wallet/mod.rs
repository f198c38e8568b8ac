//! Recoverable wallet
//!
//! A wallet tracks its own guardians and the recovery votes they cast, each
//! as a committed root plus a pending action log. Guardians must already be
//! committed in an external guardian registry, and both enrollment and voting
//! are gated by the wallet's recovery window.
//!
//! # Structure
//!
//! The module is organized into functional domains:
//! - `state`: Wallet state and operations (Wallet)
//! - `preconditions`: Recovery window (RecoveryPreconditions)
//! - `clock`: Logical time source (SlotClock, ManualClock)
//! - `request`: Call inputs (CallContext, GuardianEnrollment, WalletSnapshot)

mod clock;
mod preconditions;
mod request;
mod state;

pub use clock::{ManualClock, SlotClock};
pub use preconditions::RecoveryPreconditions;
pub use request::{CallContext, GuardianEnrollment, WalletSnapshot};
pub use state::Wallet;
