//! Recovery window
//!
//! Guardians may only be enrolled up to the start of recovery, and votes may
//! only be cast while the slot lies inside `[start, end]`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{ConfigError, PreconditionError};
use crate::types::{Slot, MAX_SLOT};
use crate::Result;

/// Closed slot window `[start, end]` gating wallet operations
///
/// The default window `[0, MAX_SLOT]` is always open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRecoveryWindow")]
pub struct RecoveryPreconditions {
    start_recovery: Slot,
    end_recovery: Slot,
}

#[derive(Deserialize)]
struct RawRecoveryWindow {
    #[serde(default)]
    start_recovery: Slot,
    #[serde(default = "max_slot")]
    end_recovery: Slot,
}

fn max_slot() -> Slot { MAX_SLOT }

impl TryFrom<RawRecoveryWindow> for RecoveryPreconditions {
    type Error = crate::Error;

    fn try_from(raw: RawRecoveryWindow) -> Result<Self> {
        Self::new(raw.start_recovery, raw.end_recovery)
    }
}

impl RecoveryPreconditions {
    /// Creates a window
    ///
    /// # Errors
    /// * `Err(Error::Config(ConfigError::InvalidRecoveryWindow))` - If `start > end`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use merkle_guardian::wallet::RecoveryPreconditions;
    ///
    /// let window = RecoveryPreconditions::new(10, 20)?;
    /// assert!(window.allows_enrollment(10));
    /// assert!(!window.allows_enrollment(11));
    /// assert!(window.contains(20));
    /// assert!(RecoveryPreconditions::new(20, 10).is_err());
    /// # Ok::<(), merkle_guardian::Error>(())
    /// ```
    pub fn new(start_recovery: Slot, end_recovery: Slot) -> Result<Self> {
        if start_recovery > end_recovery {
            return Err(ConfigError::InvalidRecoveryWindow {
                start: start_recovery,
                end: end_recovery,
            }
            .into());
        }
        Ok(Self { start_recovery, end_recovery })
    }

    /// The always-open window `[0, MAX_SLOT]`
    pub const fn always_open() -> Self { Self { start_recovery: 0, end_recovery: MAX_SLOT } }

    /// First slot of recovery
    pub fn start_recovery(&self) -> Slot { self.start_recovery }

    /// Last slot of recovery
    pub fn end_recovery(&self) -> Slot { self.end_recovery }

    /// Guardians may be enrolled up to and including the start of recovery
    pub fn allows_enrollment(&self, slot: Slot) -> bool { slot <= self.start_recovery }

    /// Returns `true` if `slot` lies in `[start, end]`
    pub fn contains(&self, slot: Slot) -> bool {
        self.start_recovery <= slot && slot <= self.end_recovery
    }

    /// Fails with `OutsideWindow` (reporting `[0, start]`) unless enrollment is open
    pub fn ensure_enrollment_open(&self, slot: Slot) -> Result<()> {
        if !self.allows_enrollment(slot) {
            warn!(slot, start = self.start_recovery, "enrollment closed");
            return Err(
                PreconditionError::OutsideWindow { slot, start: 0, end: self.start_recovery }.into()
            );
        }
        Ok(())
    }

    /// Fails with `OutsideWindow` unless `slot` lies in the recovery window
    pub fn ensure_recovery_open(&self, slot: Slot) -> Result<()> {
        if !self.contains(slot) {
            warn!(slot, start = self.start_recovery, end = self.end_recovery, "recovery closed");
            return Err(PreconditionError::OutsideWindow {
                slot,
                start: self.start_recovery,
                end: self.end_recovery,
            }
            .into());
        }
        Ok(())
    }
}

impl Default for RecoveryPreconditions {
    fn default() -> Self { Self::always_open() }
}
