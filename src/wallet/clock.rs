//! Logical time source

use std::sync::atomic::{AtomicU32, Ordering};

use crate::types::Slot;

/// Source of the current slot (e.g. ledger height since genesis)
///
/// Wallet operations only compare the slot against configured bounds and the
/// value the caller observed.
pub trait SlotClock: Send + Sync {
    /// Current slot
    fn current_slot(&self) -> Slot;
}

/// Clock driven by hand, for hosts that track slots themselves and for tests
#[derive(Debug, Default)]
pub struct ManualClock {
    slot: AtomicU32,
}

impl ManualClock {
    /// Creates a clock at `slot`
    pub fn new(slot: Slot) -> Self { Self { slot: AtomicU32::new(slot) } }

    /// Moves the clock to `slot`
    pub fn set(&self, slot: Slot) { self.slot.store(slot, Ordering::SeqCst); }

    /// Advances the clock by `slots`, saturating at the last slot, and returns the new slot
    pub fn advance(&self, slots: Slot) -> Slot {
        let previous = self
            .slot
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |slot| Some(slot.saturating_add(slots)))
            .unwrap_or_else(|slot| slot);
        previous.saturating_add(slots)
    }
}

impl SlotClock for ManualClock {
    fn current_slot(&self) -> Slot { self.slot.load(Ordering::SeqCst) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MAX_SLOT;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(5);

        let advanced = clock.advance(3);
        clock.set(2);

        assert_eq!(advanced, 8);
        assert_eq!(clock.current_slot(), 2);
    }

    #[test]
    fn test_advance_saturates() {
        let clock = ManualClock::new(MAX_SLOT - 1);

        let advanced = clock.advance(10);

        assert_eq!(advanced, MAX_SLOT);
        assert_eq!(clock.current_slot(), MAX_SLOT);
    }
}
