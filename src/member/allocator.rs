//! Account identity allocation

use super::key::PublicKey;
use super::record::Member;
use crate::errors::MemberError;
use crate::types::AccountId;
use crate::Result;

/// Hands out account ids from a monotonically increasing counter
///
/// Id `0` is reserved for the sentinel, so the first allocated id is `1`.
/// Each registry host owns its own allocator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountIdAllocator {
    last: AccountId,
}

impl AccountIdAllocator {
    /// Creates an allocator that has handed out no ids yet
    pub fn new() -> Self { Self::default() }

    /// Resumes from the last id handed out (e.g. after a restart)
    pub fn resume_from(last: AccountId) -> Self { Self { last } }

    /// Last id handed out, `0` if none
    pub fn last(&self) -> AccountId { self.last }

    /// Allocates the next id
    ///
    /// # Errors
    /// * `Err(Error::Member(MemberError::AccountIdsExhausted))` - If `u64::MAX` was already
    ///   handed out
    pub fn next_id(&mut self) -> Result<AccountId> {
        self.last = self.last.checked_add(1).ok_or(MemberError::AccountIdsExhausted(self.last))?;
        Ok(self.last)
    }

    /// Creates a member for `public_key` with a freshly allocated id
    ///
    /// # Examples
    ///
    /// ```rust
    /// use merkle_guardian::member::{AccountIdAllocator, PublicKey};
    ///
    /// let mut allocator = AccountIdAllocator::new();
    /// let first = allocator.member_for(PublicKey::from_bytes([1u8; 32]))?;
    /// let second = allocator.member_for(PublicKey::from_bytes([2u8; 32]))?;
    /// assert_eq!((first.account_id, second.account_id), (1, 2));
    /// # Ok::<(), merkle_guardian::Error>(())
    /// ```
    pub fn member_for(&mut self, public_key: PublicKey) -> Result<Member> {
        Ok(Member::new(self.next_id()?, public_key))
    }
}
