//! Member records and identities
//!
//! - `key`: Account public identity ([`PublicKey`])
//! - `record`: The accumulated unit ([`Member`])
//! - `allocator`: Registration counter ([`AccountIdAllocator`])

mod allocator;
mod key;
mod record;

pub use allocator::AccountIdAllocator;
pub use key::PublicKey;
pub use record::Member;
