//! Guardian registry
//!
//! - `registry`: Registration, membership query and publish ([`GuardianRegistry`])
//! - `query`: Read-only capability for other registries ([`MembershipQuery`])

mod query;
mod registry;

pub use query::{MembershipQuery, SharedGuardianRegistry};
pub use registry::GuardianRegistry;
