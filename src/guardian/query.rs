//! Read-only membership capability and a shareable registry handle

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::registry::GuardianRegistry;
use crate::accumulator::{PublishReceipt, Snapshot};
use crate::errors::Error;
use crate::member::{Member, PublicKey};
use crate::merkle::{GuardianTreeV0Config, NodeHasher, Poseidon2Hasher, TreeConfig};
use crate::{Bytes32, Result};

/// Cross-registry membership query
///
/// A wallet holds one of these instead of the registry itself: it can ask
/// whether a member is committed, never mutate the registry.
pub trait MembershipQuery: Send + Sync {
    /// Current committed root of the queried set
    fn committed_root(&self) -> Result<Bytes32>;

    /// Checks `member`'s witness against the committed root the caller observed
    fn is_member(&self, member: &Member, observed_root: &Bytes32) -> Result<bool>;
}

impl<H, C> MembershipQuery for GuardianRegistry<H, C>
where
    H: NodeHasher + Send + Sync,
    C: TreeConfig + Send + Sync,
{
    fn committed_root(&self) -> Result<Bytes32> { Ok(self.committed_guardians()) }

    fn is_member(&self, member: &Member, observed_root: &Bytes32) -> Result<bool> {
        GuardianRegistry::is_member(self, member, observed_root)
    }
}

/// Guardian registry behind a shared lock
///
/// Each call takes the lock for its whole duration, so operations apply
/// atomically and in sequence.
pub struct SharedGuardianRegistry<H = Poseidon2Hasher, C = GuardianTreeV0Config> {
    inner: Arc<RwLock<GuardianRegistry<H, C>>>,
}

impl<H, C> Clone for SharedGuardianRegistry<H, C> {
    fn clone(&self) -> Self { Self { inner: Arc::clone(&self.inner) } }
}

impl<H: NodeHasher, C: TreeConfig> SharedGuardianRegistry<H, C> {
    /// Wraps a registry
    pub fn new(registry: GuardianRegistry<H, C>) -> Self {
        Self { inner: Arc::new(RwLock::new(registry)) }
    }

    /// Read access to the registry
    pub fn read(&self) -> Result<RwLockReadGuard<'_, GuardianRegistry<H, C>>> {
        self.inner.read().map_err(|_| Error::Internal("guardian registry lock poisoned".into()))
    }

    /// Write access to the registry
    pub fn write(&self) -> Result<RwLockWriteGuard<'_, GuardianRegistry<H, C>>> {
        self.inner.write().map_err(|_| Error::Internal("guardian registry lock poisoned".into()))
    }

    /// Current state for callers to observe and re-assert
    pub fn snapshot(&self) -> Result<Snapshot> { Ok(self.read()?.snapshot()) }

    /// See [`GuardianRegistry::register`]
    pub fn register(&self, member: &Member, caller: &PublicKey, observed: &Snapshot) -> Result<bool> {
        self.write()?.register(member, caller, observed)
    }

    /// See [`GuardianRegistry::publish`]
    pub fn publish(&self, observed: &Snapshot) -> Result<PublishReceipt> {
        self.write()?.publish(observed)
    }
}

impl<H, C> MembershipQuery for SharedGuardianRegistry<H, C>
where
    H: NodeHasher + Send + Sync,
    C: TreeConfig + Send + Sync,
{
    fn committed_root(&self) -> Result<Bytes32> { Ok(self.read()?.committed_guardians()) }

    fn is_member(&self, member: &Member, observed_root: &Bytes32) -> Result<bool> {
        self.read()?.is_member(member, observed_root)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::errors::{PreconditionError, StateField};
    use crate::merkle::MemoryLeafStore;
    use crate::test_utils::{enroll, key};

    #[test]
    fn test_shared_registry_query() {
        let shared = SharedGuardianRegistry::new(GuardianRegistry::new(key(0xAD)));
        let mut store = MemoryLeafStore::new();
        let member = enroll(&mut store, Member::new(1, key(1)));
        shared.register(&member, &key(0xAD), &shared.snapshot().expect("lock")).expect("fresh");
        shared.publish(&shared.snapshot().expect("lock")).expect("fresh");

        let query: Arc<dyn MembershipQuery> = Arc::new(shared.clone());
        let root = query.committed_root().expect("lock");

        assert_eq!(root, store.root());
        assert_eq!(query.is_member(&member, &root), Ok(true));
    }

    #[test]
    fn test_concurrent_registrations_serialize() {
        let shared = SharedGuardianRegistry::new(GuardianRegistry::new(key(0xAD)));
        let observed = shared.snapshot().expect("lock");

        let handles: Vec<_> = (1..=4u8)
            .map(|n| {
                let shared = shared.clone();
                thread::spawn(move || {
                    shared.register(&Member::new(n.into(), key(n)), &key(0xAD), &observed)
                })
            })
            .collect();
        let results: Vec<_> =
            handles.into_iter().map(|handle| handle.join().expect("thread")).collect();

        let accepted = results.iter().filter(|result| result.is_ok()).count();
        assert_eq!(accepted, 1);
        assert!(results.iter().filter(|result| result.is_err()).all(|result| {
            *result
                == Err(Error::Precondition(PreconditionError::StalePrecondition {
                    field: StateField::GuardianActionState,
                }))
        }));
        assert_eq!(shared.read().expect("lock").log().len(), 1);
    }
}
