//! Cache layer for witness providers
//!
//! Wraps a witness provider with a sharded, concurrent cache (quick-cache,
//! S3-FIFO eviction) so repeated membership checks against an unchanged tree
//! do not recompute the same paths.

use std::sync::Arc;

use quick_cache::sync::Cache;

use super::store::WitnessProvider;
use super::witness::Witness;
use crate::Result;

/// Cached witness provider
///
/// Cached witnesses are only valid for the tree they were computed against.
/// Call [`CachedWitnessProvider::clear_cache`] after any leaf changes.
///
/// # Example
///
/// ```rust
/// use merkle_guardian::merkle::{CachedWitnessProvider, MemoryLeafStore, WitnessProvider};
///
/// let mut store = MemoryLeafStore::new();
/// store.set_leaf(1, [1u8; 32])?;
/// let mut cached = CachedWitnessProvider::new(store, 64);
///
/// let first = cached.witness(1)?;
/// assert_eq!(cached.witness(1)?, first);
/// # Ok::<(), merkle_guardian::Error>(())
/// ```
pub struct CachedWitnessProvider<P> {
    provider: P,
    cache: Arc<Cache<u64, Witness>>,
}

impl<P> CachedWitnessProvider<P> {
    /// Creates a new cached witness provider
    ///
    /// # Arguments
    /// * `provider` - The underlying provider to wrap
    /// * `capacity` - Maximum number of entries in the cache (approximately)
    pub fn new(provider: P, capacity: usize) -> Self {
        Self { provider, cache: Arc::new(Cache::new(capacity.max(1))) }
    }

    /// Clears the cache
    pub fn clear_cache(&mut self) { self.cache.clear(); }

    /// Gives mutable access to the wrapped provider and clears the cache
    ///
    /// Mutating the underlying leaves invalidates every cached path, so the
    /// cache is dropped before the provider is handed out.
    pub fn provider_mut(&mut self) -> &mut P {
        self.cache.clear();
        &mut self.provider
    }

    /// Returns the wrapped provider
    pub fn provider(&self) -> &P { &self.provider }
}

impl<P: WitnessProvider> WitnessProvider for CachedWitnessProvider<P> {
    fn witness(&mut self, index: u64) -> Result<Witness> {
        if let Some(cached) = self.cache.get(&index) {
            return Ok(cached);
        }

        let witness = self.provider.witness(index)?;

        self.cache.insert(index, witness.clone());

        Ok(witness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::MemoryLeafStore;

    struct CountingProvider {
        calls: usize,
    }

    impl WitnessProvider for CountingProvider {
        fn witness(&mut self, _index: u64) -> Result<Witness> {
            self.calls += 1;
            Ok(Witness::empty())
        }
    }

    #[test]
    fn test_new() {
        let cached = CachedWitnessProvider::new(CountingProvider { calls: 0 }, 0);

        assert_eq!(cached.cache.capacity(), 1);

        let cached = CachedWitnessProvider::new(CountingProvider { calls: 0 }, 10);

        assert_eq!(cached.cache.capacity(), 10);
    }

    #[test]
    fn test_witness_is_cached() {
        let mut cached = CachedWitnessProvider::new(CountingProvider { calls: 0 }, 10);

        let first = cached.witness(4).expect("provider succeeds");
        let second = cached.witness(4).expect("provider succeeds");

        assert_eq!(first, second);
        assert_eq!(cached.provider().calls, 1);
    }

    #[test]
    fn test_clear_cache() {
        let mut cached = CachedWitnessProvider::new(CountingProvider { calls: 0 }, 10);
        let _ = cached.witness(4).expect("provider succeeds");
        assert!(cached.cache.get(&4).is_some());

        cached.clear_cache();

        assert!(cached.cache.get(&4).is_none());
    }

    #[test]
    fn test_provider_mut_invalidates() {
        let mut store = MemoryLeafStore::new();
        store.set_leaf(0, [1u8; 32]).expect("in range");
        let mut cached = CachedWitnessProvider::new(store, 10);
        let stale = cached.witness(1).expect("in range");

        cached.provider_mut().set_leaf(0, [2u8; 32]).expect("in range");
        let fresh = cached.witness(1).expect("in range");

        assert_ne!(stale, fresh);
        assert_eq!(fresh.compute_root([0u8; 32]).expect("length"), cached.provider().root());
    }
}
