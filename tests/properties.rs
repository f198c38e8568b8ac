//! Property tests for the registry publish cycle

use std::collections::BTreeSet;

use merkle_guardian::guardian::GuardianRegistry;
use merkle_guardian::member::{Member, PublicKey};
use merkle_guardian::merkle::{compute_root, MemoryLeafStore, WitnessProvider};
use proptest::prelude::*;

fn key(byte: u8) -> PublicKey { PublicKey::from_bytes([byte; 32]) }

/// One registration batch: distinct leaf positions, and which of them get a repeat registration
fn batch() -> impl Strategy<Value = Vec<(u8, bool)>> {
    proptest::collection::btree_map(0u8..64, any::<bool>(), 1..6)
        .prop_map(|entries| entries.into_iter().collect())
}

/// Writes `member` into `store` at `index` and returns it carrying the witness
fn place(store: &mut MemoryLeafStore, index: u64, member: Member) -> Member {
    let witness = store.witness(index).expect("in range");
    store.set_leaf(index, member.hash()).expect("in range");
    member.with_membership_witness(witness)
}

proptest! {
    #[test]
    fn test_publish_matches_direct_fold(batches in proptest::collection::vec(batch(), 1..4)) {
        let admin = key(0xAD);
        let mut registry = GuardianRegistry::new(admin);
        let mut store = MemoryLeafStore::new();
        let mut used = BTreeSet::new();
        let mut published = Vec::new();

        for batch in batches {
            let mut expected = registry.committed_guardians();
            let mut real = 0;
            for (slot, repeat) in batch {
                if !used.insert(slot) {
                    continue;
                }
                let index = u64::from(slot);
                let member = place(&mut store, index, Member::new(index + 1, key(slot + 1)));
                prop_assert!(!registry.register(&member, &admin, &registry.snapshot()).expect("fresh"));
                if repeat {
                    prop_assert!(registry.register(&member, &admin, &registry.snapshot()).expect("fresh"));
                }
                expected = compute_root(member.hash(), &member.membership_witness).expect("length");
                real += 1;
                published.push(member);
            }
            let before = registry.accumulated_guardians();

            let receipt = registry.publish(&registry.snapshot()).expect("fresh");

            prop_assert_eq!(receipt.root, expected);
            prop_assert_eq!(receipt.root, store.root());
            prop_assert_eq!(receipt.applied, real);
            prop_assert_eq!(registry.accumulated_guardians(), registry.action_state());
            prop_assert!(receipt.visited == 0 || receipt.pointer != before);
        }

        let root = registry.committed_guardians();
        for member in &published {
            let index = member.membership_witness.leaf_index();
            let current = store.witness(index).expect("in range");
            let refreshed = member.clone().with_membership_witness(current);
            prop_assert!(registry.is_member(&refreshed, &root).expect("fresh root"));
        }
    }

    #[test]
    fn test_republish_is_a_noop(count in 1usize..8) {
        let admin = key(0xAD);
        let mut registry = GuardianRegistry::new(admin);
        let mut store = MemoryLeafStore::new();
        for n in 0..count {
            let member = place(&mut store, n as u64, Member::new(n as u64 + 1, key(n as u8 + 1)));
            registry.register(&member, &admin, &registry.snapshot()).expect("fresh");
        }
        let first = registry.publish(&registry.snapshot()).expect("fresh");

        let second = registry.publish(&registry.snapshot()).expect("fresh");

        prop_assert_eq!(first.visited, count);
        prop_assert_eq!(second.visited, 0);
        prop_assert_eq!(second.pointer, first.pointer);
        prop_assert_eq!(second.root, first.root);
    }

    #[test]
    fn test_historical_root_reproducible(count in 1usize..8) {
        let admin = key(0xAD);
        let mut registry = GuardianRegistry::new(admin);
        let mut store = MemoryLeafStore::new();
        let first = place(&mut store, 0, Member::new(1, key(1)));
        registry.register(&first, &admin, &registry.snapshot()).expect("fresh");
        let historical = registry.publish(&registry.snapshot()).expect("fresh").root;

        for n in 1..count {
            let member = place(&mut store, n as u64, Member::new(n as u64 + 1, key(n as u8 + 1)));
            registry.register(&member, &admin, &registry.snapshot()).expect("fresh");
            registry.publish(&registry.snapshot()).expect("fresh");
        }

        prop_assert_eq!(compute_root(first.hash(), &first.membership_witness).expect("length"), historical);
    }
}
