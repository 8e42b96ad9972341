use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;

use super::RuntimeRegistry;
use super::test_fixtures::{tag_of, tagged};

fn id_of(seed: u8) -> String {
	format!("h{}", seed % 6)
}

proptest! {
	/// After any sequence of extensions, each id resolves to the last handler
	/// written under it and ids never written stay absent.
	#[test]
	fn extend_sequence_visibility(
		batches in prop::collection::vec(prop::collection::vec((any::<u8>(), 0u32..1000), 0..5), 1..8)
	) {
		let mut registry = RuntimeRegistry::empty();
		let mut expected: BTreeMap<String, u32> = BTreeMap::new();

		for batch in batches {
			let handlers: Vec<_> = batch.iter().map(|(seed, tag)| tagged(&id_of(*seed), *tag)).collect();
			let previous = registry.clone();
			registry = registry.extend(handlers).unwrap();
			for (seed, tag) in batch {
				expected.insert(id_of(seed), tag);
			}

			// Nothing visible before disappears.
			for id in previous.handler_ids() {
				prop_assert!(registry.contains(id));
			}
		}

		prop_assert_eq!(registry.len(), expected.len());
		for (id, tag) in &expected {
			prop_assert_eq!(tag_of(&registry.lookup(id).unwrap()), u64::from(*tag));
		}
		for seed in 0..6u8 {
			let id = id_of(seed);
			prop_assert_eq!(registry.contains(&id), expected.contains_key(&id));
		}
	}

	/// Extending never alters the receiver, and handlers not named in the
	/// extension are carried over by reference.
	#[test]
	fn extend_is_non_destructive(
		initial in prop::collection::vec((any::<u8>(), 0u32..1000), 0..8),
		extra in (any::<u8>(), 0u32..1000),
	) {
		let base = RuntimeRegistry::create(
			initial.iter().map(|(seed, tag)| tagged(&id_of(*seed), *tag)),
		).unwrap();
		let before: Vec<(String, u64)> = base
			.handler_ids()
			.into_iter()
			.map(|id| (id.to_string(), tag_of(&base.lookup(id).unwrap())))
			.collect();

		let extra_id = id_of(extra.0);
		let extended = base.extend([tagged(&extra_id, extra.1)]).unwrap();

		let after: Vec<(String, u64)> = base
			.handler_ids()
			.into_iter()
			.map(|id| (id.to_string(), tag_of(&base.lookup(id).unwrap())))
			.collect();
		prop_assert_eq!(before, after);

		for id in base.handler_ids() {
			if id != extra_id {
				let old = base.get(id).unwrap();
				let new = extended.get(id).unwrap();
				prop_assert!(Arc::ptr_eq(old, new));
			}
		}
		prop_assert_eq!(tag_of(&extended.lookup(&extra_id).unwrap()), u64::from(extra.1));
	}
}
