use std::collections::HashMap;

use super::types::{AttributeId, NodeId, Point};

/// Where an edge attaches to an attribute, relative to the owning node's origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Pin {
	pub node: NodeId,
	pub local_offset: Point,
}

/// Non-owning attribute -> pin association.
///
/// Entries follow node widget lifetime: widgets register on mount and must
/// unregister before they are destroyed.
#[derive(Clone, Debug, Default)]
pub struct PinRegistry {
	pins: HashMap<AttributeId, Pin>,
}

impl PinRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `pin` for `attribute`, returning the entry it replaced.
	pub fn register(&mut self, attribute: AttributeId, pin: Pin) -> Option<Pin> {
		self.pins.insert(attribute, pin)
	}

	pub fn unregister(&mut self, attribute: &AttributeId) -> Option<Pin> {
		self.pins.remove(attribute)
	}

	/// Drops every pin owned by `node`.
	pub fn unregister_node(&mut self, node: &NodeId) -> Vec<(AttributeId, Pin)> {
		let ids: Vec<AttributeId> = self
			.pins
			.iter()
			.filter(|(_, pin)| &pin.node == node)
			.map(|(id, _)| id.clone())
			.collect();
		ids.into_iter()
			.filter_map(|id| self.pins.remove(&id).map(|pin| (id, pin)))
			.collect()
	}

	pub fn resolve(&self, attribute: &AttributeId) -> Option<&Pin> {
		self.pins.get(attribute)
	}

	pub fn len(&self) -> usize {
		self.pins.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pins.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use proptest::prelude::*;

	use super::*;

	fn pin(node: &str, y: f64) -> Pin {
		Pin {
			node: NodeId::new(node),
			local_offset: Point::new(0.0, y),
		}
	}

	#[test]
	fn register_overwrites() {
		let mut registry = PinRegistry::new();
		let id = AttributeId("A.input".into());
		assert!(registry.register(id.clone(), pin("A", 10.0)).is_none());
		assert_eq!(registry.register(id.clone(), pin("A", 20.0)), Some(pin("A", 10.0)));
		assert_eq!(registry.resolve(&id), Some(&pin("A", 20.0)));
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn unregister_then_resolve_is_not_found() {
		let mut registry = PinRegistry::new();
		let id = AttributeId("A.output".into());
		registry.register(id.clone(), pin("A", 0.0));
		assert!(registry.unregister(&id).is_some());
		assert!(registry.resolve(&id).is_none());
		assert!(registry.unregister(&id).is_none());
	}

	#[test]
	fn unregister_node_only_touches_that_node() {
		let mut registry = PinRegistry::new();
		registry.register(AttributeId("A.in".into()), pin("A", 0.0));
		registry.register(AttributeId("A.out".into()), pin("A", 5.0));
		registry.register(AttributeId("B.in".into()), pin("B", 0.0));
		let mut removed: Vec<_> = registry
			.unregister_node(&NodeId::new("A"))
			.into_iter()
			.map(|(id, _)| id.0)
			.collect();
		removed.sort();
		assert_eq!(removed, vec!["A.in".to_string(), "A.out".to_string()]);
		assert!(registry.resolve(&AttributeId("B.in".into())).is_some());
		assert_eq!(registry.len(), 1);
	}

	proptest! {
		#[test]
		fn resolve_matches_registration_state(ops in proptest::collection::vec((any::<bool>(), 0u8..6), 0..64)) {
			let mut registry = PinRegistry::new();
			let mut live = HashSet::new();
			for (register, slot) in ops {
				let id = AttributeId(format!("N.attr{slot}"));
				if register {
					registry.register(id.clone(), pin("N", slot as f64));
					live.insert(slot);
				} else {
					registry.unregister(&id);
					live.remove(&slot);
					prop_assert!(registry.resolve(&id).is_none());
				}
			}
			for slot in 0u8..6 {
				let id = AttributeId(format!("N.attr{slot}"));
				prop_assert_eq!(registry.resolve(&id).is_some(), live.contains(&slot));
			}
		}
	}
}
