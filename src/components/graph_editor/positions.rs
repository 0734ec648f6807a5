//! Per-node world positions.
//!
//! The logical position changes immediately on every write. Animated writes
//! only delay the *rendered* position, which [`PositionStore::tick`] eases
//! toward the logical one.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::types::{NodeId, Point};

/// Below this distance an animated node snaps onto its target.
const SNAP_DISTANCE: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
	Animated,
	Immediate,
}

/// Persisted layout: node name -> world position.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedLayout {
	pub positions: BTreeMap<String, (f64, f64)>,
}

impl SavedLayout {
	pub fn get(&self, node: &NodeId) -> Option<Point> {
		self.positions.get(node.as_str()).map(|&(x, y)| Point::new(x, y))
	}
}

#[derive(Clone, Copy, Debug)]
struct NodeMotion {
	target: Point,
	rendered: Point,
}

#[derive(Clone, Debug)]
pub struct PositionStore {
	entries: HashMap<NodeId, NodeMotion>,
	animate: bool,
	speed: f64,
}

impl PositionStore {
	pub fn new(animate: bool, speed: f64) -> Self {
		Self {
			entries: HashMap::new(),
			animate,
			speed,
		}
	}

	pub fn animate(&self) -> bool {
		self.animate
	}

	pub fn set_animate(&mut self, animate: bool) {
		self.animate = animate;
	}

	/// Writes `position` using the store's current transition mode.
	///
	/// A node's first position is always applied immediately.
	pub fn set(&mut self, node: &NodeId, position: Point) -> Transition {
		let transition = if self.animate {
			Transition::Animated
		} else {
			Transition::Immediate
		};
		self.set_with(node, position, transition)
	}

	pub fn set_with(&mut self, node: &NodeId, position: Point, transition: Transition) -> Transition {
		match self.entries.get_mut(node) {
			Some(motion) => {
				motion.target = position;
				if transition == Transition::Immediate {
					motion.rendered = position;
				}
				transition
			}
			None => {
				self.entries.insert(
					node.clone(),
					NodeMotion {
						target: position,
						rendered: position,
					},
				);
				Transition::Immediate
			}
		}
	}

	/// Logical position.
	pub fn get(&self, node: &NodeId) -> Option<Point> {
		self.entries.get(node).map(|m| m.target)
	}

	/// Position to draw this frame; lags [`get`](Self::get) while animating.
	pub fn rendered(&self, node: &NodeId) -> Option<Point> {
		self.entries.get(node).map(|m| m.rendered)
	}

	pub fn remove(&mut self, node: &NodeId) -> Option<Point> {
		self.entries.remove(node).map(|m| m.target)
	}

	pub fn contains(&self, node: &NodeId) -> bool {
		self.entries.contains_key(node)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn is_animating(&self) -> bool {
		self.entries.values().any(|m| m.target != m.rendered)
	}

	/// Advances animated nodes by `dt` seconds. Returns whether any node is still moving.
	pub fn tick(&mut self, dt: f64) -> bool {
		let step = (self.speed * dt).clamp(0.0, 1.0);
		let mut moving = false;
		for motion in self.entries.values_mut() {
			if motion.target == motion.rendered {
				continue;
			}
			motion.rendered.x += (motion.target.x - motion.rendered.x) * step;
			motion.rendered.y += (motion.target.y - motion.rendered.y) * step;
			if motion.rendered.distance(motion.target) < SNAP_DISTANCE {
				motion.rendered = motion.target;
			} else {
				moving = true;
			}
		}
		moving
	}

	pub fn snapshot(&self) -> SavedLayout {
		SavedLayout {
			positions: self
				.entries
				.iter()
				.map(|(node, m)| (node.0.clone(), (m.target.x, m.target.y)))
				.collect(),
		}
	}
}
