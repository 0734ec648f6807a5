//! World-space edge endpoints.
//!
//! Position and pin writes only mark what they touch; [`EdgeAnchors::process`]
//! recomputes the affected edges before the next frame is drawn.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::graph::GraphModel;
use super::pins::PinRegistry;
use super::positions::PositionStore;
use super::types::{AttributeId, EdgeData, EdgeKey, NodeId, Point};

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedEdge {
	pub src_node: NodeId,
	pub dst_node: NodeId,
	pub src: Point,
	pub dst: Point,
}

#[derive(Clone, Debug, Default)]
pub struct EdgeAnchors {
	/// `None` marks an edge that must not be drawn.
	anchors: HashMap<EdgeKey, Option<ResolvedEdge>>,
	dirty_nodes: HashSet<NodeId>,
	dirty_attributes: HashSet<AttributeId>,
	rebuild: bool,
}

impl EdgeAnchors {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn mark_node(&mut self, node: &NodeId) {
		self.dirty_nodes.insert(node.clone());
	}

	pub fn mark_attribute(&mut self, attribute: &AttributeId) {
		self.dirty_attributes.insert(attribute.clone());
	}

	/// Forces every edge to be recomputed, dropping edges no longer in the graph.
	pub fn mark_all(&mut self) {
		self.rebuild = true;
	}

	pub fn is_dirty(&self) -> bool {
		self.rebuild || !self.dirty_nodes.is_empty() || !self.dirty_attributes.is_empty()
	}

	/// Recomputes dirty edges, returning how many were visited.
	pub fn process<G: GraphModel>(
		&mut self,
		graph: &G,
		pins: &PinRegistry,
		positions: &PositionStore,
	) -> usize {
		if !self.is_dirty() {
			return 0;
		}
		if self.rebuild {
			let live: HashSet<EdgeKey> = graph.edges().iter().map(EdgeData::key).collect();
			self.anchors.retain(|key, _| live.contains(key));
		}
		let mut visited = 0;
		for edge in graph.edges() {
			let key = edge.key();
			if !self.rebuild && self.anchors.contains_key(&key) && !self.touches_dirty(graph, edge) {
				continue;
			}
			let resolved = resolve(edge, pins, positions);
			if resolved.is_none() {
				debug!("edge {key} unresolved, not drawn");
			}
			self.anchors.insert(key, resolved);
			visited += 1;
		}
		self.rebuild = false;
		self.dirty_nodes.clear();
		self.dirty_attributes.clear();
		visited
	}

	fn touches_dirty<G: GraphModel>(&self, graph: &G, edge: &EdgeData) -> bool {
		[&edge.src, &edge.dst].into_iter().any(|attribute| {
			self.dirty_attributes.contains(attribute)
				|| graph
					.attribute_node(attribute)
					.is_some_and(|node| self.dirty_nodes.contains(node))
		})
	}

	pub fn get(&self, edge: &EdgeKey) -> Option<&ResolvedEdge> {
		self.anchors.get(edge).and_then(Option::as_ref)
	}

	/// Edges that can be drawn this frame.
	pub fn resolved(&self) -> impl Iterator<Item = (&EdgeKey, &ResolvedEdge)> {
		self.anchors
			.iter()
			.filter_map(|(key, anchor)| anchor.as_ref().map(|a| (key, a)))
	}

	pub fn clear(&mut self) {
		self.anchors.clear();
		self.dirty_nodes.clear();
		self.dirty_attributes.clear();
		self.rebuild = false;
	}
}

fn resolve(edge: &EdgeData, pins: &PinRegistry, positions: &PositionStore) -> Option<ResolvedEdge> {
	let src_pin = pins.resolve(&edge.src)?;
	let dst_pin = pins.resolve(&edge.dst)?;
	let src_origin = positions.get(&src_pin.node)?;
	let dst_origin = positions.get(&dst_pin.node)?;
	Some(ResolvedEdge {
		src_node: src_pin.node.clone(),
		dst_node: dst_pin.node.clone(),
		src: src_origin + src_pin.local_offset,
		dst: dst_origin + dst_pin.local_offset,
	})
}
