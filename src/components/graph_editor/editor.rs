//! The graph editor view-model.
//!
//! [`GraphEditor`] binds a [`GraphModel`] to the viewport, the position store,
//! the pin registry and the edge anchors, and orchestrates selection,
//! duplication and layout. Graph changes are always delegated to the
//! [`GraphMutator`]; the editor only decides where things are drawn.

use std::collections::HashSet;

use log::{debug, info, warn};

use super::anchors::{EdgeAnchors, ResolvedEdge};
use super::error::{GraphEditorError, Result};
use super::events::{EditorEvent, EventQueue};
use super::graph::{GraphModel, GraphMutator};
use super::layout::{DepthPolicy, LayoutRequest, Placement, auto_layout};
use super::pins::{Pin, PinRegistry};
use super::positions::{PositionStore, SavedLayout, Transition};
use super::settings::EditorSettings;
use super::types::{AttributeId, EdgeKey, NodeId, Point, Rect};
use super::viewport::Viewport;
use super::widget;

#[derive(Clone, Debug)]
pub struct DragState {
	pub node: NodeId,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Point,
}

pub struct GraphEditor<G> {
	graph: G,
	settings: EditorSettings,
	pub viewport: Viewport,
	pins: PinRegistry,
	positions: PositionStore,
	anchors: EdgeAnchors,
	/// Nodes whose widget is constructed and whose pins are registered.
	mounted: HashSet<NodeId>,
	loaded: bool,
	pending_layout: Option<SavedLayout>,
	selected: Option<NodeId>,
	hovered: Option<NodeId>,
	focused: bool,
	drag: Option<DragState>,
	events: EventQueue,
}

impl<G: GraphModel + GraphMutator> GraphEditor<G> {
	pub fn new(graph: G, settings: EditorSettings) -> Self {
		Self {
			viewport: Viewport::new(&settings),
			positions: PositionStore::new(settings.animate, settings.animation_speed),
			graph,
			settings,
			pins: PinRegistry::new(),
			anchors: EdgeAnchors::new(),
			mounted: HashSet::new(),
			loaded: false,
			pending_layout: None,
			selected: None,
			hovered: None,
			focused: false,
			drag: None,
			events: EventQueue::default(),
		}
	}

	pub fn graph(&self) -> &G {
		&self.graph
	}

	pub fn settings(&self) -> &EditorSettings {
		&self.settings
	}

	pub fn pins(&self) -> &PinRegistry {
		&self.pins
	}

	pub fn positions(&self) -> &PositionStore {
		&self.positions
	}

	// Widget lifecycle

	/// Registers the pins of a freshly constructed node widget.
	pub fn mount_node(&mut self, name: &NodeId) -> Result<()> {
		let node = self
			.graph
			.node_by_name(name)
			.ok_or_else(|| GraphEditorError::UnknownNode(name.clone()))?;
		let pins = widget::pin_layout(node, &self.settings);
		self.mount_node_with(name, pins);
		Ok(())
	}

	/// Like [`mount_node`](Self::mount_node), for widgets that compute their own pins.
	pub fn mount_node_with(&mut self, name: &NodeId, pins: Vec<(AttributeId, Pin)>) {
		for (attribute, pin) in pins {
			self.anchors.mark_attribute(&attribute);
			self.pins.register(attribute, pin);
		}
		self.mounted.insert(name.clone());
		if self.loaded && !self.positions.contains(name) {
			self.fill_missing_positions();
		}
		self.check_loaded();
	}

	/// Unregisters a widget's pins; must run before the widget is destroyed.
	pub fn unmount_node(&mut self, name: &NodeId) {
		for (attribute, _) in self.pins.unregister_node(name) {
			self.anchors.mark_attribute(&attribute);
		}
		self.mounted.remove(name);
	}

	/// Mounts widgets for new nodes and unmounts widgets of vanished ones.
	pub fn sync_widgets(&mut self) -> usize {
		let stale: Vec<NodeId> = self
			.mounted
			.iter()
			.filter(|name| self.graph.node_by_name(name).is_none())
			.cloned()
			.collect();
		for name in &stale {
			self.unmount_node(name);
			self.positions.remove(name);
		}
		let fresh: Vec<NodeId> = self
			.graph
			.nodes()
			.iter()
			.filter(|n| !self.mounted.contains(&n.name))
			.map(|n| n.name.clone())
			.collect();
		if !stale.is_empty() {
			self.anchors.mark_all();
		}
		for name in &fresh {
			if let Err(err) = self.mount_node(name) {
				warn!("could not mount {name}: {err}");
			}
		}
		// an empty graph is loaded as soon as the view syncs
		self.check_loaded();
		stale.len() + fresh.len()
	}

	pub fn is_loaded(&self) -> bool {
		self.loaded
	}

	pub fn mounted_count(&self) -> usize {
		self.mounted.len()
	}

	fn check_loaded(&mut self) {
		if self.loaded || self.mounted.len() != self.graph.nodes().len() {
			return;
		}
		self.loaded = true;
		info!("{} node widgets loaded", self.mounted.len());
		match self.pending_layout.take() {
			Some(layout) => {
				self.apply_saved_layout(&layout);
			}
			None => {
				if let Err(err) = self.relayout() {
					warn!("initial layout failed: {err}");
				}
			}
		}
		self.anchors.mark_all();
	}

	// Edge anchors

	/// Recomputes dirty edge endpoints. Nothing resolves before every node widget is loaded.
	pub fn process_anchors(&mut self) -> usize {
		if !self.loaded {
			return 0;
		}
		self.anchors.process(&self.graph, &self.pins, &self.positions)
	}

	pub fn edge_endpoints(&self, edge: &EdgeKey) -> Option<&ResolvedEdge> {
		if !self.loaded {
			return None;
		}
		self.anchors.get(edge)
	}

	pub fn resolved_edges(&self) -> impl Iterator<Item = (&EdgeKey, &ResolvedEdge)> {
		self.anchors.resolved().filter(|_| self.loaded)
	}

	// Positions and layout

	fn write_position(&mut self, name: &NodeId, position: Point, transition: Option<Transition>) {
		match transition {
			Some(transition) => self.positions.set_with(name, position, transition),
			None => self.positions.set(name, position),
		};
		self.anchors.mark_node(name);
	}

	pub fn node_position(&self, name: &NodeId) -> Option<Point> {
		self.positions.get(name)
	}

	pub fn rendered_position(&self, name: &NodeId) -> Option<Point> {
		self.positions.rendered(name)
	}

	pub fn depth_policy(&self) -> DepthPolicy {
		DepthPolicy::from_use_min_depth(self.settings.use_min_depth)
	}

	/// Lays out nodes `range` (inclusive, whole graph when `None`) from `origin`.
	pub fn auto_layout(&mut self, range: Option<(usize, usize)>, origin: Point) -> Result<Vec<Placement>> {
		let request = LayoutRequest {
			range,
			origin,
			policy: self.depth_policy(),
		};
		let placements = auto_layout(self.graph.nodes(), &request, &self.settings)?;
		for placement in &placements {
			self.write_position(&placement.node, placement.position, None);
		}
		Ok(placements)
	}

	pub fn relayout(&mut self) -> Result<usize> {
		let placements = self.auto_layout(None, Point::ZERO)?;
		info!("auto layout placed {} nodes", placements.len());
		Ok(placements.len())
	}

	pub fn use_min_depth(&self) -> bool {
		self.settings.use_min_depth
	}

	pub fn set_use_min_depth(&mut self, use_min_depth: bool) {
		if self.settings.use_min_depth == use_min_depth {
			return;
		}
		self.settings.use_min_depth = use_min_depth;
		if self.loaded {
			if let Err(err) = self.relayout() {
				warn!("layout after depth policy change failed: {err}");
			}
		}
	}

	/// Gives every node without a position its slot in a full layout.
	fn fill_missing_positions(&mut self) {
		let request = LayoutRequest::full(self.depth_policy());
		let placements = match auto_layout(self.graph.nodes(), &request, &self.settings) {
			Ok(placements) => placements,
			Err(err) => {
				warn!("could not place new nodes: {err}");
				return;
			}
		};
		for placement in placements {
			if !self.positions.contains(&placement.node) {
				debug!("placing {} at {:?}", placement.node, placement.position);
				self.write_position(&placement.node, placement.position, Some(Transition::Immediate));
			}
		}
	}

	/// Restores saved positions without running the auto layout. Before the
	/// widgets are loaded the layout is kept and replaces the initial layout.
	pub fn hydrate(&mut self, layout: SavedLayout) -> usize {
		if !self.loaded {
			debug!("deferring saved layout of {} nodes", layout.positions.len());
			let count = layout.positions.len();
			self.pending_layout = Some(layout);
			return count;
		}
		self.apply_saved_layout(&layout)
	}

	fn apply_saved_layout(&mut self, layout: &SavedLayout) -> usize {
		let known: Vec<(NodeId, Point)> = self
			.graph
			.nodes()
			.iter()
			.filter_map(|n| layout.get(&n.name).map(|p| (n.name.clone(), p)))
			.collect();
		for (name, position) in &known {
			self.write_position(name, *position, Some(Transition::Immediate));
		}
		let ignored = layout.positions.len() - known.len();
		if ignored > 0 {
			debug!("ignored {ignored} saved positions of unknown nodes");
		}
		self.fill_missing_positions();
		info!("restored {} node positions", known.len());
		known.len()
	}

	pub fn save_layout(&self) -> SavedLayout {
		self.positions.snapshot()
	}

	/// Places a node immediately, without animation, and selects it.
	pub fn move_node(&mut self, name: &NodeId, position: Point) -> Result<()> {
		if self.graph.node_by_name(name).is_none() {
			return Err(GraphEditorError::UnknownNode(name.clone()));
		}
		let animate = self.positions.animate();
		self.positions.set_animate(false);
		self.write_position(name, position, None);
		self.positions.set_animate(animate);
		self.select(name)
	}

	/// Advances position animations; returns whether anything is still moving.
	pub fn tick(&mut self, dt: f64) -> bool {
		self.positions.tick(dt)
	}

	// Selection

	pub fn selected(&self) -> Option<&NodeId> {
		self.selected.as_ref()
	}

	pub fn has_focus(&self) -> bool {
		self.focused
	}

	pub fn select(&mut self, name: &NodeId) -> Result<()> {
		if self.graph.node_by_name(name).is_none() {
			return Err(GraphEditorError::UnknownNode(name.clone()));
		}
		self.focused = true;
		self.set_selected(Some(name.clone()));
		Ok(())
	}

	pub fn clear_selection(&mut self) {
		self.set_selected(None);
	}

	fn set_selected(&mut self, selected: Option<NodeId>) {
		if self.selected == selected {
			return;
		}
		self.selected = selected.clone();
		self.events.push(EditorEvent::SelectionChanged(selected));
	}

	pub fn hovered(&self) -> Option<&NodeId> {
		self.hovered.as_ref()
	}

	pub fn set_hover(&mut self, node: Option<NodeId>) {
		self.hovered = node;
	}

	// Graph mutations

	/// Duplicates `name` and places the copies in a fresh grid right below it.
	pub fn duplicate(&mut self, name: &NodeId, include_downstream: bool) -> Result<Vec<NodeId>> {
		let anchor = self
			.positions
			.get(name)
			.ok_or_else(|| GraphEditorError::UnknownNode(name.clone()))?;
		let copies = self
			.graph
			.duplicate_node(name, include_downstream)
			.inspect_err(|err| warn!("duplicating {name} failed: {err}"))?;
		let Some(first) = copies.first() else {
			debug!("duplicating {name} produced no nodes");
			return Ok(copies);
		};

		let len = self.graph.nodes().len();
		let from = self
			.graph
			.node_index(first)
			.ok_or_else(|| GraphEditorError::UnknownNode(first.clone()))?;
		let to = from + copies.len() - 1;
		if to >= len {
			return Err(GraphEditorError::InvalidRange { from, to, len });
		}

		let origin = Point::new(anchor.x, anchor.y + self.settings.row_step());
		let request = LayoutRequest::partial(from, to, origin, self.depth_policy());
		let placements = auto_layout(self.graph.nodes(), &request, &self.settings)?;
		for placement in &placements {
			self.write_position(&placement.node, placement.position, Some(Transition::Immediate));
		}
		info!("duplicated {name} into {} nodes", copies.len());
		self.select(first)?;
		Ok(copies)
	}

	/// Creates a node of `node_type` at `spawn` (world space) and selects it.
	pub fn add_new_node(&mut self, node_type: &str, spawn: Point) -> Result<NodeId> {
		let name = self
			.graph
			.add_new_node(node_type)
			.inspect_err(|err| warn!("creating {node_type} failed: {err}"))?;
		self.move_node(&name, spawn)?;
		Ok(name)
	}

	/// Removes a node. Its pins are unregistered before the graph drops it.
	pub fn remove_node(&mut self, name: &NodeId) -> Result<()> {
		if self.graph.node_by_name(name).is_none() {
			return Err(GraphEditorError::UnknownNode(name.clone()));
		}
		let was_mounted = self.mounted.remove(name);
		let removed_pins = self.pins.unregister_node(name);
		self.anchors.mark_all();
		if let Err(err) = self.graph.remove_node(name) {
			warn!("removing {name} failed: {err}");
			for (attribute, pin) in removed_pins {
				self.pins.register(attribute, pin);
			}
			if was_mounted {
				self.mounted.insert(name.clone());
			}
			return Err(err);
		}
		self.positions.remove(name);
		if self.selected.as_ref() == Some(name) {
			self.clear_selection();
		}
		if self.hovered.as_ref() == Some(name) {
			self.hovered = None;
		}
		Ok(())
	}

	pub fn add_edge(&mut self, src: &AttributeId, dst: &AttributeId) -> Result<()> {
		self.graph.add_edge(src, dst)?;
		self.anchors.mark_all();
		Ok(())
	}

	pub fn remove_edge(&mut self, edge: &EdgeKey) -> Result<()> {
		self.graph.remove_edge(edge)?;
		self.anchors.mark_all();
		Ok(())
	}

	pub fn can_compute(&self, name: &NodeId) -> bool {
		self.graph.can_compute(name)
	}

	pub fn execute(&mut self, name: &NodeId) -> Result<()> {
		self.graph.execute(name)
	}

	pub fn submit(&mut self, name: &NodeId) -> Result<()> {
		self.graph.submit(name)
	}

	pub fn stop_execution(&mut self) -> Result<()> {
		self.graph.stop_execution()
	}

	pub fn clear_data(&mut self, name: &NodeId) -> Result<()> {
		self.graph.clear_data(name)
	}

	// Viewport

	pub fn screen_to_world(&self, screen: Point) -> Point {
		self.viewport.screen_to_world(screen)
	}

	pub fn zoom(&mut self, cursor: Point, wheel_delta: f64) -> bool {
		let moved = self.viewport.zoom(cursor, wheel_delta);
		self.notify_moved(moved)
	}

	pub fn begin_pan(&mut self, screen: Point) {
		self.viewport.begin_pan(screen);
	}

	pub fn pan_to(&mut self, screen: Point) -> bool {
		let moved = self.viewport.pan_to(screen);
		self.notify_moved(moved)
	}

	pub fn pan_by(&mut self, delta: Point) -> bool {
		let moved = self.viewport.pan_by(delta);
		self.notify_moved(moved)
	}

	pub fn end_pan(&mut self) {
		self.viewport.end_pan();
	}

	/// World-space box around every placed node, `None` on an empty graph.
	pub fn content_bounds(&self) -> Option<Rect> {
		self.graph
			.nodes()
			.iter()
			.filter_map(|n| self.positions.get(&n.name))
			.map(|p| widget::node_rect(p, &self.settings))
			.reduce(|acc, rect| acc.union(&rect))
	}

	/// Fits all nodes in a viewport of `size` pixels.
	pub fn fit_all(&mut self, size: (f64, f64)) -> bool {
		let Some(bounds) = self.content_bounds() else {
			debug!("fit skipped: no nodes placed");
			return false;
		};
		let moved = self.viewport.fit(size, bounds);
		self.notify_moved(moved)
	}

	fn notify_moved(&mut self, moved: bool) -> bool {
		if moved {
			self.events.push(EditorEvent::ViewportMoved);
		}
		moved
	}

	// Pointer interaction

	/// Topmost node under a screen position.
	pub fn node_at(&self, screen: Point) -> Option<NodeId> {
		let world = self.screen_to_world(screen);
		self.graph
			.nodes()
			.iter()
			.rev()
			.find(|n| {
				self.positions
					.rendered(&n.name)
					.is_some_and(|p| widget::node_rect(p, &self.settings).contains(world))
			})
			.map(|n| n.name.clone())
	}

	/// Selects the node under the pointer, or reports a background click.
	pub fn click(&mut self, screen: Point) -> Option<NodeId> {
		match self.node_at(screen) {
			Some(name) => {
				self.focused = true;
				self.set_selected(Some(name.clone()));
				Some(name)
			}
			None => {
				self.clear_selection();
				let world = self.screen_to_world(screen);
				self.events.push(EditorEvent::ViewportClicked(world));
				None
			}
		}
	}

	pub fn double_click(&mut self, screen: Point) -> Option<NodeId> {
		let name = self.node_at(screen)?;
		self.events.push(EditorEvent::NodeDoubleClicked(name.clone()));
		Some(name)
	}

	pub fn begin_node_drag(&mut self, name: &NodeId, screen: Point) -> bool {
		let Some(node_start) = self.positions.get(name) else {
			return false;
		};
		self.drag = Some(DragState {
			node: name.clone(),
			start_x: screen.x,
			start_y: screen.y,
			node_start,
		});
		true
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.is_some()
	}

	pub fn drag_to(&mut self, screen: Point) -> bool {
		let Some(drag) = self.drag.clone() else {
			return false;
		};
		let k = self.viewport.scale();
		let position = Point::new(
			drag.node_start.x + (screen.x - drag.start_x) / k,
			drag.node_start.y + (screen.y - drag.start_y) / k,
		);
		self.write_position(&drag.node, position, Some(Transition::Immediate));
		true
	}

	pub fn end_drag(&mut self) {
		self.drag = None;
	}

	pub fn drain_events(&mut self) -> Vec<EditorEvent> {
		self.events.drain()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_editor::graph::MemoryGraph;
	use crate::components::graph_editor::graph::tests::chain_graph;
	use crate::components::graph_editor::types::{
		AttributeData, EdgeData, GraphData, GraphLink, GraphNode, NodeData,
	};

	fn mount_all<G: GraphModel + GraphMutator>(editor: &mut GraphEditor<G>) {
		editor.sync_widgets();
		editor.process_anchors();
	}

	fn filter_graph() -> MemoryGraph {
		let node = |t: &str, inputs: &[&str], outputs: &[&str]| GraphNode {
			node_type: t.into(),
			inputs: inputs.iter().map(|s| s.to_string()).collect(),
			outputs: outputs.iter().map(|s| s.to_string()).collect(),
		};
		let link = |s: usize, d: usize, attr: &str| GraphLink {
			source: (s, "output".into()),
			target: (d, attr.into()),
		};
		MemoryGraph::from_data(&GraphData {
			nodes: vec![
				node("Source", &[], &["output"]),
				node("Prepare", &["input"], &["output"]),
				node("Filter", &["input", "mask"], &["output"]),
			],
			links: vec![link(0, 1, "input"), link(1, 2, "input")],
		})
	}

	#[test]
	fn edges_wait_for_every_node_widget() {
		let mut editor = GraphEditor::new(chain_graph(), EditorSettings::default());
		let names: Vec<NodeId> = editor.graph().nodes().iter().map(|n| n.name.clone()).collect();
		for name in &names[..4] {
			editor.mount_node(name).unwrap();
			assert!(!editor.is_loaded());
			assert_eq!(editor.process_anchors(), 0);
			assert_eq!(editor.resolved_edges().count(), 0);
		}
		editor.mount_node(&names[4]).unwrap();
		assert!(editor.is_loaded());
		assert_eq!(editor.process_anchors(), 4);
		assert_eq!(editor.resolved_edges().count(), 4);
	}

	#[test]
	fn loading_runs_full_layout() {
		let mut editor = GraphEditor::new(chain_graph(), EditorSettings::default());
		mount_all(&mut editor);
		let positions: Vec<Point> = editor
			.graph()
			.nodes()
			.iter()
			.filter_map(|n| editor.node_position(&n.name))
			.collect();
		assert_eq!(positions.len(), 5);
		assert_eq!(positions[3], Point::new(465.0, 0.0));

		let edge = editor.graph().edges()[0].key();
		let endpoints = editor.edge_endpoints(&edge).unwrap();
		assert_eq!(endpoints.src, Point::new(140.0, 51.0));
		assert_eq!(endpoints.dst, Point::new(155.0, 51.0));
	}

	#[test]
	fn relayout_is_idempotent() {
		let mut editor = GraphEditor::new(filter_graph(), EditorSettings::default());
		mount_all(&mut editor);
		let first = editor.save_layout();
		editor.relayout().unwrap();
		assert_eq!(editor.save_layout(), first);
	}

	#[test]
	fn duplicate_places_copy_below_source() {
		let mut editor = GraphEditor::new(filter_graph(), EditorSettings::default());
		mount_all(&mut editor);
		let filter = NodeId::new("Filter_1");
		assert_eq!(editor.graph().node_by_name(&filter).unwrap().attributes.len(), 3);
		assert_eq!(editor.graph().node_by_name(&filter).unwrap().depth, 2);
		let source_pos = editor.node_position(&filter).unwrap();
		editor.drain_events();

		let copies = editor.duplicate(&filter, false).unwrap();
		assert_eq!(copies, vec![NodeId::new("Filter_2")]);
		let expected = Point::new(source_pos.x, source_pos.y + 80.0 + 15.0);
		assert_eq!(editor.node_position(&copies[0]), Some(expected));
		assert_eq!(editor.rendered_position(&copies[0]), Some(expected));
		assert_eq!(editor.selected(), Some(&copies[0]));
		assert_eq!(
			editor.drain_events(),
			vec![EditorEvent::SelectionChanged(Some(copies[0].clone()))]
		);

		// the copy's input edge resolves once its widget mounts
		mount_all(&mut editor);
		let edge = EdgeKey {
			src: AttributeId("Prepare_1.output".into()),
			dst: AttributeId("Filter_2.input".into()),
		};
		assert_eq!(editor.edge_endpoints(&edge).unwrap().dst.y, expected.y + 36.5);
	}

	#[test]
	fn duplicate_downstream_lays_out_each_copy() {
		let mut editor = GraphEditor::new(chain_graph(), EditorSettings::default());
		mount_all(&mut editor);
		let stage2 = NodeId::new("Stage2_1");
		let origin = editor.node_position(&stage2).unwrap();
		let copies = editor.duplicate(&stage2, true).unwrap();
		assert_eq!(copies.len(), 3);
		let placed: Vec<Point> = copies.iter().filter_map(|c| editor.node_position(c)).collect();
		let row = origin.y + 95.0;
		assert_eq!(
			placed,
			vec![
				Point::new(origin.x, row),
				Point::new(origin.x + 155.0, row),
				Point::new(origin.x + 310.0, row),
			]
		);
		assert_eq!(editor.selected(), Some(&copies[0]));
	}

	#[test]
	fn failed_duplicate_leaves_selection() {
		let mut editor = GraphEditor::new(chain_graph(), EditorSettings::default());
		mount_all(&mut editor);
		let result = editor.duplicate(&NodeId::new("Missing_1"), false);
		assert!(matches!(result, Err(GraphEditorError::UnknownNode(_))));
		assert!(editor.selected().is_none());
		assert_eq!(editor.graph().nodes().len(), 5);
	}

	#[test]
	fn move_node_is_immediate_and_selects() {
		let mut editor = GraphEditor::new(chain_graph(), EditorSettings::default());
		mount_all(&mut editor);
		let name = NodeId::new("Stage1_1");
		editor.move_node(&name, Point::new(-40.0, 600.0)).unwrap();
		assert_eq!(editor.rendered_position(&name), Some(Point::new(-40.0, 600.0)));
		assert!(editor.positions().animate());
		assert_eq!(editor.selected(), Some(&name));
		assert!(editor.has_focus());
		assert!(editor.move_node(&NodeId::new("Nope"), Point::ZERO).is_err());
	}

	#[test]
	fn depth_policy_toggle_relayouts_with_animation() {
		let graph = {
			let mut graph = filter_graph();
			// Source also feeds Filter.mask, so Filter has depth 2 but min depth 1
			graph
				.add_edge(&AttributeId("Source_1.output".into()), &AttributeId("Filter_1.mask".into()))
				.unwrap();
			graph
		};
		let mut editor = GraphEditor::new(graph, EditorSettings::default());
		mount_all(&mut editor);
		let filter = NodeId::new("Filter_1");
		assert_eq!(editor.node_position(&filter), Some(Point::new(155.0, 95.0)));

		editor.set_use_min_depth(false);
		assert_eq!(editor.node_position(&filter), Some(Point::new(310.0, 0.0)));
		assert_eq!(editor.rendered_position(&filter), Some(Point::new(155.0, 95.0)));
		for _ in 0..300 {
			editor.tick(0.016);
		}
		assert_eq!(editor.rendered_position(&filter), Some(Point::new(310.0, 0.0)));
	}

	#[test]
	fn hydrate_before_load_replaces_layout() {
		let mut editor = GraphEditor::new(chain_graph(), EditorSettings::default());
		let mut saved = SavedLayout::default();
		saved.positions.insert("Stage0_1".into(), (500.0, 500.0));
		saved.positions.insert("Ghost_1".into(), (1.0, 1.0));
		editor.hydrate(saved);
		mount_all(&mut editor);
		assert_eq!(editor.node_position(&NodeId::new("Stage0_1")), Some(Point::new(500.0, 500.0)));
		// nodes without a saved slot still get their layout slot
		assert_eq!(editor.node_position(&NodeId::new("Stage2_1")), Some(Point::new(310.0, 0.0)));
		assert_eq!(editor.positions().len(), 5);
	}

	#[test]
	fn hydrate_after_load_applies_at_once() {
		let mut editor = GraphEditor::new(chain_graph(), EditorSettings::default());
		mount_all(&mut editor);
		let mut saved = editor.save_layout();
		saved.positions.insert("Stage4_1".into(), (0.0, 900.0));
		assert_eq!(editor.hydrate(saved), 5);
		let name = NodeId::new("Stage4_1");
		assert_eq!(editor.rendered_position(&name), Some(Point::new(0.0, 900.0)));
		editor.process_anchors();
		let edge = editor.graph().edges()[3].key();
		assert_eq!(editor.edge_endpoints(&edge).unwrap().dst, Point::new(0.0, 951.0));
	}

	#[test]
	fn remove_node_unregisters_pins_first() {
		let mut editor = GraphEditor::new(chain_graph(), EditorSettings::default());
		mount_all(&mut editor);
		let stage2 = NodeId::new("Stage2_1");
		editor.select(&stage2).unwrap();
		editor.remove_node(&stage2).unwrap();
		assert!(editor.pins().resolve(&AttributeId("Stage2_1.input".into())).is_none());
		assert!(editor.node_position(&stage2).is_none());
		assert!(editor.selected().is_none());
		editor.process_anchors();
		assert_eq!(editor.resolved_edges().count(), 2);

		let pins_before = editor.pins().len();
		assert!(editor.remove_node(&stage2).is_err());
		assert_eq!(editor.pins().len(), pins_before);
	}

	#[test]
	fn add_new_node_spawns_at_pointer() {
		let mut editor = GraphEditor::new(chain_graph(), EditorSettings::default());
		mount_all(&mut editor);
		editor.viewport.transform.k = 0.5;
		let spawn = editor.screen_to_world(Point::new(100.0, 50.0));
		let name = editor.add_new_node("Meshing", spawn).unwrap();
		assert_eq!(editor.node_position(&name), Some(Point::new(200.0, 100.0)));
		assert_eq!(editor.selected(), Some(&name));
		editor.sync_widgets();
		assert_eq!(editor.mounted_count(), 6);
	}

	#[test]
	fn first_node_of_empty_graph_keeps_its_spawn_point() {
		let mut editor = GraphEditor::new(MemoryGraph::new(), EditorSettings::default());
		mount_all(&mut editor);
		assert!(editor.is_loaded());
		let name = editor.add_new_node("CameraInit", Point::new(300.0, 120.0)).unwrap();
		mount_all(&mut editor);
		assert_eq!(editor.node_position(&name), Some(Point::new(300.0, 120.0)));
	}

	#[test]
	fn fit_all_uses_node_bounds() {
		let mut editor = GraphEditor::new(chain_graph(), EditorSettings::default());
		assert!(!editor.fit_all((400.0, 400.0)));
		mount_all(&mut editor);
		editor.drain_events();
		assert!(editor.fit_all((800.0, 400.0)));
		let bounds = editor.content_bounds().unwrap();
		assert_eq!(bounds, Rect::new(0.0, 0.0, 760.0, 80.0));
		let k = editor.viewport.scale();
		assert!((k - 800.0 / 760.0).abs() < 1e-12);
		assert_eq!(editor.drain_events(), vec![EditorEvent::ViewportMoved]);
	}

	#[test]
	fn clamped_zoom_emits_nothing() {
		let mut editor = GraphEditor::new(chain_graph(), EditorSettings::default());
		editor.viewport.transform.k = 2.0;
		assert!(!editor.zoom(Point::new(10.0, 10.0), 1.0));
		assert!(editor.drain_events().is_empty());
		assert!(editor.zoom(Point::new(10.0, 10.0), -1.0));
		assert_eq!(editor.drain_events(), vec![EditorEvent::ViewportMoved]);
	}

	#[test]
	fn pointer_clicks_select_or_report_background() {
		let mut editor = GraphEditor::new(chain_graph(), EditorSettings::default());
		mount_all(&mut editor);
		assert_eq!(editor.click(Point::new(10.0, 10.0)), Some(NodeId::new("Stage0_1")));
		assert_eq!(
			editor.double_click(Point::new(160.0, 10.0)),
			Some(NodeId::new("Stage1_1"))
		);
		assert_eq!(editor.click(Point::new(10.0, 300.0)), None);
		assert_eq!(
			editor.drain_events(),
			vec![
				EditorEvent::SelectionChanged(Some(NodeId::new("Stage0_1"))),
				EditorEvent::NodeDoubleClicked(NodeId::new("Stage1_1")),
				EditorEvent::SelectionChanged(None),
				EditorEvent::ViewportClicked(Point::new(10.0, 300.0)),
			]
		);
	}

	#[test]
	fn node_drag_follows_pointer_in_world_units() {
		let mut editor = GraphEditor::new(chain_graph(), EditorSettings::default());
		mount_all(&mut editor);
		editor.viewport.transform.k = 2.0;
		let name = NodeId::new("Stage0_1");
		assert!(editor.begin_node_drag(&name, Point::new(0.0, 0.0)));
		editor.drag_to(Point::new(40.0, 20.0));
		editor.end_drag();
		assert_eq!(editor.node_position(&name), Some(Point::new(20.0, 10.0)));
		assert!(!editor.drag_to(Point::new(100.0, 100.0)));
	}

	#[test]
	fn pan_moves_the_view_only_while_active() {
		let mut editor = GraphEditor::new(chain_graph(), EditorSettings::default());
		assert!(!editor.pan_by(Point::new(5.0, 0.0)));
		editor.begin_pan(Point::new(0.0, 0.0));
		assert!(editor.pan_to(Point::new(30.0, 10.0)));
		assert!(editor.pan_by(Point::new(5.0, 0.0)));
		assert_eq!(
			editor.drain_events(),
			vec![EditorEvent::ViewportMoved, EditorEvent::ViewportMoved]
		);
		editor.end_pan();
		let (x, y) = (editor.viewport.transform.x, editor.viewport.transform.y);
		assert!(!editor.pan_to(Point::new(100.0, 100.0)));
		assert!(!editor.pan_by(Point::new(5.0, 5.0)));
		assert!(editor.drain_events().is_empty());
		assert_eq!((editor.viewport.transform.x, editor.viewport.transform.y), (x, y));
	}

	/// Reports success for duplication without creating anything.
	struct NoCopies(MemoryGraph);

	impl GraphModel for NoCopies {
		fn nodes(&self) -> &[NodeData] {
			self.0.nodes()
		}
		fn edges(&self) -> &[EdgeData] {
			self.0.edges()
		}
		fn node_by_name(&self, name: &NodeId) -> Option<&NodeData> {
			self.0.node_by_name(name)
		}
		fn attribute_by_id(&self, id: &AttributeId) -> Option<&AttributeData> {
			self.0.attribute_by_id(id)
		}
	}

	impl GraphMutator for NoCopies {
		fn add_new_node(&mut self, node_type: &str) -> Result<NodeId> {
			self.0.add_new_node(node_type)
		}
		fn remove_node(&mut self, name: &NodeId) -> Result<()> {
			self.0.remove_node(name)
		}
		fn add_edge(&mut self, src: &AttributeId, dst: &AttributeId) -> Result<()> {
			self.0.add_edge(src, dst)
		}
		fn remove_edge(&mut self, edge: &EdgeKey) -> Result<()> {
			self.0.remove_edge(edge)
		}
		fn duplicate_node(&mut self, _: &NodeId, _: bool) -> Result<Vec<NodeId>> {
			Ok(Vec::new())
		}
		fn can_compute(&self, name: &NodeId) -> bool {
			self.0.can_compute(name)
		}
		fn execute(&mut self, name: &NodeId) -> Result<()> {
			self.0.execute(name)
		}
		fn submit(&mut self, name: &NodeId) -> Result<()> {
			self.0.submit(name)
		}
		fn stop_execution(&mut self) -> Result<()> {
			self.0.stop_execution()
		}
		fn clear_data(&mut self, name: &NodeId) -> Result<()> {
			self.0.clear_data(name)
		}
	}

	#[test]
	fn duplicate_without_copies_changes_nothing() {
		let mut editor = GraphEditor::new(NoCopies(chain_graph()), EditorSettings::default());
		mount_all(&mut editor);
		let (stage0, stage2) = (NodeId::new("Stage0_1"), NodeId::new("Stage2_1"));
		editor.select(&stage0).unwrap();
		editor.drain_events();
		let before: Vec<Option<Point>> = editor
			.graph()
			.nodes()
			.iter()
			.map(|n| editor.node_position(&n.name))
			.collect();

		assert_eq!(editor.duplicate(&stage2, false).unwrap(), Vec::<NodeId>::new());
		assert_eq!(editor.selected(), Some(&stage0));
		assert!(editor.drain_events().is_empty());
		let after: Vec<Option<Point>> = editor
			.graph()
			.nodes()
			.iter()
			.map(|n| editor.node_position(&n.name))
			.collect();
		assert_eq!(before, after);
	}
}
