//! Capabilities the editor needs from the graph it displays.
//!
//! The editor never owns node, attribute or edge storage; it reads through
//! [`GraphModel`] and delegates changes to [`GraphMutator`]. [`MemoryGraph`]
//! is a small in-process implementation for the demo page and tests.

use std::collections::{HashMap, HashSet, VecDeque};

use log::{debug, warn};

use super::error::{GraphEditorError, Result};
use super::types::{
	AttributeData, AttributeId, ComputeStatus, EdgeData, EdgeKey, GraphData, NodeData, NodeId,
};

pub trait GraphModel {
	/// All nodes, in stable order. Newly created nodes are appended.
	fn nodes(&self) -> &[NodeData];
	fn edges(&self) -> &[EdgeData];
	fn node_by_name(&self, name: &NodeId) -> Option<&NodeData>;
	fn attribute_by_id(&self, id: &AttributeId) -> Option<&AttributeData>;

	fn node_index(&self, name: &NodeId) -> Option<usize> {
		self.nodes().iter().position(|n| &n.name == name)
	}

	/// Owning node of an attribute.
	fn attribute_node(&self, id: &AttributeId) -> Option<&NodeId> {
		self.attribute_by_id(id).map(|a| &a.node)
	}
}

pub trait GraphMutator {
	fn add_new_node(&mut self, node_type: &str) -> Result<NodeId>;
	fn remove_node(&mut self, name: &NodeId) -> Result<()>;
	fn add_edge(&mut self, src: &AttributeId, dst: &AttributeId) -> Result<()>;
	fn remove_edge(&mut self, edge: &EdgeKey) -> Result<()>;
	/// Copies `name` (and everything downstream of it when asked); copies are
	/// appended to the node sequence and returned in that order.
	fn duplicate_node(&mut self, name: &NodeId, include_downstream: bool) -> Result<Vec<NodeId>>;
	fn can_compute(&self, name: &NodeId) -> bool;
	fn execute(&mut self, name: &NodeId) -> Result<()>;
	fn submit(&mut self, name: &NodeId) -> Result<()>;
	/// Drops every submitted node back to an uncomputed state.
	fn stop_execution(&mut self) -> Result<()>;
	fn clear_data(&mut self, name: &NodeId) -> Result<()>;
}

#[derive(Clone, Debug)]
struct NodeTemplate {
	inputs: Vec<String>,
	outputs: Vec<String>,
}

impl Default for NodeTemplate {
	fn default() -> Self {
		Self {
			inputs: vec!["input".into()],
			outputs: vec!["output".into()],
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct MemoryGraph {
	nodes: Vec<NodeData>,
	edges: Vec<EdgeData>,
	templates: HashMap<String, NodeTemplate>,
	cache_dir: String,
}

impl MemoryGraph {
	pub fn new() -> Self {
		Self {
			cache_dir: "MeshroomCache".into(),
			..Self::default()
		}
	}

	/// Builds a graph from a declarative description. Links that do not
	/// resolve are dropped with a warning.
	pub fn from_data(data: &GraphData) -> Self {
		let mut graph = Self::new();
		let names: Vec<NodeId> = data
			.nodes
			.iter()
			.map(|n| {
				graph
					.templates
					.entry(n.node_type.clone())
					.or_insert_with(|| NodeTemplate {
						inputs: n.inputs.clone(),
						outputs: n.outputs.clone(),
					});
				graph.create_node_with(&n.node_type, &n.inputs, &n.outputs)
			})
			.collect();
		for link in &data.links {
			let (Some(src_node), Some(dst_node)) = (names.get(link.source.0), names.get(link.target.0))
			else {
				warn!("dropping link with unknown node index: {link:?}");
				continue;
			};
			let src = AttributeId::new(src_node, &link.source.1);
			let dst = AttributeId::new(dst_node, &link.target.1);
			if let Err(err) = graph.connect(&src, &dst) {
				warn!("dropping link {src} -> {dst}: {err}");
			}
		}
		graph.update_depths();
		graph
	}

	/// Whether any node is submitted.
	pub fn is_computing(&self) -> bool {
		self.nodes.iter().any(|n| n.status.is_pending())
	}

	fn unique_name(&self, node_type: &str) -> NodeId {
		(1..)
			.map(|i| NodeId(format!("{node_type}_{i}")))
			.find(|candidate| self.node_by_name(candidate).is_none())
			.unwrap_or_else(|| NodeId(node_type.to_string()))
	}

	/// Creates a node with the attribute set registered for `node_type`.
	fn create_node(&mut self, node_type: &str) -> NodeId {
		let template = self.templates.get(node_type).cloned().unwrap_or_default();
		self.create_node_with(node_type, &template.inputs, &template.outputs)
	}

	fn create_node_with(&mut self, node_type: &str, inputs: &[String], outputs: &[String]) -> NodeId {
		let name = self.unique_name(node_type);
		let attribute = |attr: &String, is_output: bool| AttributeData {
			id: AttributeId::new(&name, attr),
			node: name.clone(),
			name: attr.clone(),
			is_output,
		};
		let attributes = inputs
			.iter()
			.map(|a| attribute(a, false))
			.chain(outputs.iter().map(|a| attribute(a, true)))
			.collect();
		self.nodes.push(NodeData {
			internal_folder: format!("{}/{}/{}", self.cache_dir, node_type, name),
			name: name.clone(),
			node_type: node_type.to_string(),
			attributes,
			depth: 0,
			min_depth: 0,
			status: ComputeStatus::None,
		});
		name
	}

	fn connect(&mut self, src: &AttributeId, dst: &AttributeId) -> Result<()> {
		let src_attr = self
			.attribute_by_id(src)
			.ok_or_else(|| GraphEditorError::UnknownAttribute(src.clone()))?;
		let dst_attr = self
			.attribute_by_id(dst)
			.ok_or_else(|| GraphEditorError::UnknownAttribute(dst.clone()))?;
		if !src_attr.is_output || dst_attr.is_output {
			return Err(GraphEditorError::Mutation(format!(
				"{src} -> {dst} must link an output to an input"
			)));
		}
		let key = EdgeKey {
			src: src.clone(),
			dst: dst.clone(),
		};
		if self.edges.iter().any(|e| e.key() == key) {
			return Err(GraphEditorError::DuplicateEdge(key));
		}
		if self.edges.iter().any(|e| &e.dst == dst) {
			return Err(GraphEditorError::Mutation(format!("{dst} is already connected")));
		}
		let (src_node, dst_node) = (src_attr.node.clone(), dst_attr.node.clone());
		if src_node == dst_node || self.downstream(&dst_node).contains(&src_node) {
			return Err(GraphEditorError::Mutation(format!("{src} -> {dst} would create a cycle")));
		}
		self.edges.push(EdgeData {
			src: src.clone(),
			dst: dst.clone(),
		});
		Ok(())
	}

	fn edge_nodes(&self, edge: &EdgeData) -> Option<(usize, usize)> {
		let src = self.attribute_node(&edge.src)?;
		let dst = self.attribute_node(&edge.dst)?;
		Some((self.node_index(src)?, self.node_index(dst)?))
	}

	/// Index pairs (parent, child) for every edge.
	fn links(&self) -> Vec<(usize, usize)> {
		self.edges.iter().filter_map(|e| self.edge_nodes(e)).collect()
	}

	/// Recomputes `depth` (longest path from a source) and `min_depth`
	/// (shortest path) for every node.
	fn update_depths(&mut self) {
		let links = self.links();
		let count = self.nodes.len();
		let mut indegree = vec![0usize; count];
		let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
		for &(parent, child) in &links {
			indegree[child] += 1;
			children[parent].push(child);
		}
		let mut depth = vec![0i64; count];
		let mut min_depth: Vec<Option<i64>> = vec![None; count];
		let mut queue: VecDeque<usize> = (0..count).filter(|&i| indegree[i] == 0).collect();
		for &i in &queue {
			min_depth[i] = Some(0);
		}
		while let Some(parent) = queue.pop_front() {
			let parent_min = min_depth[parent].unwrap_or(0);
			for &child in &children[parent] {
				depth[child] = depth[child].max(depth[parent] + 1);
				let candidate = parent_min + 1;
				min_depth[child] = Some(min_depth[child].map_or(candidate, |m| m.min(candidate)));
				indegree[child] -= 1;
				if indegree[child] == 0 {
					queue.push_back(child);
				}
			}
		}
		for (i, node) in self.nodes.iter_mut().enumerate() {
			node.depth = depth[i];
			node.min_depth = min_depth[i].unwrap_or(depth[i]);
		}
	}

	fn downstream(&self, name: &NodeId) -> HashSet<NodeId> {
		self.walk(name, true)
	}

	fn upstream(&self, name: &NodeId) -> HashSet<NodeId> {
		self.walk(name, false)
	}

	fn walk(&self, start: &NodeId, forward: bool) -> HashSet<NodeId> {
		let links = self.links();
		let mut seen = HashSet::new();
		let Some(start) = self.node_index(start) else {
			return seen;
		};
		let mut stack = vec![start];
		while let Some(current) = stack.pop() {
			for &(parent, child) in &links {
				let (from, to) = if forward { (parent, child) } else { (child, parent) };
				if from == current && seen.insert(self.nodes[to].name.clone()) {
					stack.push(to);
				}
			}
		}
		seen
	}

	fn node_mut(&mut self, name: &NodeId) -> Result<&mut NodeData> {
		self.nodes
			.iter_mut()
			.find(|n| &n.name == name)
			.ok_or_else(|| GraphEditorError::UnknownNode(name.clone()))
	}

	/// `name` plus every predecessor that has not been computed yet.
	fn pending_chain(&self, name: &NodeId) -> Result<Vec<NodeId>> {
		if self.node_by_name(name).is_none() {
			return Err(GraphEditorError::UnknownNode(name.clone()));
		}
		if self.is_computing() {
			return Err(GraphEditorError::Mutation(format!(
				"cannot compute {name} while the graph is computing"
			)));
		}
		let mut chain: Vec<NodeId> = self
			.upstream(name)
			.into_iter()
			.filter(|n| {
				self.node_by_name(n)
					.is_some_and(|node| node.status != ComputeStatus::Success)
			})
			.collect();
		chain.push(name.clone());
		Ok(chain)
	}

	fn set_status(&mut self, names: &[NodeId], status: ComputeStatus) -> Result<()> {
		for name in names {
			self.node_mut(name)?.status = status;
		}
		Ok(())
	}
}

impl GraphModel for MemoryGraph {
	fn nodes(&self) -> &[NodeData] {
		&self.nodes
	}

	fn edges(&self) -> &[EdgeData] {
		&self.edges
	}

	fn node_by_name(&self, name: &NodeId) -> Option<&NodeData> {
		self.nodes.iter().find(|n| &n.name == name)
	}

	fn attribute_by_id(&self, id: &AttributeId) -> Option<&AttributeData> {
		let (node, attribute) = id.as_str().split_once('.')?;
		self.node_by_name(&NodeId::new(node))?.attribute(attribute)
	}
}

impl GraphMutator for MemoryGraph {
	fn add_new_node(&mut self, node_type: &str) -> Result<NodeId> {
		if node_type.is_empty() || node_type.contains('.') {
			return Err(GraphEditorError::Mutation(format!("invalid node type {node_type:?}")));
		}
		let name = self.create_node(node_type);
		debug!("created node {name}");
		Ok(name)
	}

	fn remove_node(&mut self, name: &NodeId) -> Result<()> {
		let index = self
			.node_index(name)
			.ok_or_else(|| GraphEditorError::UnknownNode(name.clone()))?;
		let removed = self.nodes.remove(index);
		let owned: HashSet<&AttributeId> = removed.attributes.iter().map(|a| &a.id).collect();
		self.edges
			.retain(|e| !owned.contains(&e.src) && !owned.contains(&e.dst));
		self.update_depths();
		Ok(())
	}

	fn add_edge(&mut self, src: &AttributeId, dst: &AttributeId) -> Result<()> {
		self.connect(src, dst)?;
		self.update_depths();
		Ok(())
	}

	fn remove_edge(&mut self, edge: &EdgeKey) -> Result<()> {
		let index = self
			.edges
			.iter()
			.position(|e| &e.key() == edge)
			.ok_or_else(|| GraphEditorError::UnknownEdge(edge.clone()))?;
		self.edges.remove(index);
		self.update_depths();
		Ok(())
	}

	fn duplicate_node(&mut self, name: &NodeId, include_downstream: bool) -> Result<Vec<NodeId>> {
		if self.node_by_name(name).is_none() {
			return Err(GraphEditorError::UnknownNode(name.clone()));
		}
		let mut selected = if include_downstream {
			self.downstream(name)
		} else {
			HashSet::new()
		};
		selected.insert(name.clone());
		let originals: Vec<NodeData> = self
			.nodes
			.iter()
			.filter(|n| selected.contains(&n.name))
			.cloned()
			.collect();

		let mut renamed: HashMap<NodeId, NodeId> = HashMap::new();
		for original in &originals {
			let inputs: Vec<String> = original.inputs().map(|a| a.name.clone()).collect();
			let outputs: Vec<String> = original.outputs().map(|a| a.name.clone()).collect();
			let copy = self.create_node_with(&original.node_type, &inputs, &outputs);
			renamed.insert(original.name.clone(), copy);
		}

		// Copies read from the same upstream sources; links inside the
		// duplicated set are rewired between the copies.
		let remap = |id: &AttributeId, graph: &MemoryGraph| -> Option<AttributeId> {
			let attribute = graph.attribute_by_id(id)?;
			let copy = renamed.get(&attribute.node)?;
			Some(AttributeId::new(copy, &attribute.name))
		};
		let new_edges: Vec<EdgeData> = self
			.edges
			.iter()
			.filter_map(|e| {
				let dst = remap(&e.dst, self)?;
				let src = remap(&e.src, self).unwrap_or_else(|| e.src.clone());
				Some(EdgeData { src, dst })
			})
			.collect();
		self.edges.extend(new_edges);
		self.update_depths();

		Ok(originals
			.iter()
			.filter_map(|o| renamed.get(&o.name).cloned())
			.collect())
	}

	fn can_compute(&self, name: &NodeId) -> bool {
		self.node_by_name(name).is_some() && !self.is_computing()
	}

	fn execute(&mut self, name: &NodeId) -> Result<()> {
		let chain = self.pending_chain(name)?;
		self.set_status(&chain, ComputeStatus::Success)
	}

	fn submit(&mut self, name: &NodeId) -> Result<()> {
		let chain = self.pending_chain(name)?;
		self.set_status(&chain, ComputeStatus::Submitted)
	}

	fn stop_execution(&mut self) -> Result<()> {
		for node in self.nodes.iter_mut().filter(|n| n.status.is_pending()) {
			debug!("stopping {}", node.name);
			node.status = ComputeStatus::None;
		}
		Ok(())
	}

	fn clear_data(&mut self, name: &NodeId) -> Result<()> {
		let mut targets: Vec<NodeId> = self.downstream(name).into_iter().collect();
		targets.push(name.clone());
		self.set_status(&targets, ComputeStatus::None)
	}
}
