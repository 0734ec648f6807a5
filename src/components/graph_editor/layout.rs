//! Depth-column grid layout.
//!
//! Each node of the requested index range goes into the column given by its
//! depth (relative to the first node of the range) and takes the first free
//! row of that column, in sequence order.

use std::collections::BTreeMap;

use super::error::{GraphEditorError, Result};
use super::settings::EditorSettings;
use super::types::{NodeData, NodeId, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthPolicy {
	Depth,
	MinDepth,
}

impl DepthPolicy {
	pub fn from_use_min_depth(use_min_depth: bool) -> Self {
		if use_min_depth {
			DepthPolicy::MinDepth
		} else {
			DepthPolicy::Depth
		}
	}

	pub fn depth_of(self, node: &NodeData) -> i64 {
		match self {
			DepthPolicy::Depth => node.depth,
			DepthPolicy::MinDepth => node.min_depth,
		}
	}
}

#[derive(Clone, Debug)]
pub struct LayoutRequest {
	/// Inclusive index range; `None` lays out the whole sequence.
	pub range: Option<(usize, usize)>,
	pub origin: Point,
	pub policy: DepthPolicy,
}

impl LayoutRequest {
	pub fn full(policy: DepthPolicy) -> Self {
		Self {
			range: None,
			origin: Point::ZERO,
			policy,
		}
	}

	pub fn partial(from: usize, to: usize, origin: Point, policy: DepthPolicy) -> Self {
		Self {
			range: Some((from, to)),
			origin,
			policy,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
	pub node: NodeId,
	/// Relative to the first node of the range; may be negative.
	pub column: i64,
	pub row: usize,
	pub position: Point,
}

pub fn auto_layout(
	nodes: &[NodeData],
	request: &LayoutRequest,
	settings: &EditorSettings,
) -> Result<Vec<Placement>> {
	let (from, to) = match request.range {
		Some(range) => range,
		None if nodes.is_empty() => return Ok(Vec::new()),
		None => (0, nodes.len() - 1),
	};
	if from > to || to >= nodes.len() {
		return Err(GraphEditorError::InvalidRange {
			from,
			to,
			len: nodes.len(),
		});
	}

	let zero_depth = if from > 0 {
		request.policy.depth_of(&nodes[from])
	} else {
		0
	};

	// column -> next free row
	let mut grid: BTreeMap<i64, usize> = BTreeMap::new();
	let placements = nodes[from..=to]
		.iter()
		.map(|node| {
			let column = request.policy.depth_of(node) - zero_depth;
			let next_row = grid.entry(column).or_insert(0);
			let row = *next_row;
			*next_row += 1;
			Placement {
				node: node.name.clone(),
				column,
				row,
				position: Point::new(
					request.origin.x + column as f64 * settings.column_step(),
					request.origin.y + row as f64 * settings.row_step(),
				),
			}
		})
		.collect();
	Ok(placements)
}
