use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Unique node name, e.g. `FeatureExtraction_1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Full attribute name, `<node>.<attribute>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeId(pub String);

impl AttributeId {
	pub fn new(node: &NodeId, attribute: &str) -> Self {
		Self(format!("{}.{}", node.0, attribute))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for AttributeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// An edge is identified by its ordered (source, destination) attribute pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
	pub src: AttributeId,
	pub dst: AttributeId,
}

impl fmt::Display for EdgeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} -> {}", self.src, self.dst)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (self.x - other.x, self.y - other.y);
		(dx * dx + dy * dy).sqrt()
	}
}

impl Add for Point {
	type Output = Point;

	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

/// Axis-aligned rectangle; `width`/`height` may be zero for degenerate boxes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}

	pub fn center(&self) -> Point {
		Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}

	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
	}

	pub fn is_degenerate(&self) -> bool {
		!(self.width > 0.0 && self.height > 0.0)
	}

	/// Smallest rectangle covering both.
	pub fn union(&self, other: &Rect) -> Rect {
		let (x0, y0) = (self.x.min(other.x), self.y.min(other.y));
		let x1 = (self.x + self.width).max(other.x + other.width);
		let y1 = (self.y + self.height).max(other.y + other.height);
		Rect::new(x0, y0, x1 - x0, y1 - y0)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ComputeStatus {
	#[default]
	None,
	Submitted,
	Success,
}

impl ComputeStatus {
	pub fn is_pending(self) -> bool {
		self == ComputeStatus::Submitted
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct AttributeData {
	pub id: AttributeId,
	pub node: NodeId,
	pub name: String,
	pub is_output: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeData {
	pub name: NodeId,
	pub node_type: String,
	pub attributes: Vec<AttributeData>,
	/// Longest path from a graph source.
	pub depth: i64,
	/// Shortest path from a graph source.
	pub min_depth: i64,
	pub internal_folder: String,
	pub status: ComputeStatus,
}

impl NodeData {
	pub fn inputs(&self) -> impl Iterator<Item = &AttributeData> {
		self.attributes.iter().filter(|a| !a.is_output)
	}

	pub fn outputs(&self) -> impl Iterator<Item = &AttributeData> {
		self.attributes.iter().filter(|a| a.is_output)
	}

	pub fn attribute(&self, name: &str) -> Option<&AttributeData> {
		self.attributes.iter().find(|a| a.name == name)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeData {
	pub src: AttributeId,
	pub dst: AttributeId,
}

impl EdgeData {
	pub fn key(&self) -> EdgeKey {
		EdgeKey {
			src: self.src.clone(),
			dst: self.dst.clone(),
		}
	}
}

/// Declarative description of a pipeline, used to seed a [`MemoryGraph`](super::graph::MemoryGraph).
#[derive(Clone, Debug, Default)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

#[derive(Clone, Debug)]
pub struct GraphNode {
	pub node_type: String,
	pub inputs: Vec<String>,
	pub outputs: Vec<String>,
}

/// `source` and `target` are `<node index>.<attribute>` pairs into [`GraphData::nodes`].
#[derive(Clone, Debug)]
pub struct GraphLink {
	pub source: (usize, String),
	pub target: (usize, String),
}
