use std::fmt;

use super::types::{AttributeId, EdgeKey, NodeId};

pub type Result<T> = std::result::Result<T, GraphEditorError>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphEditorError {
	UnknownNode(NodeId),
	UnknownAttribute(AttributeId),
	UnknownEdge(EdgeKey),
	DuplicateEdge(EdgeKey),
	/// Layout range is empty, reversed or past the end of the node sequence.
	InvalidRange {
		from: usize,
		to: usize,
		len: usize,
	},
	/// The graph collaborator refused a mutation.
	Mutation(String),
}

impl fmt::Display for GraphEditorError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::UnknownNode(name) => write!(f, "node {name} not found"),
			Self::UnknownAttribute(id) => write!(f, "attribute {id} not found"),
			Self::UnknownEdge(edge) => write!(f, "edge {edge} not found"),
			Self::DuplicateEdge(edge) => write!(f, "edge {edge} already exists"),
			Self::InvalidRange { from, to, len } => write!(
				f,
				"invalid layout range [{from}, {to}] over {len} nodes"
			),
			Self::Mutation(reason) => write!(f, "graph mutation failed: {reason}"),
		}
	}
}

impl std::error::Error for GraphEditorError {}
