use super::types::{NodeId, Point};

/// One-way notifications for presentation collaborators (property panels, menus).
#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
	ViewportMoved,
	/// Background click, in world coordinates.
	ViewportClicked(Point),
	NodeDoubleClicked(NodeId),
	SelectionChanged(Option<NodeId>),
}

#[derive(Clone, Debug, Default)]
pub struct EventQueue {
	pending: Vec<EditorEvent>,
}

impl EventQueue {
	pub fn push(&mut self, event: EditorEvent) {
		self.pending.push(event);
	}

	pub fn drain(&mut self) -> Vec<EditorEvent> {
		std::mem::take(&mut self.pending)
	}

	pub fn is_empty(&self) -> bool {
		self.pending.is_empty()
	}
}
