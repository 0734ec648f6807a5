//! Node widget geometry: fixed-size boxes with input pins on the left border
//! and output pins on the right border.

use super::pins::Pin;
use super::settings::EditorSettings;
use super::types::{AttributeId, NodeData, Point, Rect};

/// Height of the title band; pins are spread over the remaining body.
pub const HEADER_HEIGHT: f64 = 22.0;
pub const PIN_RADIUS: f64 = 4.0;

pub fn node_rect(position: Point, settings: &EditorSettings) -> Rect {
	Rect::new(position.x, position.y, settings.node_width, settings.node_height)
}

/// Pins a mounted widget exposes, in node-local coordinates.
pub fn pin_layout(node: &NodeData, settings: &EditorSettings) -> Vec<(AttributeId, Pin)> {
	let body = (settings.node_height - HEADER_HEIGHT).max(0.0);
	let column = |x: f64, attrs: Vec<&AttributeId>| {
		let step = body / attrs.len().max(1) as f64;
		attrs
			.into_iter()
			.enumerate()
			.map(|(i, id)| {
				(
					id.clone(),
					Pin {
						node: node.name.clone(),
						local_offset: Point::new(x, HEADER_HEIGHT + step * (i as f64 + 0.5)),
					},
				)
			})
			.collect::<Vec<_>>()
	};
	let mut pins = column(0.0, node.inputs().map(|a| &a.id).collect());
	pins.extend(column(settings.node_width, node.outputs().map(|a| &a.id).collect()));
	pins
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_editor::graph::{GraphModel, tests::diamond_graph};
	use crate::components::graph_editor::types::NodeId;

	#[test]
	fn pins_sit_on_borders() {
		let graph = diamond_graph();
		let settings = EditorSettings::default();
		let merge = graph.node_by_name(&NodeId::new("Merge_1")).unwrap();
		let pins = pin_layout(merge, &settings);
		assert_eq!(pins.len(), 3);
		let offsets: Vec<Point> = pins.iter().map(|(_, p)| p.local_offset).collect();
		// body is 58 high: two inputs at 1/4 and 3/4, one output centred
		assert_eq!(offsets[0], Point::new(0.0, 36.5));
		assert_eq!(offsets[1], Point::new(0.0, 65.5));
		assert_eq!(offsets[2], Point::new(140.0, 51.0));
		assert!(pins.iter().all(|(_, p)| p.node == merge.name));
	}
}
