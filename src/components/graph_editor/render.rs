use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::editor::GraphEditor;
use super::graph::{GraphModel, GraphMutator};
use super::types::{ComputeStatus, NodeData, NodeId, Point};
use super::widget::{HEADER_HEIGHT, PIN_RADIUS};

const BACKGROUND: &str = "#1e1e24";
const EDGE_COLOR: &str = "rgba(180, 180, 190, 0.85)";

fn status_color(status: ComputeStatus) -> &'static str {
	match status {
		ComputeStatus::None => "#3c3c46",
		ComputeStatus::Submitted => "#7a5ba8",
		ComputeStatus::Success => "#3d8a4f",
	}
}

pub fn render<G: GraphModel + GraphMutator>(
	editor: &GraphEditor<G>,
	ctx: &CanvasRenderingContext2d,
	width: f64,
	height: f64,
	flow_time: f64,
) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.save();
	let transform = &editor.viewport.transform;
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);
	draw_edges(editor, ctx, flow_time);
	draw_nodes(editor, ctx);
	ctx.restore();
}

/// Offset between where a node is drawn and where it logically is.
fn motion_offset<G: GraphModel + GraphMutator>(editor: &GraphEditor<G>, node: &NodeId) -> Point {
	match (editor.rendered_position(node), editor.node_position(node)) {
		(Some(rendered), Some(logical)) => rendered - logical,
		_ => Point::ZERO,
	}
}

fn draw_edges<G: GraphModel + GraphMutator>(
	editor: &GraphEditor<G>,
	ctx: &CanvasRenderingContext2d,
	flow_time: f64,
) {
	let k = editor.viewport.scale();
	let (dash, gap) = (8.0 / k, 4.0 / k);
	ctx.set_line_width(1.5 / k);
	ctx.set_stroke_style_str(EDGE_COLOR);

	for (_, edge) in editor.resolved_edges() {
		let src = edge.src + motion_offset(editor, &edge.src_node);
		let dst = edge.dst + motion_offset(editor, &edge.dst_node);
		let pending = editor
			.graph()
			.node_by_name(&edge.dst_node)
			.is_some_and(|n| n.status.is_pending());

		if pending {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(-(flow_time * 30.0) % (dash + gap));
		}
		let bend = ((dst.x - src.x).abs() / 2.0).max(40.0);
		ctx.begin_path();
		ctx.move_to(src.x, src.y);
		ctx.bezier_curve_to(src.x + bend, src.y, dst.x - bend, dst.y, dst.x, dst.y);
		ctx.stroke();
		if pending {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}
	}
}

fn draw_nodes<G: GraphModel + GraphMutator>(editor: &GraphEditor<G>, ctx: &CanvasRenderingContext2d) {
	let settings = editor.settings();
	let k = editor.viewport.scale();
	for node in editor.graph().nodes() {
		let Some(origin) = editor.rendered_position(&node.name) else {
			continue;
		};
		let selected = editor.selected() == Some(&node.name);
		let hovered = editor.hovered() == Some(&node.name);

		ctx.set_fill_style_str(status_color(node.status));
		ctx.fill_rect(origin.x, origin.y, settings.node_width, settings.node_height);
		ctx.set_fill_style_str("rgba(0, 0, 0, 0.25)");
		ctx.fill_rect(origin.x, origin.y, settings.node_width, HEADER_HEIGHT);

		if selected || hovered {
			ctx.set_stroke_style_str(if selected { "#5fa8ff" } else { "rgba(255, 255, 255, 0.5)" });
			ctx.set_line_width(2.0 / k);
			ctx.stroke_rect(origin.x, origin.y, settings.node_width, settings.node_height);
		}

		ctx.set_fill_style_str("white");
		ctx.set_font("12px sans-serif");
		let _ = ctx.fill_text(node.name.as_str(), origin.x + 6.0, origin.y + 15.0);
		draw_pins(editor, ctx, node, origin);
	}
}

fn draw_pins<G: GraphModel + GraphMutator>(
	editor: &GraphEditor<G>,
	ctx: &CanvasRenderingContext2d,
	node: &NodeData,
	origin: Point,
) {
	ctx.set_font("9px sans-serif");
	for attribute in &node.attributes {
		let Some(pin) = editor.pins().resolve(&attribute.id) else {
			continue;
		};
		let p = origin + pin.local_offset;
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, PIN_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(if attribute.is_output { "#9fd3ff" } else { "#d8d8d8" });
		ctx.fill();

		ctx.set_fill_style_str("rgba(255, 255, 255, 0.75)");
		let label_x = if attribute.is_output {
			p.x - 8.0 - attribute.name.len() as f64 * 5.0
		} else {
			p.x + 8.0
		};
		let _ = ctx.fill_text(&attribute.name, label_x, p.y + 3.0);
	}
}
