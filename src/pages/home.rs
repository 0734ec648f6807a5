use leptos::prelude::*;
use log::info;

use crate::components::graph_editor::{
	EditorEvent, GraphData, GraphEditorCanvas, GraphLink, GraphNode,
};

fn node(node_type: &str, inputs: &[&str], outputs: &[&str]) -> GraphNode {
	GraphNode {
		node_type: node_type.into(),
		inputs: inputs.iter().map(|s| s.to_string()).collect(),
		outputs: outputs.iter().map(|s| s.to_string()).collect(),
	}
}

fn link(source: usize, output: &str, target: usize, input: &str) -> GraphLink {
	GraphLink {
		source: (source, output.into()),
		target: (target, input.into()),
	}
}

/// A photogrammetry pipeline, from camera intrinsics to a textured mesh.
fn sample_pipeline() -> GraphData {
	let nodes = vec![
		node("CameraInit", &[], &["output"]),
		node("FeatureExtraction", &["input"], &["output"]),
		node("ImageMatching", &["input", "featuresFolder"], &["output"]),
		node("FeatureMatching", &["input", "featuresFolder", "imagePairsList"], &["output"]),
		node("StructureFromMotion", &["input", "featuresFolder", "matchesFolder"], &["output"]),
		node("PrepareDenseScene", &["input"], &["output"]),
		node("DepthMap", &["input", "imagesFolder"], &["output"]),
		node("DepthMapFilter", &["input", "depthMapFolder"], &["output"]),
		node("Meshing", &["input", "depthMapFolder"], &["output"]),
		node("MeshFiltering", &["input"], &["output"]),
		node("Texturing", &["input", "imagesFolder", "inputMesh"], &["output"]),
	];
	let links = vec![
		link(0, "output", 1, "input"),
		link(0, "output", 2, "input"),
		link(1, "output", 2, "featuresFolder"),
		link(2, "output", 3, "imagePairsList"),
		link(0, "output", 3, "input"),
		link(1, "output", 3, "featuresFolder"),
		link(0, "output", 4, "input"),
		link(1, "output", 4, "featuresFolder"),
		link(3, "output", 4, "matchesFolder"),
		link(4, "output", 5, "input"),
		link(4, "output", 6, "input"),
		link(5, "output", 6, "imagesFolder"),
		link(4, "output", 7, "input"),
		link(6, "output", 7, "depthMapFolder"),
		link(4, "output", 8, "input"),
		link(7, "output", 8, "depthMapFolder"),
		link(8, "output", 9, "input"),
		link(4, "output", 10, "input"),
		link(5, "output", 10, "imagesFolder"),
		link(9, "output", 10, "inputMesh"),
	];
	GraphData { nodes, links }
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::derive(sample_pipeline);
	let (selected, set_selected) = signal(String::from("none"));
	let on_event = Callback::new(move |event: EditorEvent| match event {
		EditorEvent::SelectionChanged(node) => {
			set_selected.set(node.map(|n| n.to_string()).unwrap_or_else(|| "none".into()));
		}
		EditorEvent::NodeDoubleClicked(node) => info!("open {node}"),
		_ => {}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<GraphEditorCanvas data=graph_data fullscreen=true on_event=on_event />
				<div class="graph-overlay">
					<h1>"Pipeline Graph"</h1>
					<p class="subtitle">
						"Middle-drag or Alt-drag to pan. Scroll to zoom. F fits, L re-lays out, M toggles min depth. D duplicates, Shift+D with downstream, N adds a node, Del removes. E executes, S submits, X stops."
					</p>
					<p class="subtitle">"Selected: " {selected}</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
