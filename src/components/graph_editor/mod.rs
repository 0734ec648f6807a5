//! Pipeline graph editor: view-model engine and its canvas component.

mod anchors;
mod component;
mod editor;
mod error;
mod events;
mod graph;
mod layout;
mod pins;
mod positions;
mod render;
mod settings;
mod types;
mod viewport;
mod widget;

pub use component::GraphEditorCanvas;
pub use events::EditorEvent;
pub use types::{GraphData, GraphLink, GraphNode};
