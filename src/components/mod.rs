// The canvas binds only part of the editor's operations.
#[allow(dead_code)]
pub mod graph_editor;
