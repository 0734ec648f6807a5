use serde::{Deserialize, Serialize};

/// Tunables shared by the viewport, the layout engine and node widgets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
	pub node_width: f64,
	pub node_height: f64,
	pub grid_spacing: f64,
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Scale multiplier applied per wheel step.
	pub zoom_factor: f64,
	/// Group layout columns by `min_depth` instead of `depth`.
	pub use_min_depth: bool,
	/// Default transition mode for position writes.
	pub animate: bool,
	/// Approach rate of animated positions, per second.
	pub animation_speed: f64,
}

impl Default for EditorSettings {
	fn default() -> Self {
		Self {
			node_width: 140.0,
			node_height: 80.0,
			grid_spacing: 15.0,
			min_zoom: 0.1,
			max_zoom: 2.0,
			zoom_factor: 1.15,
			use_min_depth: true,
			animate: true,
			animation_speed: 8.0,
		}
	}
}

impl EditorSettings {
	pub fn clamp_zoom(&self, scale: f64) -> f64 {
		scale.clamp(self.min_zoom, self.max_zoom)
	}

	/// Horizontal distance between two adjacent layout columns.
	pub fn column_step(&self) -> f64 {
		self.node_width + self.grid_spacing
	}

	/// Vertical distance between two adjacent layout rows.
	pub fn row_step(&self) -> f64 {
		self.node_height + self.grid_spacing
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_falls_back_to_defaults() {
		let settings: EditorSettings =
			serde_json::from_str(r#"{ "grid_spacing": 30.0, "use_min_depth": false }"#).unwrap();
		assert_eq!(settings.grid_spacing, 30.0);
		assert!(!settings.use_min_depth);
		assert_eq!(settings.node_width, 140.0);
		assert_eq!(settings.max_zoom, 2.0);
	}

	#[test]
	fn steps_include_spacing() {
		let settings = EditorSettings::default();
		assert_eq!(settings.column_step(), 155.0);
		assert_eq!(settings.row_step(), 95.0);
		assert_eq!(settings.clamp_zoom(5.0), 2.0);
		assert_eq!(settings.clamp_zoom(0.01), 0.1);
	}
}
