//! Pan/zoom transform between screen space and world space.
//!
//! A world point `w` is drawn at `w * k + (x, y)` on screen.

use log::debug;

use super::settings::EditorSettings;
use super::types::{Point, Rect};

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug)]
pub struct Viewport {
	pub transform: ViewTransform,
	pub pan: PanState,
	min_zoom: f64,
	max_zoom: f64,
	zoom_factor: f64,
}

impl Viewport {
	pub fn new(settings: &EditorSettings) -> Self {
		Self {
			transform: ViewTransform::default(),
			pan: PanState::default(),
			min_zoom: settings.min_zoom,
			max_zoom: settings.max_zoom,
			zoom_factor: settings.zoom_factor,
		}
	}

	pub fn scale(&self) -> f64 {
		self.transform.k
	}

	pub fn offset(&self) -> Point {
		Point::new(self.transform.x, self.transform.y)
	}

	pub fn screen_to_world(&self, p: Point) -> Point {
		Point::new(
			(p.x - self.transform.x) / self.transform.k,
			(p.y - self.transform.y) / self.transform.k,
		)
	}

	pub fn world_to_screen(&self, p: Point) -> Point {
		Point::new(
			p.x * self.transform.k + self.transform.x,
			p.y * self.transform.k + self.transform.y,
		)
	}

	/// Zooms one wheel step toward `cursor` (screen space). Positive deltas zoom in.
	///
	/// Returns whether the viewport moved; a step that clamps back to the
	/// current scale leaves the transform untouched.
	pub fn zoom(&mut self, cursor: Point, wheel_delta: f64) -> bool {
		if wheel_delta == 0.0 || !wheel_delta.is_finite() {
			return false;
		}
		let factor = if wheel_delta > 0.0 {
			self.zoom_factor
		} else {
			1.0 / self.zoom_factor
		};
		let old_k = self.transform.k;
		let new_k = (old_k * factor).clamp(self.min_zoom, self.max_zoom);
		if new_k == old_k {
			return false;
		}
		let anchor = self.screen_to_world(cursor);
		let ratio = new_k / old_k;
		self.transform.x += (1.0 - ratio) * anchor.x * old_k;
		self.transform.y += (1.0 - ratio) * anchor.y * old_k;
		self.transform.k = new_k;
		true
	}

	pub fn begin_pan(&mut self, screen: Point) {
		self.pan = PanState {
			active: true,
			start_x: screen.x,
			start_y: screen.y,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	/// Moves the view so the point grabbed in [`begin_pan`](Self::begin_pan) follows `screen`.
	pub fn pan_to(&mut self, screen: Point) -> bool {
		if !self.pan.active {
			return false;
		}
		let (x, y) = (
			self.pan.transform_start_x + (screen.x - self.pan.start_x),
			self.pan.transform_start_y + (screen.y - self.pan.start_y),
		);
		let moved = x != self.transform.x || y != self.transform.y;
		self.transform.x = x;
		self.transform.y = y;
		moved
	}

	/// Shifts the view by a screen-space delta; ignored unless a pan gesture is active.
	pub fn pan_by(&mut self, delta: Point) -> bool {
		if !self.pan.active || (delta.x == 0.0 && delta.y == 0.0) {
			return false;
		}
		self.transform.x += delta.x;
		self.transform.y += delta.y;
		true
	}

	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	/// Scales and centres `content` (world space) inside a viewport of `size`.
	///
	/// Degenerate content or viewport sizes leave the transform unchanged.
	pub fn fit(&mut self, size: (f64, f64), content: Rect) -> bool {
		let (width, height) = size;
		if content.is_degenerate() || !(width > 0.0 && height > 0.0) {
			debug!("fit skipped: viewport {width}x{height}, content {content:?}");
			return false;
		}
		let k = (width / content.width)
			.min(height / content.height)
			.clamp(self.min_zoom, self.max_zoom);
		let center = content.center();
		let next = ViewTransform {
			x: width / 2.0 - center.x * k,
			y: height / 2.0 - center.y * k,
			k,
		};
		if next == self.transform {
			return false;
		}
		self.transform = next;
		true
	}
}
