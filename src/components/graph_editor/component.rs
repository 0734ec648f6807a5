use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window,
};

use super::editor::GraphEditor;
use super::events::EditorEvent;
use super::graph::MemoryGraph;
use super::positions::SavedLayout;
use super::render;
use super::settings::EditorSettings;
use super::types::{GraphData, Point};

const MIDDLE_BUTTON: i16 = 1;
const NEW_NODE_TYPE: &str = "Node";

struct CanvasState {
	editor: GraphEditor<MemoryGraph>,
	width: f64,
	height: f64,
	flow_time: f64,
	/// Last pointer position, in screen space.
	pointer: Point,
}

impl CanvasState {
	/// Mounts widgets, resolves dirty edges and hands queued notifications to `on_event`.
	fn update(&mut self, dt: f64) -> Vec<EditorEvent> {
		self.editor.tick(dt);
		self.flow_time += dt;
		self.editor.sync_widgets();
		self.editor.process_anchors();
		self.editor.drain_events()
	}

	fn handle_key(&mut self, key: &str) {
		let selected = self.editor.selected().cloned();
		let result = match (key, selected) {
			("Delete" | "Backspace", Some(node)) => self.editor.remove_node(&node),
			("d", Some(node)) => self.editor.duplicate(&node, false).map(|_| ()),
			("D", Some(node)) => self.editor.duplicate(&node, true).map(|_| ()),
			("e", Some(node)) => self.editor.execute(&node),
			("s", Some(node)) => self.editor.submit(&node),
			("c", Some(node)) => self.editor.clear_data(&node),
			("x", _) => self.editor.stop_execution(),
			("n", _) => {
				let spawn = self.editor.screen_to_world(self.pointer);
				self.editor.add_new_node(NEW_NODE_TYPE, spawn).map(|_| ())
			}
			("f", _) => {
				self.editor.fit_all((self.width, self.height));
				Ok(())
			}
			("l", _) => self.editor.relayout().map(|_| ()),
			("m", _) => {
				let toggled = !self.editor.use_min_depth();
				self.editor.set_use_min_depth(toggled);
				Ok(())
			}
			_ => Ok(()),
		};
		if let Err(err) = result {
			warn!("{key}: {err}");
		}
	}
}

fn pointer_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> Point {
	let rect = canvas.get_bounding_client_rect();
	Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn dispatch(events: Vec<EditorEvent>, on_event: Option<Callback<EditorEvent>>) {
	for event in events {
		debug!("editor event: {event:?}");
		if let Some(callback) = on_event {
			callback.run(event);
		}
	}
}

#[component]
pub fn GraphEditorCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] settings: Option<EditorSettings>,
	/// Saved positions to restore instead of running the initial auto layout.
	#[prop(optional)]
	layout: Option<SavedLayout>,
	#[prop(optional, into)] on_event: Option<Callback<EditorEvent>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<CanvasState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = if fullscreen {
			(
				window.inner_width().unwrap().as_f64().unwrap(),
				window.inner_height().unwrap().as_f64().unwrap(),
			)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		let mut editor = GraphEditor::new(
			MemoryGraph::from_data(&data.get()),
			settings.clone().unwrap_or_default(),
		);
		if let Some(saved) = layout.clone() {
			editor.hydrate(saved);
		}
		editor.sync_widgets();
		editor.fit_all((w, h));
		*state_init.borrow_mut() = Some(CanvasState {
			editor,
			width: w,
			height: h,
			flow_time: 0.0,
			pointer: Point::new(w / 2.0, h / 2.0),
		});

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let win: Window = web_sys::window().unwrap();
				let (nw, nh) = (
					win.inner_width().unwrap().as_f64().unwrap(),
					win.inner_height().unwrap().as_f64().unwrap(),
				);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.width = nw;
					s.height = nh;
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let events = match *state_anim.borrow_mut() {
				Some(ref mut s) => {
					let events = s.update(0.016);
					render::render(&s.editor, &ctx, s.width, s.height, s.flow_time);
					events
				}
				None => Vec::new(),
			};
			dispatch(events, on_event);
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let _ = canvas.focus();
		let p = pointer_position(&canvas, &ev);

		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer = p;
			if ev.button() == MIDDLE_BUTTON || (ev.button() == 0 && ev.alt_key()) {
				ev.prevent_default();
				s.editor.begin_pan(p);
			} else if ev.button() == 0 {
				if let Some(node) = s.editor.click(p) {
					s.editor.begin_node_drag(&node, p);
				}
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let p = pointer_position(&canvas, &ev);

		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer = p;
			if s.editor.is_dragging() {
				s.editor.drag_to(p);
			} else {
				let hovered = s.editor.node_at(p);
				s.editor.set_hover(hovered);
				s.editor.pan_to(p);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.editor.end_drag();
			s.editor.end_pan();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.editor.end_drag();
			s.editor.end_pan();
			s.editor.set_hover(None);
		}
	};

	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let p = pointer_position(&canvas, &ev);
		if let Some(ref mut s) = *state_dc.borrow_mut() {
			s.editor.double_click(p);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let p = pointer_position(&canvas, &ev);

		if let Some(ref mut s) = *state_wh.borrow_mut() {
			// browsers report positive deltas when scrolling down, i.e. zooming out
			s.editor.zoom(p, -ev.delta_y());
		}
	};

	let state_kd = state.clone();
	let on_keydown = move |ev: KeyboardEvent| {
		if let Some(ref mut s) = *state_kd.borrow_mut() {
			s.handle_key(&ev.key());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-editor-canvas"
			tabindex="0"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			on:keydown=on_keydown
			style="display: block; outline: none; cursor: default;"
		/>
	}
}
