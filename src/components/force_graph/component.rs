//! Leptos component wrapping the club network canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel
//! event handlers for node dragging, panning, zooming and selection. An
//! animation loop runs via `requestAnimationFrame`; each frame feeds the
//! store's FPS sampler, advances the simulation at the cadence the
//! quality settings allow, re-runs the (throttled) culling pass after
//! viewport changes and renders with the current performance hints.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::Utc;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use crate::graph::store::GraphStore;

use super::render;
use super::scale::ScaleConfig;
use super::state::ForceGraphState;
use super::theme::Theme;

/// Bundles simulation state with visual configuration.
struct GraphContext {
	state: ForceGraphState,
	scale: ScaleConfig,
	theme: Theme,
}

/// Renders the interactive club network on a canvas element.
///
/// The component reads everything it shows from `store` and mutates it
/// only through the store's entry points (selection, state capture, the
/// frame/culling feeds). Bump `refresh` to rebuild the simulation after
/// the store's visible snapshot changes (load, filters, undo/redo). The
/// component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize with the window.
#[component]
pub fn ClubGraphCanvas(
	store: Rc<RefCell<GraphStore>>,
	#[prop(into)] refresh: Signal<u64>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let loop_started = Rc::new(Cell::new(false));
	// Cancel handle for the frame loop: cleared on unmount so the loop
	// stops re-scheduling itself instead of running forever.
	let running = Rc::new(Cell::new(true));

	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());
	let (store_init, loop_started_init) = (store.clone(), loop_started.clone());
	let running_init = running.clone();

	on_cleanup(move || running.set(false));

	Effect::new(move |_| {
		// Re-run whenever the caller signals new graph data.
		refresh.get();
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

		let theme;
		let pixel_ratio;
		let graph_state;
		{
			let store = store_init.borrow();
			theme = Theme::by_name(&store.config().theme);
			pixel_ratio = store.render_hints().pixel_ratio;
			let mut state = ForceGraphState::new(store.visible_snapshot(), w, h, &theme);
			state.set_selection(store.selected_nodes());
			graph_state = state;
		}

		size_canvas(&canvas, w, h, pixel_ratio);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();
		let _ = ctx.scale(pixel_ratio, pixel_ratio);

		*context_init.borrow_mut() = Some(GraphContext {
			state: graph_state,
			scale: ScaleConfig::default(),
			theme,
		});

		if loop_started_init.get() {
			return;
		}
		loop_started_init.set(true);

		if fullscreen {
			let (context_resize, canvas_resize, store_resize) = (
				context_init.clone(),
				canvas.clone(),
				store_init.clone(),
			);
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let win: Window = web_sys::window().unwrap();
				let (nw, nh) = (
					win.inner_width().unwrap().as_f64().unwrap(),
					win.inner_height().unwrap().as_f64().unwrap(),
				);
				let ratio = store_resize.borrow().render_hints().pixel_ratio;
				size_canvas(&canvas_resize, nw, nh, ratio);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.state.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner, store_anim, running_anim) = (
			context_init.clone(),
			animate_init.clone(),
			store_init.clone(),
			running_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !running_anim.get() {
				return;
			}
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				let mut store = store_anim.borrow_mut();
				let now_ms = js_sys::Date::now();

				// Feed the adaptive quality loop; it degrades or improves
				// once per completed sampling window.
				store.record_frame(now_ms);
				let hints = store.render_hints();
				let quality = store.quality_settings();

				let dt = 0.016;
				if c.state.animation_running {
					c.state.tick(dt as f32, quality.simulation_every_frames);
				}
				c.state.sync_visibility(&mut store, now_ms);

				let interacting = c.state.pan.active || c.state.drag.active;
				render::render(
					&c.state,
					&ctx,
					&c.scale,
					&c.theme,
					&hints,
					&quality,
					interacting,
				);
			}
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

	let (context_md, store_md) = (context.clone(), store.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut c) = *context_md.borrow_mut() {
			if let Some(idx) = c.state.node_at_position(x, y, &c.scale) {
				c.state.drag.active = true;
				c.state.drag.node_idx = Some(idx);
				c.state.drag.start_x = x;
				c.state.drag.start_y = y;
				let mut clicked_id = None;
				c.state.graph.visit_nodes(|node| {
					if node.index() == idx {
						c.state.drag.node_start_x = node.x();
						c.state.drag.node_start_y = node.y();
						clicked_id = Some(node.data.user_data.id);
					}
				});

				// Clicking a club selects it; the capture makes the
				// change undoable.
				if let Some(id) = clicked_id {
					let mut store = store_md.borrow_mut();
					store.set_selection(vec![id], Vec::new());
					store.save_state(Utc::now());
					c.state.set_selection(store.selected_nodes());
				}
			} else {
				c.state.pan.active = true;
				c.state.pan.start_x = x;
				c.state.pan.start_y = y;
				c.state.pan.transform_start_x = c.state.transform.x;
				c.state.pan.transform_start_y = c.state.transform.y;

				let mut store = store_md.borrow_mut();
				if !store.selected_nodes().is_empty() {
					store.set_selection(Vec::new(), Vec::new());
					store.save_state(Utc::now());
					c.state.set_selection(&[]);
				}
			}
		}
	};

	let context_dbl = context.clone();
	let store_dbl = store.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut c) = *context_dbl.borrow_mut() {
			let Some(idx) = c.state.node_at_position(x, y, &c.scale) else {
				c.state.clear_path();
				return;
			};
			let mut target = None;
			c.state.graph.visit_nodes(|node| {
				if node.index() == idx {
					target = Some(node.data.user_data.id);
				}
			});
			let store = store_dbl.borrow();
			if let (Some(&source), Some(target)) =
				(store.selected_nodes().first(), target)
			{
				// Trace the strongest route between the selected club and
				// the double-clicked one.
				let result = store.find_shortest_path(source, target);
				if result.exists {
					c.state.highlight_path(&result);
				} else {
					c.state.clear_path();
				}
			}
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut c) = *context_mm.borrow_mut() {
			// Update hover state when not dragging
			if !c.state.drag.active {
				let hovered = c.state.node_at_position(x, y, &c.scale);
				c.state.set_hover(hovered);
			}

			if c.state.drag.active {
				if let Some(idx) = c.state.drag.node_idx {
					let (dx, dy) = (
						(x - c.state.drag.start_x) / c.state.transform.k,
						(y - c.state.drag.start_y) / c.state.transform.k,
					);
					let (nx, ny) = (
						c.state.drag.node_start_x + dx as f32,
						c.state.drag.node_start_y + dy as f32,
					);
					c.state.graph.visit_nodes_mut(|node| {
						if node.index() == idx {
							node.data.x = nx;
							node.data.y = ny;
							node.data.is_anchor = true;
						}
					});
				}
			} else if c.state.pan.active {
				c.state.transform.x = c.state.pan.transform_start_x + (x - c.state.pan.start_x);
				c.state.transform.y = c.state.pan.transform_start_y + (y - c.state.pan.start_y);
				c.state.viewport_dirty = true;
			}
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			if c.state.drag.active {
				if let Some(idx) = c.state.drag.node_idx {
					c.state.graph.visit_nodes_mut(|node| {
						if node.index() == idx {
							node.data.is_anchor = true;
						}
					});
				}
			}
			c.state.drag.active = false;
			c.state.drag.node_idx = None;
			c.state.pan.active = false;
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.drag.active = false;
			c.state.drag.node_idx = None;
			c.state.pan.active = false;
			c.state.set_hover(None);
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (c.state.transform.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / c.state.transform.k;
			c.state.transform.x = x - (x - c.state.transform.x) * ratio;
			c.state.transform.y = y - (y - c.state.transform.y) * ratio;
			c.state.transform.k = new_k;
			c.state.viewport_dirty = true;
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="club-graph-canvas"
			on:mousedown=on_mousedown
			on:dblclick=on_dblclick
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

/// Size the canvas backing store by the mode's pixel ratio while keeping
/// its CSS size in layout pixels.
fn size_canvas(canvas: &HtmlCanvasElement, w: f64, h: f64, pixel_ratio: f64) {
	canvas.set_width((w * pixel_ratio) as u32);
	canvas.set_height((h * pixel_ratio) as u32);
	let html_el: &web_sys::HtmlElement = canvas.as_ref();
	let style = html_el.style();
	let _ = style.set_property("width", &format!("{w}px"));
	let _ = style.set_property("height", &format!("{h}px"));
}
