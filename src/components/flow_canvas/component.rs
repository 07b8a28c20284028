use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::viewport::{CanvasState, DragState, LinkDraft, PanState};
use crate::flow::{Connection, FlowEditor, Position};

type Shared<T> = Rc<RefCell<Option<T>>>;

/// Pointer position relative to the canvas' top-left corner.
fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?;
	let rect = canvas.get_bounding_client_rect();
	Some((ev.client_x() as f64 - rect.left(), ev.client_y() as f64 - rect.top()))
}

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((800.0, 600.0))
}

/// Draws the editor's graph and turns pointer gestures into editor calls:
/// click selects, dragging a node moves it, dragging from a node's right
/// handle onto another node connects them, dragging the background pans.
#[component]
pub fn FlowCanvas(editor: RwSignal<FlowEditor>) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Shared<CanvasState> = Rc::new(RefCell::new(None));
	let animate: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let resize_cb: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};
		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => return,
			},
			_ => {
				log::error!("2d canvas context unavailable");
				return;
			}
		};

		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		*state_init.borrow_mut() = Some(CanvasState::new(w, h));

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref s) = *state_anim.borrow() {
				editor.try_with_untracked(|ed| render::render(s, ed.graph(), ed.selection(), &ctx));
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let mut guard = state_md.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};

		let (handle, node, edge) = editor.with_untracked(|ed| {
			let graph = ed.graph();
			(
				s.handle_at(graph, x, y),
				s.node_at(graph, x, y),
				s.edge_at(graph, x, y),
			)
		});

		if let Some(source) = handle {
			s.link = Some(LinkDraft {
				source,
				to: s.screen_to_graph(x, y),
			});
		} else if let Some(node) = node {
			let node_start = editor
				.with_untracked(|ed| ed.graph().node(&node).map(|n| n.position))
				.unwrap_or_default();
			s.drag = DragState {
				active: true,
				start_x: x,
				start_y: y,
				node_start,
			};
			editor.update(|ed| {
				ed.select_node(node.clone());
				ed.begin_drag(node);
			});
		} else if let Some(edge) = edge {
			editor.update(|ed| ed.select_edge(edge));
		} else {
			editor.update(FlowEditor::clear_selection);
			s.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: s.transform.x,
				transform_start_y: s.transform.y,
			};
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if let Some(link) = s.link.as_mut() {
				link.to = Position::new(
					(x - s.transform.x) / s.transform.k,
					(y - s.transform.y) / s.transform.k,
				);
			} else if s.drag.active {
				let (dx, dy) = (
					(x - s.drag.start_x) / s.transform.k,
					(y - s.drag.start_y) / s.transform.k,
				);
				let to = Position::new(s.drag.node_start.x + dx, s.drag.node_start.y + dy);
				editor.update(|ed| {
					ed.drag_to(to);
				});
			} else if s.pan.active {
				s.transform.x = s.pan.transform_start_x + (x - s.pan.start_x);
				s.transform.y = s.pan.transform_start_y + (y - s.pan.start_y);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let point = local_point(canvas_ref, &ev);
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			if let Some(link) = s.link.take() {
				let target = point.and_then(|(x, y)| editor.with_untracked(|ed| s.node_at(ed.graph(), x, y)));
				editor.update(|ed| {
					ed.connect(Connection {
						source: Some(link.source),
						target,
						source_handle: Some("out".to_owned()),
						target_handle: Some("in".to_owned()),
					});
				});
			}
			if s.drag.active {
				editor.update(|ed| {
					ed.end_drag();
				});
			}
			s.drag = DragState::default();
			s.pan.active = false;
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			if s.drag.active {
				editor.update(|ed| {
					ed.end_drag();
				});
			}
			s.link = None;
			s.drag = DragState::default();
			s.pan.active = false;
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="flow-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: default;"
		/>
	}
}
