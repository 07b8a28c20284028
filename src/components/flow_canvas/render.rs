use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::viewport::{CanvasState, HANDLE_RADIUS, input_handle, output_handle};
use crate::flow::{EdgeStyle, FieldKind, Graph, Node, Position, Selection};

const BACKGROUND: &str = "#f4f5f7";
const EDGE_COLOR: &str = "#222222";
const SELECTED: &str = "#2563eb";
const LABEL_LINE: f64 = 18.0;

pub fn render(state: &CanvasState, graph: &Graph, selection: &Selection, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, graph, selection, ctx);
	draw_link_draft(state, graph, ctx);
	draw_nodes(state, graph, selection, ctx);
	ctx.restore();
}

fn draw_edges(state: &CanvasState, graph: &Graph, selection: &Selection, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	for edge in &graph.edges {
		let (Some(source), Some(target)) = (graph.node(&edge.source), graph.node(&edge.target)) else {
			continue;
		};
		let (from, to) = (output_handle(source), input_handle(target));
		let selected = selection.edge.as_ref() == Some(&edge.id);
		let color = if selected {
			SELECTED
		} else {
			edge.data.color.as_deref().unwrap_or(EDGE_COLOR)
		};

		ctx.set_stroke_style_str(color);
		ctx.set_line_width((if selected { 3.0 } else { 1.5 }) / k);
		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.begin_path();
		ctx.move_to(from.x, from.y);
		match edge.data.style {
			EdgeStyle::Straight => ctx.line_to(to.x, to.y),
			EdgeStyle::Bezier => {
				let bend = ((to.x - from.x).abs() / 2.0).max(40.0);
				ctx.bezier_curve_to(from.x + bend, from.y, to.x - bend, to.y, to.x, to.y);
			}
			EdgeStyle::Smoothstep => {
				let mid_x = (from.x + to.x) / 2.0;
				ctx.line_to(mid_x, from.y);
				ctx.line_to(mid_x, to.y);
				ctx.line_to(to.x, to.y);
			}
		}
		ctx.stroke();
		draw_arrow(ctx, to, color, 8.0 / k);

		if !edge.data.label.is_empty() {
			let mid = Position::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
			ctx.set_fill_style_str(color);
			ctx.set_font(&format!("{}px sans-serif", 12.0 / k.max(0.5)));
			let _ = ctx.fill_text(&edge.data.label, mid.x + 4.0, mid.y - 4.0);
		}
	}
}

/// Arrowhead pointing right into an input handle.
fn draw_arrow(ctx: &CanvasRenderingContext2d, tip: Position, color: &str, size: f64) {
	ctx.set_fill_style_str(color);
	ctx.begin_path();
	ctx.move_to(tip.x, tip.y);
	ctx.line_to(tip.x - size, tip.y - size / 2.0);
	ctx.line_to(tip.x - size, tip.y + size / 2.0);
	ctx.close_path();
	ctx.fill();
}

fn draw_link_draft(state: &CanvasState, graph: &Graph, ctx: &CanvasRenderingContext2d) {
	let Some(link) = &state.link else {
		return;
	};
	let Some(source) = graph.node(&link.source) else {
		return;
	};
	let from = output_handle(source);
	let k = state.transform.k;
	ctx.set_stroke_style_str(SELECTED);
	ctx.set_line_width(1.5 / k);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(6.0 / k),
		&JsValue::from_f64(4.0 / k),
	));
	ctx.begin_path();
	ctx.move_to(from.x, from.y);
	ctx.line_to(link.to.x, link.to.y);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(state: &CanvasState, graph: &Graph, selection: &Selection, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	for node in &graph.nodes {
		let selected = selection.node.as_ref() == Some(&node.id);
		let (x, y, w, h) = (node.position.x, node.position.y, node.size.width, node.size.height);

		ctx.set_fill_style_str(&node.data.color);
		ctx.fill_rect(x, y, w, h);
		ctx.set_stroke_style_str(if selected { SELECTED } else { "#555555" });
		ctx.set_line_width((if selected { 3.0 } else { 2.0 }) / k);
		ctx.stroke_rect(x, y, w, h);

		ctx.set_fill_style_str("#111111");
		ctx.set_font("bold 14px sans-serif");
		let _ = ctx.fill_text(&node.data.label, x + 10.0, y + 22.0);

		ctx.set_font("12px sans-serif");
		for (line, text) in field_lines(node).iter().enumerate() {
			let ty = y + 22.0 + LABEL_LINE * (line as f64 + 1.0);
			if ty > y + h - 6.0 {
				break;
			}
			let _ = ctx.fill_text(text, x + 10.0, ty);
		}

		for handle in [input_handle(node), output_handle(node)] {
			ctx.begin_path();
			let _ = ctx.arc(handle.x, handle.y, HANDLE_RADIUS, 0.0, std::f64::consts::TAU);
			ctx.set_fill_style_str("#555555");
			ctx.fill();
		}
	}
}

/// One summary line per visible field.
fn field_lines(node: &Node) -> Vec<String> {
	node.data
		.fields
		.iter()
		.filter(|f| !f.hide)
		.map(|f| {
			let value = match &f.kind {
				FieldKind::Text { value } | FieldKind::Dropdown { value, .. } | FieldKind::Radio { value, .. } => {
					value.clone()
				}
				FieldKind::Checkbox { value, .. } => value.iter().cloned().collect::<Vec<_>>().join(", "),
			};
			format!("{}: {}", f.label, value)
		})
		.collect()
}
