use crate::flow::{EdgeId, Graph, Node, NodeId, Position};

pub const HANDLE_RADIUS: f64 = 6.0;
/// Pick distance for edges, in world space.
pub const EDGE_HIT: f64 = 6.0;

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Position,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// A connection being dragged out of a node's output handle.
#[derive(Clone, Debug)]
pub struct LinkDraft {
	pub source: NodeId,
	pub to: Position,
}

#[derive(Clone, Debug, Default)]
pub struct CanvasState {
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub link: Option<LinkDraft>,
	pub width: f64,
	pub height: f64,
}

pub fn output_handle(node: &Node) -> Position {
	Position::new(node.position.x + node.size.width, node.position.y + node.size.height / 2.0)
}

pub fn input_handle(node: &Node) -> Position {
	Position::new(node.position.x, node.position.y + node.size.height / 2.0)
}

fn distance(a: Position, b: Position) -> f64 {
	((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

fn distance_to_segment(p: Position, a: Position, b: Position) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len_sq = dx * dx + dy * dy;
	if len_sq < f64::EPSILON {
		return distance(p, a);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
	distance(p, Position::new(a.x + t * dx, a.y + t * dy))
}

impl CanvasState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			..Self::default()
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Position {
		Position::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under the pointer; later nodes draw above earlier ones.
	pub fn node_at(&self, graph: &Graph, sx: f64, sy: f64) -> Option<NodeId> {
		let p = self.screen_to_graph(sx, sy);
		graph.nodes.iter().rev().find(|n| n.contains(p)).map(|n| n.id.clone())
	}

	/// Node whose output handle is under the pointer.
	pub fn handle_at(&self, graph: &Graph, sx: f64, sy: f64) -> Option<NodeId> {
		let p = self.screen_to_graph(sx, sy);
		graph
			.nodes
			.iter()
			.rev()
			.find(|n| distance(p, output_handle(n)) <= HANDLE_RADIUS * 1.5)
			.map(|n| n.id.clone())
	}

	pub fn edge_at(&self, graph: &Graph, sx: f64, sy: f64) -> Option<EdgeId> {
		let p = self.screen_to_graph(sx, sy);
		graph
			.edges
			.iter()
			.find(|e| {
				let (Some(s), Some(t)) = (graph.node(&e.source), graph.node(&e.target)) else {
					return false;
				};
				distance_to_segment(p, output_handle(s), input_handle(t)) <= EDGE_HIT
			})
			.map(|e| e.id.clone())
	}

	/// Zooms around the pointer.
	pub fn zoom(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::flow::{Connection, GraphStore, NodeTemplate, Placement};

	fn graph() -> (Graph, NodeId, NodeId) {
		let mut store = GraphStore::with_seed(Placement::default(), 3);
		let template = NodeTemplate::new("t", "customNode", "T");
		let a = store.add_node(&template, Some(Position::new(0.0, 0.0))).id;
		let b = store.add_node(&template, Some(Position::new(400.0, 0.0))).id;
		store.connect(Connection::between(a.clone(), b.clone()));
		(store.graph().clone(), a, b)
	}

	#[test]
	fn hit_testing_respects_transform() {
		let (graph, a, b) = graph();
		let mut state = CanvasState::new(800.0, 600.0);
		assert_eq!(state.node_at(&graph, 10.0, 10.0), Some(a));
		state.transform = ViewTransform { x: 100.0, y: 0.0, k: 2.0 };
		assert_eq!(state.node_at(&graph, 10.0, 10.0), None);
		assert_eq!(state.node_at(&graph, 100.0 + 800.0 + 2.0, 2.0), Some(b));
	}

	#[test]
	fn edges_are_picked_along_their_segment() {
		let (graph, ..) = graph();
		let state = CanvasState::new(800.0, 600.0);
		assert!(state.edge_at(&graph, 300.0, 62.0).is_some());
		assert!(state.edge_at(&graph, 300.0, 200.0).is_none());
	}

	#[test]
	fn zoom_is_clamped() {
		let mut state = CanvasState::new(800.0, 600.0);
		for _ in 0..100 {
			state.zoom(0.0, 0.0, -1.0);
		}
		assert_eq!(state.transform.k, 10.0);
	}
}
