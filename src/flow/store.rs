//! The canonical node/edge collections and the structural operations on them.
//!
//! Every update locates its target by id and leaves everything else in place.
//! An id that no longer exists is a silent no-op: UI handlers can fire after
//! the element they refer to is gone. Callers learn whether anything changed
//! from the returned `bool`/`Option`.

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::ids;
use super::types::{
	Connection, Edge, EdgeData, EdgeDataPatch, EdgeId, EdgeRoute, EdgeStyle, FieldId, FieldPatch,
	Graph, Node, NodeData, NodeDataPatch, NodeId, NodeTemplate, Position, Size,
};

/// Defaults applied when a node is created from a template.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
	pub default_size: Size,
	/// New nodes land in `[0, spawn_extent)` on both axes.
	pub spawn_extent: f64,
}

impl Default for Placement {
	fn default() -> Self {
		Self {
			default_size: Size::default(),
			spawn_extent: 400.0,
		}
	}
}

pub struct GraphStore {
	graph: Graph,
	placement: Placement,
	rng: SmallRng,
}

impl GraphStore {
	pub fn new(placement: Placement) -> Self {
		Self::with_seed(placement, ids::entropy_seed())
	}

	/// A store whose random placements are reproducible.
	pub fn with_seed(placement: Placement, seed: u64) -> Self {
		Self {
			graph: Graph::default(),
			placement,
			rng: SmallRng::seed_from_u64(seed),
		}
	}

	pub fn graph(&self) -> &Graph {
		&self.graph
	}

	pub fn nodes(&self) -> &[Node] {
		&self.graph.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.graph.edges
	}

	/// Swaps in a whole graph (restore, import, undo), returning the old one.
	pub fn replace(&mut self, graph: Graph) -> Graph {
		std::mem::replace(&mut self.graph, graph)
	}

	/// Instantiates `template` as a new node. Without `at` the node is placed
	/// at a random spot inside the spawn region.
	pub fn add_node(&mut self, template: &NodeTemplate, at: Option<Position>) -> Node {
		let position = at.unwrap_or_else(|| self.random_position());
		let node = Node {
			id: ids::node_id(),
			kind: template.kind.clone(),
			position,
			size: Size {
				width: template.width.unwrap_or(self.placement.default_size.width),
				height: template.height.unwrap_or(self.placement.default_size.height),
			},
			data: NodeData {
				label: template.label.clone(),
				color: template.color.clone().unwrap_or_else(|| "#ffffff".to_owned()),
				fields: template.fields.clone(),
				instance_id: ids::instance_id(),
				template_id: Some(template.id.clone()),
			},
		};
		debug!("add node {} from template {}", node.id, template.id);
		self.graph.nodes.push(node.clone());
		node
	}

	/// Appends an already-built node, e.g. a pasted duplicate.
	pub fn insert_node(&mut self, node: Node) {
		debug!("insert node {}", node.id);
		self.graph.nodes.push(node);
	}

	pub fn update_node_field(&mut self, node_id: &NodeId, field_id: &FieldId, patch: FieldPatch) -> bool {
		self.node_mut(node_id)
			.and_then(|node| node.data.fields.iter_mut().find(|f| &f.id == field_id))
			.is_some_and(|field| field.apply(patch))
	}

	pub fn update_node_data(&mut self, node_id: &NodeId, patch: NodeDataPatch) -> bool {
		let Some(node) = self.node_mut(node_id) else {
			return false;
		};
		match patch {
			NodeDataPatch::Label(label) => node.data.label = label,
			NodeDataPatch::Color(color) => node.data.color = color,
		}
		true
	}

	pub fn move_node(&mut self, node_id: &NodeId, position: Position) -> bool {
		let Some(node) = self.node_mut(node_id) else {
			return false;
		};
		node.position = position;
		true
	}

	/// Removes the node and every edge that references it.
	pub fn delete_node(&mut self, node_id: &NodeId) -> bool {
		let before = self.graph.nodes.len();
		self.graph.nodes.retain(|n| &n.id != node_id);
		if self.graph.nodes.len() == before {
			return false;
		}
		let edges_before = self.graph.edges.len();
		self.graph.edges.retain(|e| !e.touches(node_id));
		debug!(
			"delete node {node_id} (cascaded {} edges)",
			edges_before - self.graph.edges.len()
		);
		true
	}

	/// Creates an edge for a completed connect gesture.
	///
	/// Rejected when either end is missing, empty or not a node in the graph.
	/// Self-loops are allowed.
	pub fn connect(&mut self, connection: Connection) -> Option<Edge> {
		let source = connection.source.filter(|id| !id.is_empty())?;
		let target = connection.target.filter(|id| !id.is_empty())?;
		if !self.graph.contains_node(&source) || !self.graph.contains_node(&target) {
			debug!("connect {source} -> {target} ignored: unknown endpoint");
			return None;
		}
		let edge = Edge {
			id: ids::edge_id(),
			source,
			target,
			source_handle: connection.source_handle,
			target_handle: connection.target_handle,
			route: EdgeRoute::Custom,
			data: EdgeData::default(),
		};
		debug!("connect {} -> {} as {}", edge.source, edge.target, edge.id);
		self.graph.edges.push(edge.clone());
		Some(edge)
	}

	pub fn delete_edge(&mut self, edge_id: &EdgeId) -> bool {
		let before = self.graph.edges.len();
		self.graph.edges.retain(|e| &e.id != edge_id);
		self.graph.edges.len() != before
	}

	pub fn update_edge_data(&mut self, edge_id: &EdgeId, patch: EdgeDataPatch) -> bool {
		let Some(edge) = self.edge_mut(edge_id) else {
			return false;
		};
		match patch {
			EdgeDataPatch::Label(label) => edge.data.label = label,
			EdgeDataPatch::Style(style) => edge.data.style = style,
			EdgeDataPatch::Color(color) => edge.data.color = color,
		}
		true
	}

	/// Sets the curve style and forces the routing tag to `Custom`.
	pub fn update_edge_type(&mut self, edge_id: &EdgeId, style: EdgeStyle) -> bool {
		let Some(edge) = self.edge_mut(edge_id) else {
			return false;
		};
		edge.route = EdgeRoute::Custom;
		edge.data.style = style;
		true
	}

	/// Empties the diagram. Returns false if it was already empty.
	pub fn clear(&mut self) -> bool {
		if self.graph.is_empty() {
			return false;
		}
		self.graph = Graph::default();
		true
	}

	fn random_position(&mut self) -> Position {
		let extent = self.placement.spawn_extent.max(f64::EPSILON);
		Position::new(self.rng.gen_range(0.0..extent), self.rng.gen_range(0.0..extent))
	}

	fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
		self.graph.nodes.iter_mut().find(|n| &n.id == id)
	}

	fn edge_mut(&mut self, id: &EdgeId) -> Option<&mut Edge> {
		self.graph.edges.iter_mut().find(|e| &e.id == id)
	}
}
