//! `FlowEditor` is the object the presentation layer holds: it composes the
//! graph store, history and clipboard with the current selection, and turns
//! each user-level action into exactly one history entry.

use std::collections::BTreeSet;

use log::{debug, info};

use super::clipboard::Clipboard;
use super::history::History;
use super::keymap::Command;
use super::store::GraphStore;
use super::types::{
	Connection, EdgeDataPatch, EdgeId, EdgeStyle, FieldId, FieldKind, FieldPatch, FieldValue,
	Graph, Node, NodeDataPatch, NodeId, NodeTemplate, Position,
};
use crate::config::EditorConfig;

/// Currently selected elements. Both slots may be set by a confused UI; the
/// node wins wherever that matters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
	pub node: Option<NodeId>,
	pub edge: Option<EdgeId>,
}

impl Selection {
	pub fn is_empty(&self) -> bool {
		self.node.is_none() && self.edge.is_none()
	}
}

/// An in-flight drag: the graph as it was when the pointer went down.
struct Drag {
	node: NodeId,
	before: Graph,
}

pub struct FlowEditor {
	store: GraphStore,
	history: History,
	clipboard: Clipboard,
	selection: Selection,
	drag: Option<Drag>,
	paste_offset: f64,
}

impl FlowEditor {
	pub fn new(config: &EditorConfig) -> Self {
		Self::with_store(config, GraphStore::new(config.placement()))
	}

	pub fn with_store(config: &EditorConfig, store: GraphStore) -> Self {
		Self {
			store,
			history: History::new(config.history_limit),
			clipboard: Clipboard::default(),
			selection: Selection::default(),
			drag: None,
			paste_offset: config.paste_offset,
		}
	}

	/// Starts from a previously saved diagram without recording history.
	pub fn restore(&mut self, graph: Graph) {
		info!(
			"restored diagram with {} nodes and {} edges",
			graph.nodes.len(),
			graph.edges.len()
		);
		self.store.replace(graph);
	}

	pub fn graph(&self) -> &Graph {
		self.store.graph()
	}

	pub fn selection(&self) -> &Selection {
		&self.selection
	}

	pub fn selected_node(&self) -> Option<&Node> {
		self.selection.node.as_ref().and_then(|id| self.graph().node(id))
	}

	pub fn history(&self) -> &History {
		&self.history
	}

	pub fn clipboard(&self) -> &Clipboard {
		&self.clipboard
	}

	pub fn can_undo(&self) -> bool {
		self.history.can_undo()
	}

	pub fn can_redo(&self) -> bool {
		self.history.can_redo()
	}

	pub fn select_node(&mut self, id: NodeId) {
		self.selection = Selection {
			node: Some(id),
			edge: None,
		};
	}

	pub fn select_edge(&mut self, id: EdgeId) {
		self.selection = Selection {
			node: None,
			edge: Some(id),
		};
	}

	pub fn clear_selection(&mut self) {
		self.selection = Selection::default();
	}

	/// Runs `op` against the store and records the prior graph if it reports
	/// a change.
	fn record<T>(&mut self, op: impl FnOnce(&mut GraphStore) -> Option<T>) -> Option<T> {
		let before = self.store.graph().clone();
		let out = op(&mut self.store);
		if out.is_some() {
			self.history.record(before);
		}
		out
	}

	fn record_if(&mut self, op: impl FnOnce(&mut GraphStore) -> bool) -> bool {
		self.record(|store| op(store).then_some(())).is_some()
	}

	pub fn add_node(&mut self, template: &NodeTemplate) -> NodeId {
		let before = self.store.graph().clone();
		let id = self.store.add_node(template, None).id;
		self.history.record(before);
		id
	}

	pub fn connect(&mut self, connection: Connection) -> Option<EdgeId> {
		self.record(|store| store.connect(connection).map(|edge| edge.id))
	}

	pub fn delete_node(&mut self, id: &NodeId) -> bool {
		let removed = self.record_if(|store| store.delete_node(id));
		if removed {
			if self.selection.node.as_ref() == Some(id) {
				self.selection.node = None;
			}
			let graph = self.store.graph();
			if self.selection.edge.as_ref().is_some_and(|e| graph.edge(e).is_none()) {
				self.selection.edge = None;
			}
		}
		removed
	}

	pub fn delete_edge(&mut self, id: &EdgeId) -> bool {
		let removed = self.record_if(|store| store.delete_edge(id));
		if removed && self.selection.edge.as_ref() == Some(id) {
			self.selection.edge = None;
		}
		removed
	}

	/// Deletes the selected node, or else the selected edge.
	pub fn delete_selected(&mut self) -> bool {
		if let Some(node) = self.selection.node.clone() {
			return self.delete_node(&node);
		}
		if let Some(edge) = self.selection.edge.clone() {
			return self.delete_edge(&edge);
		}
		false
	}

	pub fn update_node_field(&mut self, node: &NodeId, field: &FieldId, patch: FieldPatch) -> bool {
		self.record_if(|store| store.update_node_field(node, field, patch))
	}

	pub fn toggle_field_hidden(&mut self, node: &NodeId, field: &FieldId) -> bool {
		let Some(hidden) = self.field_kind_and_hide(node, field).map(|(_, hide)| hide) else {
			return false;
		};
		self.update_node_field(node, field, FieldPatch::Hide(!hidden))
	}

	/// Adds or removes one option from a checkbox field's value set.
	pub fn toggle_checkbox_option(&mut self, node: &NodeId, field: &FieldId, option: &str) -> bool {
		let Some((FieldKind::Checkbox { mut value, .. }, _)) = self.field_kind_and_hide(node, field)
		else {
			return false;
		};
		if !value.remove(option) {
			value.insert(option.to_owned());
		}
		self.update_node_field(node, field, FieldPatch::Value(FieldValue::Choices(value)))
	}

	fn field_kind_and_hide(&self, node: &NodeId, field: &FieldId) -> Option<(FieldKind, bool)> {
		let field = self.graph().node(node)?.data.field(field)?;
		Some((field.kind.clone(), field.hide))
	}

	pub fn update_node_data(&mut self, node: &NodeId, patch: NodeDataPatch) -> bool {
		self.record_if(|store| store.update_node_data(node, patch))
	}

	pub fn update_edge_data(&mut self, edge: &EdgeId, patch: EdgeDataPatch) -> bool {
		self.record_if(|store| store.update_edge_data(edge, patch))
	}

	pub fn update_edge_type(&mut self, edge: &EdgeId, style: EdgeStyle) -> bool {
		self.record_if(|store| store.update_edge_type(edge, style))
	}

	/// Pointer went down on a node; positions change freely until `end_drag`.
	pub fn begin_drag(&mut self, node: NodeId) -> bool {
		if !self.graph().contains_node(&node) {
			return false;
		}
		self.drag = Some(Drag {
			node,
			before: self.store.graph().clone(),
		});
		true
	}

	pub fn drag_to(&mut self, position: Position) -> bool {
		match &self.drag {
			Some(drag) => self.store.move_node(&drag.node, position),
			None => false,
		}
	}

	/// Finishes a drag, recording one history entry if the node moved.
	pub fn end_drag(&mut self) -> bool {
		let Some(drag) = self.drag.take() else {
			return false;
		};
		let moved = drag.before.node(&drag.node).map(|n| n.position)
			!= self.graph().node(&drag.node).map(|n| n.position);
		if moved {
			self.history.record(drag.before);
		}
		moved
	}

	pub fn copy_selected(&mut self) -> bool {
		let Some(node) = self.selected_node().cloned() else {
			return false;
		};
		debug!("copied node {}", node.id);
		self.clipboard.copy([&node]);
		true
	}

	/// Inserts duplicates of the clipboard as a single undoable action.
	pub fn paste(&mut self) -> Vec<NodeId> {
		let pasted = self.clipboard.paste(self.paste_offset);
		if pasted.is_empty() {
			return Vec::new();
		}
		self.record(|store| {
			Some(
				pasted
					.into_iter()
					.map(|node| {
						let id = node.id.clone();
						store.insert_node(node);
						id
					})
					.collect(),
			)
		})
		.unwrap_or_default()
	}

	pub fn undo(&mut self) -> bool {
		let Some(snapshot) = self.history.undo(self.store.graph()) else {
			return false;
		};
		self.store.replace(snapshot);
		self.clear_selection();
		true
	}

	pub fn redo(&mut self) -> bool {
		let Some(snapshot) = self.history.redo(self.store.graph()) else {
			return false;
		};
		self.store.replace(snapshot);
		self.clear_selection();
		true
	}

	/// File → New.
	pub fn new_graph(&mut self) -> bool {
		let cleared = self.record_if(GraphStore::clear);
		if cleared {
			self.clear_selection();
		}
		cleared
	}

	/// Replaces the diagram with an imported one as a single undoable action.
	pub fn load_graph(&mut self, graph: Graph) {
		info!(
			"loading diagram with {} nodes and {} edges",
			graph.nodes.len(),
			graph.edges.len()
		);
		self.record(|store| Some(store.replace(graph)));
		self.clear_selection();
	}

	/// Routes a keyboard command. Returns true if the graph or clipboard changed.
	pub fn dispatch(&mut self, command: Command) -> bool {
		debug!("dispatch {command:?}");
		match command {
			Command::Copy => self.copy_selected(),
			Command::Paste => !self.paste().is_empty(),
			Command::Undo => self.undo(),
			Command::Redo => self.redo(),
			Command::DeleteSelected => self.delete_selected(),
		}
	}
}

/// Values currently ticked in a checkbox field, for views.
pub fn checked_options(kind: &FieldKind) -> BTreeSet<String> {
	match kind {
		FieldKind::Checkbox { value, .. } => value.clone(),
		_ => BTreeSet::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::flow::store::Placement;
	use crate::flow::types::{Field, FieldType};

	fn editor() -> FlowEditor {
		let config = EditorConfig::default();
		FlowEditor::with_store(&config, GraphStore::with_seed(Placement::default(), 1))
	}

	fn template() -> NodeTemplate {
		NodeTemplate::new("builtin_task", "customNode", "Task").with_field(Field::new(
			FieldId::new("tags"),
			"Tags",
			FieldKind::Checkbox {
				options: vec!["a".into(), "b".into()],
				value: BTreeSet::new(),
			},
		))
	}

	#[test]
	fn each_action_records_one_snapshot() {
		let mut ed = editor();
		let a = ed.add_node(&template());
		let b = ed.add_node(&template());
		ed.connect(Connection::between(a.clone(), b));
		assert_eq!(ed.history().undo_depth(), 3);
	}

	#[test]
	fn no_op_actions_leave_history_alone() {
		let mut ed = editor();
		assert!(!ed.delete_node(&NodeId::new("ghost")));
		assert!(ed.connect(Connection::default()).is_none());
		assert!(!ed.new_graph());
		assert!(!ed.can_undo());
	}

	#[test]
	fn delete_selected_prefers_node() {
		let mut ed = editor();
		let a = ed.add_node(&template());
		let edge = ed.connect(Connection::between(a.clone(), a.clone())).unwrap();
		ed.selection = Selection {
			node: Some(a.clone()),
			edge: Some(edge.clone()),
		};
		assert!(ed.delete_selected());
		assert!(ed.graph().nodes.is_empty());
		assert!(ed.graph().edges.is_empty());
		assert!(ed.selection().is_empty());
	}

	#[test]
	fn paste_is_one_undo_step() {
		let mut ed = editor();
		let a = ed.add_node(&template());
		ed.select_node(a.clone());
		assert!(ed.copy_selected());
		let depth = ed.history().undo_depth();

		let pasted = ed.paste();
		assert_eq!(pasted.len(), 1);
		assert_eq!(ed.history().undo_depth(), depth + 1);
		let original = ed.graph().node(&a).unwrap().position;
		let copy = ed.graph().node(&pasted[0]).unwrap().position;
		assert_eq!(copy, original.offset(20.0));

		assert!(ed.undo());
		assert_eq!(ed.graph().nodes.len(), 1);
	}

	#[test]
	fn drag_records_once_when_moved() {
		let mut ed = editor();
		let a = ed.add_node(&template());
		let depth = ed.history().undo_depth();
		assert!(ed.begin_drag(a.clone()));
		ed.drag_to(Position::new(1.0, 1.0));
		ed.drag_to(Position::new(5.0, 9.0));
		assert!(ed.end_drag());
		assert_eq!(ed.history().undo_depth(), depth + 1);

		assert!(ed.begin_drag(a.clone()));
		assert!(!ed.end_drag());
		assert_eq!(ed.history().undo_depth(), depth + 1);
	}

	#[test]
	fn checkbox_and_visibility_toggles() {
		let mut ed = editor();
		let a = ed.add_node(&template());
		let tags = FieldId::new("tags");
		assert!(ed.toggle_checkbox_option(&a, &tags, "b"));
		assert!(ed.toggle_field_hidden(&a, &tags));
		let field = ed.graph().node(&a).unwrap().data.field(&tags).unwrap().clone();
		assert!(field.hide);
		assert_eq!(checked_options(&field.kind), BTreeSet::from(["b".to_owned()]));

		assert!(ed.toggle_checkbox_option(&a, &tags, "b"));
		let field = ed.graph().node(&a).unwrap().data.field(&tags).unwrap().clone();
		assert!(checked_options(&field.kind).is_empty());
	}

	#[test]
	fn undo_clears_selection() {
		let mut ed = editor();
		let a = ed.add_node(&template());
		ed.select_node(a);
		assert!(ed.undo());
		assert!(ed.selection().is_empty());
		assert!(ed.graph().nodes.is_empty());
	}

	#[test]
	fn toggling_a_non_checkbox_field_is_ignored() {
		let mut ed = editor();
		let tmpl = NodeTemplate::new("t", "customNode", "T").with_field(Field::new(
			FieldId::new("name"),
			"Name",
			FieldKind::empty(FieldType::Text),
		));
		let a = ed.add_node(&tmpl);
		assert!(!ed.toggle_checkbox_option(&a, &FieldId::new("name"), "x"));
	}
}
