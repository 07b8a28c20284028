//! Snapshot-based undo/redo.
//!
//! The history never observes the store. Whoever performs a user-level action
//! records exactly one snapshot of the graph as it was before the action.

use std::collections::VecDeque;

use super::types::Graph;

#[derive(Debug, Default)]
pub struct History {
	/// Oldest first.
	undo: VecDeque<Graph>,
	/// Most recently undone last.
	redo: Vec<Graph>,
	/// Maximum undo depth; `None` keeps everything.
	limit: Option<usize>,
}

impl History {
	pub fn new(limit: Option<usize>) -> Self {
		Self {
			limit,
			..Self::default()
		}
	}

	/// Pushes the pre-mutation state and discards any redo branch.
	pub fn record(&mut self, before: Graph) {
		self.push_undo(before);
		self.redo.clear();
	}

	/// Steps back: returns the snapshot to restore, keeping `current` for redo.
	pub fn undo(&mut self, current: &Graph) -> Option<Graph> {
		let snapshot = self.undo.pop_back()?;
		self.redo.push(current.clone());
		Some(snapshot)
	}

	/// Steps forward: returns the snapshot to restore, keeping `current` for undo.
	pub fn redo(&mut self, current: &Graph) -> Option<Graph> {
		let snapshot = self.redo.pop()?;
		self.push_undo(current.clone());
		Some(snapshot)
	}

	pub fn can_undo(&self) -> bool {
		!self.undo.is_empty()
	}

	pub fn can_redo(&self) -> bool {
		!self.redo.is_empty()
	}

	pub fn undo_depth(&self) -> usize {
		self.undo.len()
	}

	pub fn redo_depth(&self) -> usize {
		self.redo.len()
	}

	pub fn clear(&mut self) {
		self.undo.clear();
		self.redo.clear();
	}

	fn push_undo(&mut self, snapshot: Graph) {
		self.undo.push_back(snapshot);
		if let Some(limit) = self.limit {
			while self.undo.len() > limit {
				self.undo.pop_front();
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::flow::types::{Edge, EdgeData, EdgeId, EdgeRoute, NodeId};

	fn graph(tag: &str) -> Graph {
		Graph {
			nodes: Vec::new(),
			edges: vec![Edge {
				id: EdgeId::new(tag),
				source: NodeId::new("a"),
				target: NodeId::new("b"),
				source_handle: None,
				target_handle: None,
				route: EdgeRoute::Custom,
				data: EdgeData::default(),
			}],
		}
	}

	#[test]
	fn starts_empty_and_ignores_undo() {
		let mut history = History::default();
		assert!(!history.can_undo());
		assert_eq!(history.undo(&graph("now")), None);
		assert_eq!(history.redo(&graph("now")), None);
	}

	#[test]
	fn undo_then_redo_swaps_states() {
		let mut history = History::default();
		history.record(graph("v0"));
		assert_eq!(history.undo(&graph("v1")), Some(graph("v0")));
		assert!(history.can_redo());
		assert_eq!(history.redo(&graph("v0")), Some(graph("v1")));
		assert_eq!(history.undo_depth(), 1);
		assert_eq!(history.redo_depth(), 0);
	}

	#[test]
	fn recording_after_undo_drops_redo_branch() {
		let mut history = History::default();
		history.record(graph("v0"));
		history.record(graph("v1"));
		history.undo(&graph("v2")).unwrap();
		history.record(graph("v1"));
		assert!(!history.can_redo());
	}

	#[test]
	fn limit_drops_oldest_snapshots() {
		let mut history = History::new(Some(2));
		for tag in ["v0", "v1", "v2"] {
			history.record(graph(tag));
		}
		assert_eq!(history.undo_depth(), 2);
		assert_eq!(history.undo(&graph("v3")), Some(graph("v2")));
		assert_eq!(history.undo(&graph("v2")), Some(graph("v1")));
		assert!(!history.can_undo());
	}
}
