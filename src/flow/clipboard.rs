use super::ids;
use super::types::Node;

/// Deep copies of the most recently copied nodes.
///
/// Contents survive any number of pastes and unrelated graph edits; only the
/// next copy replaces them.
#[derive(Clone, Debug, Default)]
pub struct Clipboard {
	nodes: Vec<Node>,
}

impl Clipboard {
	pub fn copy<'a>(&mut self, nodes: impl IntoIterator<Item = &'a Node>) {
		self.nodes = nodes.into_iter().cloned().collect();
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Fresh duplicates of the copied nodes, shifted by `offset` on both axes.
	pub fn paste(&self, offset: f64) -> Vec<Node> {
		self.nodes.iter().map(|node| duplicate(node, offset)).collect()
	}
}

fn duplicate(node: &Node, offset: f64) -> Node {
	let mut copy = node.clone();
	copy.id = ids::node_id();
	copy.data.instance_id = ids::instance_id();
	copy.position = node.position.offset(offset);
	copy
}
