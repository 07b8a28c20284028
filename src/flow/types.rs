//! Diagram data model: form-carrying nodes, styled edges and node templates.
//!
//! The serialized shapes are the ones written to local storage and to
//! exported `graph.json` documents, so field renames here are format changes.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Reads an identifier written either as a JSON string or as a bare number
/// (timestamp-style ids); numbers keep their JSON text form.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Text(String),
		Number(serde_json::Number),
	}
	Ok(match Raw::deserialize(deserializer)? {
		Raw::Text(text) => text,
		Raw::Number(number) => number.to_string(),
	})
}

macro_rules! string_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
		#[serde(transparent)]
		pub struct $name(String);

		impl<'de> Deserialize<'de> for $name {
			fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
				string_or_number(deserializer).map(Self)
			}
		}

		impl $name {
			/// Wraps an existing identifier.
			pub fn new(id: impl Into<String>) -> Self {
				Self(id.into())
			}

			/// Returns the identifier as a string slice.
			pub fn as_str(&self) -> &str {
				&self.0
			}

			/// True for the empty identifier, which never names a live element.
			pub fn is_empty(&self) -> bool {
				self.0.trim().is_empty()
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl From<&str> for $name {
			fn from(id: &str) -> Self {
				Self(id.to_owned())
			}
		}
	};
}

string_id!(
	/// Identifier of a placed node, stable for the node's lifetime.
	NodeId
);
string_id!(
	/// Identifier of an edge, assigned at connection time.
	EdgeId
);
string_id!(
	/// Identifier of a field, unique within its owning node.
	FieldId
);

/// Canvas-space coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

impl Position {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Returns this position shifted by `delta` on both axes.
	pub fn offset(self, delta: f64) -> Self {
		Self::new(self.x + delta, self.y + delta)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
	pub width: f64,
	pub height: f64,
}

impl Default for Size {
	fn default() -> Self {
		Self {
			width: 200.0,
			height: 120.0,
		}
	}
}

/// Form control kinds, without their payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
	Text,
	Dropdown,
	Radio,
	Checkbox,
}

impl FieldType {
	pub const ALL: [FieldType; 4] = [Self::Text, Self::Dropdown, Self::Radio, Self::Checkbox];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Text => "text",
			Self::Dropdown => "dropdown",
			Self::Radio => "radio",
			Self::Checkbox => "checkbox",
		}
	}
}

impl fmt::Display for FieldType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A field's control kind together with the value shape that kind carries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
	Text {
		#[serde(default)]
		value: String,
	},
	Dropdown {
		#[serde(default)]
		options: Vec<String>,
		#[serde(default)]
		value: String,
	},
	Radio {
		#[serde(default)]
		options: Vec<String>,
		#[serde(default)]
		value: String,
	},
	Checkbox {
		#[serde(default)]
		options: Vec<String>,
		#[serde(default)]
		value: BTreeSet<String>,
	},
}

impl FieldKind {
	/// An unset control of the given type with no options.
	pub fn empty(field_type: FieldType) -> Self {
		match field_type {
			FieldType::Text => Self::Text {
				value: String::new(),
			},
			FieldType::Dropdown => Self::Dropdown {
				options: Vec::new(),
				value: String::new(),
			},
			FieldType::Radio => Self::Radio {
				options: Vec::new(),
				value: String::new(),
			},
			FieldType::Checkbox => Self::Checkbox {
				options: Vec::new(),
				value: BTreeSet::new(),
			},
		}
	}

	pub fn field_type(&self) -> FieldType {
		match self {
			Self::Text { .. } => FieldType::Text,
			Self::Dropdown { .. } => FieldType::Dropdown,
			Self::Radio { .. } => FieldType::Radio,
			Self::Checkbox { .. } => FieldType::Checkbox,
		}
	}

	/// Choice list; always empty for text fields.
	pub fn options(&self) -> &[String] {
		match self {
			Self::Text { .. } => &[],
			Self::Dropdown { options, .. }
			| Self::Radio { options, .. }
			| Self::Checkbox { options, .. } => options,
		}
	}
}

/// A replacement value for a field; must match the field's value shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
	Text(String),
	Choices(BTreeSet<String>),
}

/// One keyed attribute of a field to replace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldPatch {
	Label(String),
	Hide(bool),
	Options(Vec<String>),
	Value(FieldValue),
}

/// One form control inside a node's payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
	pub id: FieldId,
	pub label: String,
	#[serde(default)]
	pub hide: bool,
	#[serde(flatten)]
	pub kind: FieldKind,
}

impl Field {
	pub fn new(id: FieldId, label: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			id,
			label: label.into(),
			hide: false,
			kind,
		}
	}

	/// Applies `patch`, returning false when the patch does not fit this
	/// field's kind (options on a text field, a set value on a dropdown, ...).
	pub fn apply(&mut self, patch: FieldPatch) -> bool {
		match patch {
			FieldPatch::Label(label) => self.label = label,
			FieldPatch::Hide(hide) => self.hide = hide,
			FieldPatch::Options(new_options) => match &mut self.kind {
				FieldKind::Text { .. } => return false,
				FieldKind::Dropdown { options, .. }
				| FieldKind::Radio { options, .. }
				| FieldKind::Checkbox { options, .. } => *options = new_options,
			},
			FieldPatch::Value(new_value) => match (&mut self.kind, new_value) {
				(FieldKind::Text { value }, FieldValue::Text(v))
				| (FieldKind::Dropdown { value, .. }, FieldValue::Text(v))
				| (FieldKind::Radio { value, .. }, FieldValue::Text(v)) => *value = v,
				(FieldKind::Checkbox { value, .. }, FieldValue::Choices(v)) => *value = v,
				_ => return false,
			},
		}
		true
	}
}

fn default_color() -> String {
	"#ffffff".to_owned()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
	#[serde(default)]
	pub label: String,
	#[serde(default = "default_color")]
	pub color: String,
	#[serde(default)]
	pub fields: Vec<Field>,
	/// Distinguishes this placement from its template; scopes radio groups.
	#[serde(default, deserialize_with = "string_or_number")]
	pub instance_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub template_id: Option<String>,
}

impl NodeData {
	pub fn field(&self, id: &FieldId) -> Option<&Field> {
		self.fields.iter().find(|f| &f.id == id)
	}
}

/// One top-level key of a node's payload to replace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeDataPatch {
	Label(String),
	Color(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	pub id: NodeId,
	/// Which renderer or template produced the node.
	#[serde(rename = "type")]
	pub kind: String,
	pub position: Position,
	#[serde(flatten)]
	pub size: Size,
	pub data: NodeData,
}

impl Node {
	pub fn contains(&self, point: Position) -> bool {
		point.x >= self.position.x
			&& point.x <= self.position.x + self.size.width
			&& point.y >= self.position.y
			&& point.y <= self.position.y + self.size.height
	}

	pub fn center(&self) -> Position {
		Position::new(
			self.position.x + self.size.width / 2.0,
			self.position.y + self.size.height / 2.0,
		)
	}
}

/// Visual curve of an edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
	#[default]
	Bezier,
	Straight,
	Smoothstep,
}

impl EdgeStyle {
	pub const ALL: [EdgeStyle; 3] = [Self::Bezier, Self::Straight, Self::Smoothstep];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Bezier => "bezier",
			Self::Straight => "straight",
			Self::Smoothstep => "smoothstep",
		}
	}

	pub fn parse(s: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|style| style.as_str() == s)
	}
}

/// Render-routing tag. Edges created or retyped by the editor are always
/// `Custom`; anything else read from a document collapses to `Default`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeRoute {
	#[default]
	Custom,
	#[serde(other)]
	Default,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
	#[serde(default)]
	pub label: String,
	#[serde(rename = "type", default)]
	pub style: EdgeStyle,
	#[serde(default)]
	pub color: Option<String>,
}

/// One key of an edge's payload to replace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeDataPatch {
	Label(String),
	Style(EdgeStyle),
	Color(Option<String>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
	pub id: EdgeId,
	pub source: NodeId,
	pub target: NodeId,
	#[serde(default)]
	pub source_handle: Option<String>,
	#[serde(default)]
	pub target_handle: Option<String>,
	#[serde(rename = "type", default)]
	pub route: EdgeRoute,
	#[serde(default)]
	pub data: EdgeData,
}

impl Edge {
	pub fn touches(&self, node: &NodeId) -> bool {
		&self.source == node || &self.target == node
	}
}

/// A connect gesture as reported by the canvas; either end may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Connection {
	pub source: Option<NodeId>,
	pub target: Option<NodeId>,
	pub source_handle: Option<String>,
	pub target_handle: Option<String>,
}

impl Connection {
	pub fn between(source: NodeId, target: NodeId) -> Self {
		Self {
			source: Some(source),
			target: Some(target),
			..Self::default()
		}
	}
}

/// The whole diagram; also the snapshot unit for undo/redo and the document
/// format for export, import and local storage.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
}

impl Graph {
	pub fn node(&self, id: &NodeId) -> Option<&Node> {
		self.nodes.iter().find(|n| &n.id == id)
	}

	pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
		self.edges.iter().find(|e| &e.id == id)
	}

	pub fn contains_node(&self, id: &NodeId) -> bool {
		self.node(id).is_some()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}
}

/// A reusable node blueprint, built in or authored by the user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeTemplate {
	#[serde(deserialize_with = "string_or_number")]
	pub id: String,
	#[serde(rename = "type")]
	pub kind: String,
	pub label: String,
	#[serde(default)]
	pub color: Option<String>,
	#[serde(default)]
	pub fields: Vec<Field>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub width: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub height: Option<f64>,
	#[serde(default)]
	pub custom: bool,
}

impl NodeTemplate {
	pub fn new(id: impl Into<String>, kind: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			kind: kind.into(),
			label: label.into(),
			color: None,
			fields: Vec::new(),
			width: None,
			height: None,
			custom: false,
		}
	}

	pub fn with_field(mut self, field: Field) -> Self {
		self.fields.push(field);
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn field_kind_serializes_with_type_tag() {
		let field = Field::new(
			FieldId::new("f1"),
			"Pick",
			FieldKind::Radio {
				options: vec!["a".into(), "b".into()],
				value: "a".into(),
			},
		);
		let value = serde_json::to_value(&field).unwrap();
		assert_eq!(
			value,
			json!({"id": "f1", "label": "Pick", "hide": false, "type": "radio", "options": ["a", "b"], "value": "a"})
		);
	}

	#[test]
	fn numeric_ids_read_as_text() {
		let field: Field = serde_json::from_value(
			json!({"id": 1712345678901u64, "label": "Count", "type": "text", "value": ""}),
		)
		.unwrap();
		assert_eq!(field.id, FieldId::new("1712345678901"));

		let data: NodeData =
			serde_json::from_value(json!({"label": "N", "instanceId": 1712345678901.123})).unwrap();
		assert_eq!(data.instance_id, "1712345678901.123");

		assert!(serde_json::from_value::<FieldId>(json!(true)).is_err());
	}

	#[test]
	fn text_field_ignores_stray_options_on_read() {
		let field: Field = serde_json::from_value(
			json!({"id": "t", "label": "Name", "type": "text", "options": [], "value": "x"}),
		)
		.unwrap();
		assert_eq!(
			field.kind,
			FieldKind::Text {
				value: "x".into()
			}
		);
		assert!(!field.hide);
	}

	#[test]
	fn checkbox_value_reads_as_set() {
		let field: Field = serde_json::from_value(json!({
			"id": "c", "label": "Tags", "type": "checkbox",
			"options": ["a", "b"], "value": ["b", "a", "b"]
		}))
		.unwrap();
		let FieldKind::Checkbox { value, .. } = field.kind else {
			panic!("expected checkbox");
		};
		assert_eq!(value.len(), 2);
	}

	#[test]
	fn patch_rejects_mismatched_value_shape() {
		let mut field = Field::new(FieldId::new("t"), "Name", FieldKind::empty(FieldType::Text));
		assert!(!field.apply(FieldPatch::Value(FieldValue::Choices(BTreeSet::new()))));
		assert!(!field.apply(FieldPatch::Options(vec!["a".into()])));
		assert!(field.apply(FieldPatch::Value(FieldValue::Text("hi".into()))));
		assert_eq!(
			field.kind,
			FieldKind::Text {
				value: "hi".into()
			}
		);
	}

	#[test]
	fn node_size_is_flattened() {
		let node = Node {
			id: NodeId::new("n"),
			kind: "customNode".into(),
			position: Position::new(1.0, 2.0),
			size: Size::default(),
			data: NodeData {
				label: "L".into(),
				color: default_color(),
				fields: Vec::new(),
				instance_id: "i".into(),
				template_id: None,
			},
		};
		let value = serde_json::to_value(&node).unwrap();
		assert_eq!(value["width"], json!(200.0));
		assert_eq!(value["type"], json!("customNode"));
		assert_eq!(value["data"]["instanceId"], json!("i"));
	}

	#[test]
	fn unknown_edge_route_collapses_to_default() {
		let edge: Edge = serde_json::from_value(json!({
			"id": "e", "source": "a", "target": "b", "type": "smoothstep"
		}))
		.unwrap();
		assert_eq!(edge.route, EdgeRoute::Default);
		assert_eq!(edge.data, EdgeData::default());
	}
}
