//! Authoring custom node templates.

use super::ids;
use super::types::{Field, FieldId, FieldKind, FieldPatch, FieldType, NodeTemplate};

/// Renderer kind given to every user-authored template.
pub const CUSTOM_NODE_KIND: &str = "customNode";

const DEFAULT_COLOR: &str = "#ffffff";

/// A template being created or edited in the builder form.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateDraft {
	editing: Option<NodeTemplate>,
	pub label: String,
	pub color: String,
	fields: Vec<Field>,
}

impl Default for TemplateDraft {
	fn default() -> Self {
		Self {
			editing: None,
			label: String::new(),
			color: DEFAULT_COLOR.to_owned(),
			fields: Vec::new(),
		}
	}
}

impl TemplateDraft {
	pub fn edit(template: &NodeTemplate) -> Self {
		Self {
			editing: Some(template.clone()),
			label: template.label.clone(),
			color: template.color.clone().unwrap_or_else(|| DEFAULT_COLOR.to_owned()),
			fields: template.fields.clone(),
		}
	}

	pub fn is_editing(&self) -> bool {
		self.editing.is_some()
	}

	pub fn fields(&self) -> &[Field] {
		&self.fields
	}

	/// Appends an empty field labelled after its type.
	pub fn add_field(&mut self, field_type: FieldType) -> FieldId {
		let id = ids::field_id();
		self.fields.push(Field::new(
			id.clone(),
			format!("{field_type} field"),
			FieldKind::empty(field_type),
		));
		id
	}

	pub fn update_field(&mut self, id: &FieldId, patch: FieldPatch) -> bool {
		self.fields
			.iter_mut()
			.find(|f| &f.id == id)
			.is_some_and(|f| f.apply(patch))
	}

	pub fn remove_field(&mut self, id: &FieldId) -> bool {
		let before = self.fields.len();
		self.fields.retain(|f| &f.id != id);
		self.fields.len() != before
	}

	/// The finished template. Editing keeps the original id and kind; a new
	/// template gets a fresh `custom_` id.
	pub fn build(&self) -> NodeTemplate {
		let (id, kind, width, height) = match &self.editing {
			Some(t) => (t.id.clone(), t.kind.clone(), t.width, t.height),
			None => (ids::custom_template_id(), CUSTOM_NODE_KIND.to_owned(), None, None),
		};
		NodeTemplate {
			id,
			kind,
			label: self.label.trim().to_owned(),
			color: Some(self.color.clone()),
			fields: self.fields.clone(),
			width,
			height,
			custom: true,
		}
	}
}

/// Splits the builder's comma-separated options input.
pub fn parse_options(input: &str) -> Vec<String> {
	input
		.split(',')
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_owned)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::flow::ids::is_custom_template;

	#[test]
	fn new_fields_are_typed_and_empty() {
		let mut draft = TemplateDraft::default();
		draft.add_field(FieldType::Text);
		let checkbox = draft.add_field(FieldType::Checkbox);
		assert_eq!(draft.fields().len(), 2);
		assert_eq!(draft.fields()[0].label, "text field");
		assert_eq!(draft.fields()[1].label, "checkbox field");
		assert_eq!(draft.fields()[1].kind, FieldKind::empty(FieldType::Checkbox));

		assert!(draft.update_field(&checkbox, FieldPatch::Options(parse_options("a, b,,c"))));
		assert_eq!(draft.fields()[1].kind.options(), ["a", "b", "c"]);
		assert!(draft.remove_field(&checkbox));
		assert!(!draft.remove_field(&checkbox));
	}

	#[test]
	fn build_assigns_custom_id_for_new_templates() {
		let mut draft = TemplateDraft::default();
		draft.label = "  Review ".into();
		let template = draft.build();
		assert!(is_custom_template(&template.id));
		assert_eq!(template.kind, CUSTOM_NODE_KIND);
		assert_eq!(template.label, "Review");
		assert_eq!(template.color.as_deref(), Some("#ffffff"));
		assert!(template.custom);
	}

	#[test]
	fn editing_keeps_identity() {
		let mut original = NodeTemplate::new("custom_abc", "customNode", "Old");
		original.color = Some("#123456".into());
		let mut draft = TemplateDraft::edit(&original);
		assert!(draft.is_editing());
		assert_eq!(draft.color, "#123456");
		draft.label = "New".into();
		let rebuilt = draft.build();
		assert_eq!(rebuilt.id, "custom_abc");
		assert_eq!(rebuilt.label, "New");
	}
}
