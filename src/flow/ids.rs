use uuid::Uuid;

use super::types::{EdgeId, FieldId, NodeId};

/// Marks a template id as user-authored (editable and deletable).
pub const CUSTOM_TEMPLATE_PREFIX: &str = "custom_";

pub fn node_id() -> NodeId {
	NodeId::new(format!("node-{}", Uuid::new_v4()))
}

pub fn edge_id() -> EdgeId {
	EdgeId::new(format!("e-{}", Uuid::new_v4()))
}

pub fn field_id() -> FieldId {
	FieldId::new(format!("field-{}", Uuid::new_v4().simple()))
}

pub fn instance_id() -> String {
	Uuid::new_v4().to_string()
}

pub fn custom_template_id() -> String {
	format!("{CUSTOM_TEMPLATE_PREFIX}{}", Uuid::new_v4().simple())
}

pub fn is_custom_template(id: &str) -> bool {
	id.starts_with(CUSTOM_TEMPLATE_PREFIX)
}

/// Entropy for seeding placement RNGs, drawn from the same source as ids.
pub fn entropy_seed() -> u64 {
	Uuid::new_v4().as_u64_pair().0
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	#[test]
	fn ids_do_not_collide_across_calls() {
		let ids: HashSet<_> = (0..1000).map(|_| node_id()).collect();
		assert_eq!(ids.len(), 1000);
	}

	#[test]
	fn custom_ids_carry_prefix() {
		let id = custom_template_id();
		assert!(is_custom_template(&id));
		assert!(!is_custom_template("builtin_note"));
	}
}
