//! End-to-end editing sessions against the public editor API.

use std::collections::BTreeSet;

use flow_editor::config::EditorConfig;
use flow_editor::flow::builder::TemplateDraft;
use flow_editor::flow::keymap::{self, KeyChord};
use flow_editor::flow::templates::{MemoryTemplateStore, builtin_templates, save_and_refresh};
use flow_editor::flow::{
	Connection, EdgeDataPatch, EdgeRoute, EdgeStyle, Field, FieldId, FieldKind, FieldPatch,
	FieldType, FieldValue, FlowEditor, MemoryStorage, NodeDataPatch, NodeId, NodeTemplate,
	Persistence, Size, TemplatePalette,
};
use futures::executor::block_on;
use pretty_assertions::assert_eq;

fn editor() -> FlowEditor {
	FlowEditor::new(&EditorConfig::default())
}

fn text_template() -> NodeTemplate {
	NodeTemplate::new("text", "text", "Text").with_field(Field::new(
		FieldId::new("body"),
		"Body",
		FieldKind::empty(FieldType::Text),
	))
}

#[test]
fn add_node_then_self_loop() {
	let mut editor = editor();
	let n1 = editor.add_node(&text_template());

	let node = editor.graph().node(&n1).cloned().expect("node was added");
	assert_eq!(editor.graph().nodes.len(), 1);
	assert!(!node.id.is_empty());
	assert_eq!(node.size, Size { width: 200.0, height: 120.0 });
	assert!((0.0..=400.0).contains(&node.position.x));
	assert!((0.0..=400.0).contains(&node.position.y));

	let edge = editor
		.connect(Connection::between(n1.clone(), n1.clone()))
		.expect("self-loops are allowed");
	let edge = editor.graph().edge(&edge).expect("edge was added");
	assert_eq!(edge.source, n1);
	assert_eq!(edge.target, n1);
	assert_eq!(edge.route, EdgeRoute::Custom);
}

#[test]
fn incomplete_connections_are_ignored() {
	let mut editor = editor();
	let a = editor.add_node(&text_template());
	let before = editor.graph().clone();

	let attempts = [
		Connection {
			source: Some(a.clone()),
			..Connection::default()
		},
		Connection {
			target: Some(a.clone()),
			..Connection::default()
		},
		Connection::between(a.clone(), NodeId::new("")),
		Connection::between(a.clone(), NodeId::new("node-missing")),
	];
	for connection in attempts {
		assert_eq!(editor.connect(connection), None);
	}
	assert_eq!(editor.graph(), &before);
	assert_eq!(editor.history().undo_depth(), 1);
}

#[test]
fn stale_ids_change_nothing() {
	let mut editor = editor();
	editor.add_node(&text_template());
	let before = editor.graph().clone();
	let missing = NodeId::new("node-gone");

	assert!(!editor.update_node_field(
		&missing,
		&FieldId::new("body"),
		FieldPatch::Value(FieldValue::Text("x".into()))
	));
	assert!(!editor.update_node_data(&missing, NodeDataPatch::Label("x".into())));
	assert!(!editor.update_edge_data(&"e-gone".into(), EdgeDataPatch::Label("x".into())));
	assert!(!editor.update_edge_type(&"e-gone".into(), EdgeStyle::Straight));
	assert!(!editor.delete_node(&missing));
	assert_eq!(editor.graph(), &before);
	assert_eq!(editor.history().undo_depth(), 1);
}

#[test]
fn paste_duplicates_with_offset_and_fresh_identity() {
	let mut editor = editor();
	let original = editor.add_node(&text_template());
	editor.update_node_field(
		&original,
		&FieldId::new("body"),
		FieldPatch::Value(FieldValue::Text("hello".into())),
	);
	editor.select_node(original.clone());
	assert!(editor.copy_selected());

	let pasted = editor.paste();
	assert_eq!(pasted.len(), 1);
	let source = editor.graph().node(&original).cloned().expect("original kept");
	let copy = editor.graph().node(&pasted[0]).cloned().expect("copy inserted");

	assert!(copy.id != source.id);
	assert!(copy.data.instance_id != source.data.instance_id);
	assert_eq!(copy.position.x, source.position.x + 20.0);
	assert_eq!(copy.position.y, source.position.y + 20.0);
	assert_eq!(copy.data.label, source.data.label);
	assert_eq!(copy.data.fields, source.data.fields);
}

#[test]
fn retyping_an_edge_forces_custom_routing() {
	let mut editor = editor();
	let a = editor.add_node(&text_template());
	let b = editor.add_node(&text_template());
	let edge = editor.connect(Connection::between(a, b)).expect("connected");

	for style in [EdgeStyle::Smoothstep, EdgeStyle::Straight] {
		assert!(editor.update_edge_type(&edge, style));
		let current = editor.graph().edge(&edge).expect("edge kept");
		assert_eq!(current.route, EdgeRoute::Custom);
		assert_eq!(current.data.style, style);
	}
}

#[test]
fn keyboard_session() {
	let mut editor = editor();
	let a = editor.add_node(&text_template());
	editor.select_node(a.clone());

	let press = |editor: &mut FlowEditor, chord: KeyChord| {
		keymap::resolve(&chord).is_some_and(|command| editor.dispatch(command))
	};

	assert!(press(&mut editor, KeyChord::new("c").ctrl()));
	assert!(press(&mut editor, KeyChord::new("v").meta()));
	assert_eq!(editor.graph().nodes.len(), 2);

	editor.select_node(a.clone());
	assert!(press(&mut editor, KeyChord::new("Delete")));
	assert!(!editor.graph().contains_node(&a));

	assert!(press(&mut editor, KeyChord::new("z").ctrl()));
	assert!(editor.graph().contains_node(&a));
	assert!(press(&mut editor, KeyChord::new("Z").ctrl().shift()));
	assert!(!editor.graph().contains_node(&a));
	assert!(!press(&mut editor, KeyChord::new("x")));
}

#[test]
fn saved_diagram_survives_a_reload() {
	let storage = MemoryStorage::default();
	let mut first = editor();
	let a = first.add_node(&text_template());
	let b = first.add_node(&text_template());
	first.connect(Connection::between(a, b));
	storage.save(first.graph()).expect("memory storage accepts writes");

	let mut second = editor();
	let saved = storage.load().expect("saved diagram parses").expect("diagram was saved");
	second.restore(saved);
	assert_eq!(second.graph(), first.graph());
	assert!(!second.can_undo());
}

#[test]
fn bad_import_leaves_the_diagram_alone() {
	let storage = MemoryStorage::default();
	let mut editor = editor();
	editor.add_node(&text_template());
	let before = editor.graph().clone();

	let rejected: [&[u8]; 3] = [b"not json", br#"{"nodes": []}"#, b"[1, 2]"];
	for bad in rejected {
		assert!(storage.import_document(bad).is_err());
	}
	assert_eq!(editor.graph(), &before);

	let imported = storage
		.import_document(br#"{"nodes": [], "edges": []}"#)
		.expect("empty document is valid");
	editor.load_graph(imported);
	assert!(editor.graph().is_empty());
	assert!(editor.undo());
	assert_eq!(editor.graph(), &before);
}

#[test]
fn custom_template_round_trip() {
	let store = MemoryTemplateStore::default();
	let mut palette = TemplatePalette::new(builtin_templates());
	let builtin_count = palette.templates().len();

	let mut draft = TemplateDraft::default();
	draft.label = "Checklist".into();
	let items = draft.add_field(FieldType::Checkbox);
	draft.update_field(&items, FieldPatch::Options(vec!["a".into(), "b".into()]));
	let template = draft.build();

	let ticket = palette.begin_sync();
	let listed = block_on(save_and_refresh(&store, &template));
	assert!(palette.finish_sync(ticket, listed));
	assert_eq!(palette.templates().len(), builtin_count + 1);
	assert_eq!(palette.search("check").len(), 1);

	let mut editor = editor();
	let node = editor.add_node(palette.get(&template.id).expect("template listed"));
	assert!(editor.toggle_checkbox_option(&node, &items, "b"));
	let field = editor
		.graph()
		.node(&node)
		.and_then(|n| n.data.field(&items))
		.cloned()
		.expect("field copied from template");
	assert_eq!(
		field.kind,
		FieldKind::Checkbox {
			options: vec!["a".into(), "b".into()],
			value: BTreeSet::from(["b".to_owned()]),
		}
	);
}

#[test]
fn unreadable_save_survives_until_the_next_edit() {
	let raw = r#"{"nodes": [{"id": 7}], "edges": []}"#;
	let storage = MemoryStorage::with_raw(raw);
	assert!(storage.load().is_err());
	assert_eq!(storage.raw().as_deref(), Some(raw));

	let mut editor = editor();
	editor.add_node(&text_template());
	storage.save(editor.graph()).expect("memory storage accepts writes");
	assert_eq!(storage.load().expect("fresh save parses").as_ref(), Some(editor.graph()));
}
