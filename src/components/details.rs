//! Right-hand panel editing the selected node or edge.
//!
//! The panel is rebuilt only when the selection changes; individual inputs
//! read their values reactively so typing never loses focus.

use leptos::prelude::*;

use crate::flow::editor::checked_options;
use crate::flow::{
	EdgeDataPatch, EdgeId, EdgeStyle, Field, FieldId, FieldKind, FieldPatch, FieldType, FieldValue,
	FlowEditor, Node, NodeDataPatch, NodeId,
};

#[derive(Clone, PartialEq)]
enum Target {
	Nothing,
	Node(NodeId),
	Edge(EdgeId),
}

#[component]
pub fn DetailsPanel(editor: RwSignal<FlowEditor>) -> impl IntoView {
	let target = Memo::new(move |_| {
		editor.with(|ed| {
			let sel = ed.selection();
			match (&sel.node, &sel.edge) {
				(Some(node), _) if ed.graph().contains_node(node) => Target::Node(node.clone()),
				(_, Some(edge)) if ed.graph().edge(edge).is_some() => Target::Edge(edge.clone()),
				_ => Target::Nothing,
			}
		})
	});

	move || match target.get() {
		Target::Node(id) => view! { <NodeDetails editor id /> }.into_any(),
		Target::Edge(id) => view! { <EdgeDetails editor id /> }.into_any(),
		Target::Nothing => ().into_any(),
	}
}

#[component]
fn NodeDetails(editor: RwSignal<FlowEditor>, id: NodeId) -> impl IntoView {
	let id = StoredValue::new(id);
	let read = move |f: fn(&Node) -> String| {
		editor.with(|ed| ed.graph().node(&id.get_value()).map(f).unwrap_or_default())
	};
	let field_ids = Memo::new(move |_| {
		editor.with(|ed| {
			ed.graph()
				.node(&id.get_value())
				.map(|n| n.data.fields.iter().map(|f| f.id.clone()).collect::<Vec<_>>())
				.unwrap_or_default()
		})
	});

	view! {
		<aside class="details-panel" style="width: 250px; border-left: 1px solid #ccc; display: flex; flex-direction: column;">
			<div class="p-3 border-bottom d-flex justify-content-between align-items-center">
				<h5 class="mb-0">"Node Details"</h5>
				<button class="btn btn-sm" on:click=move |_| editor.update(FlowEditor::clear_selection)>
					"×"
				</button>
			</div>
			<div class="p-3" style="flex-grow: 1; overflow-y: auto; min-height: 0;">
				<div class="mb-3">
					<label class="form-label">"Label:"</label>
					<input
						type="text"
						class="form-control"
						prop:value=move || read(|n| n.data.label.clone())
						on:input=move |ev| {
							let label = event_target_value(&ev);
							editor.update(|ed| {
								ed.update_node_data(&id.get_value(), NodeDataPatch::Label(label));
							});
						}
					/>
				</div>
				<div class="mb-3">
					<label class="form-label">"Color:"</label>
					<input
						type="color"
						class="form-control form-control-color"
						prop:value=move || read(|n| n.data.color.clone())
						on:change=move |ev| {
							let color = event_target_value(&ev);
							editor.update(|ed| {
								ed.update_node_data(&id.get_value(), NodeDataPatch::Color(color));
							});
						}
					/>
				</div>
				<For each=move || field_ids.get() key=|field| field.clone() let:field>
					<FieldEditor editor node=id field />
				</For>
			</div>
			<div class="p-3 border-top">
				<button
					class="btn btn-danger w-100"
					on:click=move |_| editor.update(|ed| {
						ed.delete_node(&id.get_value());
					})
				>
					"Delete Node"
				</button>
			</div>
		</aside>
	}
}

#[component]
fn FieldEditor(editor: RwSignal<FlowEditor>, node: StoredValue<NodeId>, field: FieldId) -> impl IntoView {
	let field = StoredValue::new(field);
	let current = move || -> Option<Field> {
		editor.with(|ed| {
			ed.graph()
				.node(&node.get_value())
				.and_then(|n| n.data.field(&field.get_value()).cloned())
		})
	};
	let Some(initial) = editor.with_untracked(|ed| {
		ed.graph()
			.node(&node.get_value())
			.and_then(|n| n.data.field(&field.get_value()).cloned())
	}) else {
		return ().into_any();
	};
	// Radio groups are scoped to this placed instance, not the template.
	let group = editor.with_untracked(|ed| {
		ed.graph()
			.node(&node.get_value())
			.map(|n| format!("{}-{}", n.data.instance_id, initial.id))
			.unwrap_or_default()
	});

	let hidden = move || current().is_some_and(|f| f.hide);
	let label = move || current().map(|f| f.label).unwrap_or_default();
	let options = move || current().map(|f| f.kind.options().to_vec()).unwrap_or_default();
	let text_value = move || {
		current()
			.and_then(|f| match f.kind {
				FieldKind::Text { value }
				| FieldKind::Dropdown { value, .. }
				| FieldKind::Radio { value, .. } => Some(value),
				FieldKind::Checkbox { .. } => None,
			})
			.unwrap_or_default()
	};
	let set_text = move |value: String| {
		editor.update(|ed| {
			ed.update_node_field(
				&node.get_value(),
				&field.get_value(),
				FieldPatch::Value(FieldValue::Text(value)),
			);
		});
	};

	let control = match initial.kind.field_type() {
		FieldType::Text => view! {
			<input
				type="text"
				class="form-control"
				prop:value=text_value
				on:input=move |ev| set_text(event_target_value(&ev))
			/>
		}
		.into_any(),
		FieldType::Dropdown => view! {
			<select class="form-select" on:change=move |ev| set_text(event_target_value(&ev))>
				{move || {
					let selected = text_value();
					options()
						.into_iter()
						.map(|opt| {
							let is_selected = opt == selected;
							let value = opt.clone();
							view! { <option value=value selected=is_selected>{opt}</option> }
						})
						.collect_view()
				}}
			</select>
		}
		.into_any(),
		FieldType::Radio => view! {
			<div>
				{move || {
					let selected = text_value();
					options()
						.into_iter()
						.map(|opt| {
							let checked = opt == selected;
							let choice = opt.clone();
							view! {
								<div class="form-check">
									<input
										class="form-check-input"
										type="radio"
										name=group.clone()
										prop:checked=checked
										on:change=move |_| set_text(choice.clone())
									/>
									<label class="form-check-label">{opt}</label>
								</div>
							}
						})
						.collect_view()
				}}
			</div>
		}
		.into_any(),
		FieldType::Checkbox => view! {
			<div>
				{move || {
					let checked = current().map(|f| checked_options(&f.kind)).unwrap_or_default();
					options()
						.into_iter()
						.map(|opt| {
							let is_checked = checked.contains(&opt);
							let choice = opt.clone();
							view! {
								<div class="form-check">
									<input
										class="form-check-input"
										type="checkbox"
										prop:checked=is_checked
										on:change=move |_| editor.update(|ed| {
											ed.toggle_checkbox_option(&node.get_value(), &field.get_value(), &choice);
										})
									/>
									<label class="form-check-label">{opt}</label>
								</div>
							}
						})
						.collect_view()
				}}
			</div>
		}
		.into_any(),
	};

	view! {
		<div class="mb-3 border rounded p-2">
			<div class="d-flex justify-content-between align-items-center mb-1">
				<label class="form-label mb-0">{label}</label>
				<button
					class="btn btn-sm btn-outline-secondary"
					title=move || if hidden() { "Show Field" } else { "Hide Field" }
					on:click=move |_| editor.update(|ed| {
						ed.toggle_field_hidden(&node.get_value(), &field.get_value());
					})
				>
					{move || if hidden() { "show" } else { "hide" }}
				</button>
			</div>
			<div style:display=move || if hidden() { "none" } else { "block" }>{control}</div>
		</div>
	}
	.into_any()
}

#[component]
fn EdgeDetails(editor: RwSignal<FlowEditor>, id: EdgeId) -> impl IntoView {
	let id = StoredValue::new(id);
	let data = move || editor.with(|ed| ed.graph().edge(&id.get_value()).map(|e| e.data.clone()).unwrap_or_default());

	view! {
		<aside class="details-panel" style="width: 250px; border-left: 1px solid #ccc;">
			<div class="p-3 border-bottom d-flex justify-content-between align-items-center">
				<h5 class="mb-0">"Edge Details"</h5>
				<button class="btn btn-sm" on:click=move |_| editor.update(FlowEditor::clear_selection)>
					"×"
				</button>
			</div>
			<div class="p-3">
				<div class="mb-3">
					<label class="form-label">"Label:"</label>
					<input
						type="text"
						class="form-control"
						prop:value=move || data().label
						on:input=move |ev| {
							let label = event_target_value(&ev);
							editor.update(|ed| {
								ed.update_edge_data(&id.get_value(), EdgeDataPatch::Label(label));
							});
						}
					/>
				</div>
				<div class="mb-3">
					<label class="form-label">"Type:"</label>
					<select
						class="form-select"
						on:change=move |ev| {
							if let Some(style) = EdgeStyle::parse(&event_target_value(&ev)) {
								editor.update(|ed| {
									ed.update_edge_type(&id.get_value(), style);
								});
							}
						}
					>
						{move || {
							let current = data().style;
							EdgeStyle::ALL
								.into_iter()
								.map(|style| {
									view! {
										<option value=style.as_str() selected={style == current}>
											{style.as_str()}
										</option>
									}
								})
								.collect_view()
						}}
					</select>
				</div>
				<div class="mb-3">
					<label class="form-label">"Color:"</label>
					<input
						type="color"
						class="form-control form-control-color"
						prop:value=move || data().color.unwrap_or_else(|| "#222222".to_owned())
						on:change=move |ev| {
							let color = event_target_value(&ev);
							editor.update(|ed| {
								ed.update_edge_data(&id.get_value(), EdgeDataPatch::Color(Some(color)));
							});
						}
					/>
				</div>
				<button
					class="btn btn-danger w-100"
					on:click=move |_| editor.update(|ed| {
						ed.delete_edge(&id.get_value());
					})
				>
					"Delete Edge"
				</button>
			</div>
		</aside>
	}
}
