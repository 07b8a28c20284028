//! Left sidebar: searchable node palette and the custom template builder.

use std::future::Future;

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::flow::builder::{TemplateDraft, parse_options};
use crate::flow::templates::{delete_and_refresh, is_editable, reset_and_refresh, save_and_refresh};
use crate::flow::{
	FieldId, FieldPatch, FieldType, FlowEditor, HttpTemplateStore, NodeTemplate, TemplatePalette,
	TemplateStore, TemplateStoreError,
};

/// Blocking yes/no prompt; a missing window counts as no.
fn confirm(message: &str) -> bool {
	web_sys::window()
		.and_then(|w| w.confirm_with_message(message).ok())
		.unwrap_or(false)
}

/// Runs a store request and swaps its list into the palette, unless a later
/// request has already been applied.
pub fn resync<F, Fut>(palette: RwSignal<TemplatePalette>, request: F)
where
	F: FnOnce() -> Fut + 'static,
	Fut: Future<Output = Result<Vec<NodeTemplate>, TemplateStoreError>> + 'static,
{
	let Some(ticket) = palette.try_update(TemplatePalette::begin_sync) else {
		return;
	};
	spawn_local(async move {
		let result = request().await;
		palette.update(|p| {
			p.finish_sync(ticket, result);
		});
	});
}

#[component]
pub fn Palette(
	editor: RwSignal<FlowEditor>,
	palette: RwSignal<TemplatePalette>,
	store: HttpTemplateStore,
) -> impl IntoView {
	let store = StoredValue::new(store);
	let (query, set_query) = signal(String::new());
	let draft = RwSignal::new(None::<TemplateDraft>);

	let visible = move || {
		palette.with(|p| {
			p.search(&query.get())
				.into_iter()
				.cloned()
				.collect::<Vec<_>>()
		})
	};

	let on_save = move |template: NodeTemplate| {
		let store = store.get_value();
		resync(palette, move || async move { save_and_refresh(&store, &template).await });
		draft.set(None);
	};

	let on_delete = move |id: String| {
		if !confirm("Are you sure you want to delete this custom node?") {
			return;
		}
		let store = store.get_value();
		resync(palette, move || async move { delete_and_refresh(&store, &id).await });
	};

	let on_reset = move |_| {
		if !confirm("Delete all custom templates?") {
			return;
		}
		let ids = palette.with_untracked(TemplatePalette::custom_ids);
		let store = store.get_value();
		resync(palette, move || async move { reset_and_refresh(&store, &ids).await });
	};

	let on_refresh = move |_| {
		let store = store.get_value();
		resync(palette, move || async move { store.list().await });
	};

	view! {
		<aside class="palette" style="width: 220px; border-right: 1px solid #ccc; display: flex; flex-direction: column;">
			<div class="p-2 border-bottom">
				<input
					type="search"
					class="form-control"
					placeholder="Search nodes"
					prop:value=query
					on:input=move |ev| set_query.set(event_target_value(&ev))
				/>
			</div>
			<div style="flex-grow: 1; overflow-y: auto; min-height: 0;" class="p-2">
				<For each=visible key=|t| (t.id.clone(), t.label.clone()) let:template>
					<TemplateEntry
						editor
						template
						on_edit=move |t: NodeTemplate| draft.set(Some(TemplateDraft::edit(&t)))
						on_delete
					/>
				</For>
			</div>
			<div class="p-2 border-top d-grid gap-1">
				<button class="btn btn-primary btn-sm" on:click=move |_| draft.set(Some(TemplateDraft::default()))>
					"Create Node"
				</button>
				<button class="btn btn-outline-secondary btn-sm" on:click=on_refresh>
					"Refresh"
				</button>
				<button class="btn btn-outline-danger btn-sm" on:click=on_reset>
					"Reset Custom Nodes"
				</button>
			</div>
			<Show when=move || draft.with(Option::is_some)>
				<TemplateBuilder draft on_save />
			</Show>
		</aside>
	}
}

#[component]
fn TemplateEntry(
	editor: RwSignal<FlowEditor>,
	template: NodeTemplate,
	on_edit: impl Fn(NodeTemplate) + Copy + Send + Sync + 'static,
	on_delete: impl Fn(String) + Copy + Send + Sync + 'static,
) -> impl IntoView {
	let editable = is_editable(&template);
	let template = StoredValue::new(template);
	let swatch = template.with_value(|t| t.color.clone().unwrap_or_else(|| "#ffffff".to_owned()));

	view! {
		<div class="d-flex align-items-center mb-1 gap-1">
			<button
				class="btn btn-light btn-sm flex-grow-1 text-start"
				on:click=move |_| template.with_value(|t| editor.update(|ed| {
					ed.add_node(t);
				}))
			>
				<span style=format!(
					"display: inline-block; width: 10px; height: 10px; margin-right: 6px; border: 1px solid #999; background: {swatch};",
				)></span>
				{template.with_value(|t| t.label.clone())}
			</button>
			<Show when=move || editable>
				<button class="btn btn-sm btn-outline-secondary" title="Edit" on:click=move |_| on_edit(template.get_value())>
					"✎"
				</button>
				<button
					class="btn btn-sm btn-outline-danger"
					title="Delete"
					on:click=move |_| on_delete(template.with_value(|t| t.id.clone()))
				>
					"×"
				</button>
			</Show>
		</div>
	}
}

#[component]
fn TemplateBuilder(
	draft: RwSignal<Option<TemplateDraft>>,
	on_save: impl Fn(NodeTemplate) + Copy + Send + Sync + 'static,
) -> impl IntoView {
	let read = move |f: fn(&TemplateDraft) -> String| draft.with(|d| d.as_ref().map(f).unwrap_or_default());
	let edit = move |f: &dyn Fn(&mut TemplateDraft)| {
		draft.update(|d| {
			if let Some(d) = d {
				f(d);
			}
		})
	};
	let field_ids = Memo::new(move |_| {
		draft.with(|d| {
			d.as_ref()
				.map(|d| d.fields().iter().map(|f| f.id.clone()).collect::<Vec<_>>())
				.unwrap_or_default()
		})
	});
	let title = move || {
		if draft.with(|d| d.as_ref().is_some_and(TemplateDraft::is_editing)) {
			"Edit Node"
		} else {
			"Create Node"
		}
	};
	let can_save = move || draft.with(|d| d.as_ref().is_some_and(|d| !d.label.trim().is_empty()));

	view! {
		<div class="builder-backdrop" style="position: fixed; inset: 0; background: rgba(0,0,0,0.3); display: flex; align-items: center; justify-content: center; z-index: 10;">
			<div class="card p-3" style="width: 380px; max-height: 90vh; overflow-y: auto;">
				<h5>{title}</h5>
				<div class="mb-2">
					<label class="form-label">"Label:"</label>
					<input
						type="text"
						class="form-control"
						prop:value=move || read(|d| d.label.clone())
						on:input=move |ev| {
							let label = event_target_value(&ev);
							edit(&|d: &mut TemplateDraft| d.label = label.clone());
						}
					/>
				</div>
				<div class="mb-2">
					<label class="form-label">"Color:"</label>
					<input
						type="color"
						class="form-control form-control-color"
						prop:value=move || read(|d| d.color.clone())
						on:change=move |ev| {
							let color = event_target_value(&ev);
							edit(&|d: &mut TemplateDraft| d.color = color.clone());
						}
					/>
				</div>
				<For each=move || field_ids.get() key=|id| id.clone() let:id>
					<DraftField draft id />
				</For>
				<div class="btn-group btn-group-sm mb-3">
					{FieldType::ALL
						.into_iter()
						.map(|field_type| {
							view! {
								<button
									class="btn btn-outline-primary"
									on:click=move |_| edit(&|d: &mut TemplateDraft| {
										d.add_field(field_type);
									})
								>
									{format!("+ {field_type}")}
								</button>
							}
						})
						.collect_view()}
				</div>
				<div class="d-flex justify-content-end gap-2">
					<button class="btn btn-secondary" on:click=move |_| draft.set(None)>
						"Cancel"
					</button>
					<button
						class="btn btn-primary"
						prop:disabled=move || !can_save()
						on:click=move |_| {
							if let Some(template) = draft.with_untracked(|d| d.as_ref().map(TemplateDraft::build)) {
								on_save(template);
							}
						}
					>
						"Save"
					</button>
				</div>
			</div>
		</div>
	}
}

#[component]
fn DraftField(draft: RwSignal<Option<TemplateDraft>>, id: FieldId) -> impl IntoView {
	let id = StoredValue::new(id);
	let field = move || {
		draft.with(|d| {
			d.as_ref()
				.and_then(|d| d.fields().iter().find(|f| f.id == id.get_value()).cloned())
		})
	};
	let patch = move |patch: FieldPatch| {
		draft.update(|d| {
			if let Some(d) = d {
				d.update_field(&id.get_value(), patch);
			}
		});
	};
	let field_type = draft.with_untracked(|d| {
		d.as_ref()
			.and_then(|d| d.fields().iter().find(|f| f.id == id.get_value()))
			.map(|f| f.kind.field_type())
	});

	view! {
		<div class="border rounded p-2 mb-2">
			<div class="d-flex justify-content-between align-items-center mb-1">
				<small class="text-muted">{field_type.map(FieldType::as_str)}</small>
				<button
					class="btn btn-sm btn-outline-danger"
					on:click=move |_| draft.update(|d| {
						if let Some(d) = d {
							d.remove_field(&id.get_value());
						}
					})
				>
					"×"
				</button>
			</div>
			<input
				type="text"
				class="form-control form-control-sm mb-1"
				placeholder="Field label"
				prop:value=move || field().map(|f| f.label).unwrap_or_default()
				on:input=move |ev| patch(FieldPatch::Label(event_target_value(&ev)))
			/>
			<Show when=move || field_type.is_some_and(|t| t != FieldType::Text)>
				<input
					type="text"
					class="form-control form-control-sm"
					placeholder="Options, comma separated"
					prop:value=move || field().map(|f| f.kind.options().join(", ")).unwrap_or_default()
					on:change=move |ev| patch(FieldPatch::Options(parse_options(&event_target_value(&ev))))
				/>
			</Show>
		</div>
	}
}
