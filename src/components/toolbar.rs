//! File menu and undo/redo buttons.

use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, HtmlInputElement, Url};

use crate::flow::persistence::{export_document, import_document};
use crate::flow::FlowEditor;

fn window_message(text: &str) {
	if let Some(window) = web_sys::window() {
		let _ = window.alert_with_message(text);
	}
}

/// Hands `bytes` to the browser as a file download.
fn download(file_name: &str, bytes: &[u8]) -> Result<(), JsValue> {
	let text = String::from_utf8_lossy(bytes);
	let parts = js_sys::Array::of1(&JsValue::from_str(&text));
	let options = BlobPropertyBag::new();
	options.set_type("application/json");
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
	let url = Url::create_object_url_with_blob(&blob)?;

	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let anchor: HtmlAnchorElement = document
		.create_element("a")?
		.dyn_into()
		.map_err(|_| JsValue::from_str("not an anchor"))?;
	anchor.set_href(&url);
	anchor.set_download(file_name);
	anchor.click();
	Url::revoke_object_url(&url)
}

#[component]
pub fn Toolbar(editor: RwSignal<FlowEditor>, export_name: String) -> impl IntoView {
	let file_input = NodeRef::<leptos::html::Input>::new();
	let export_name = StoredValue::new(export_name);

	let on_new = move |_| {
		let confirmed = web_sys::window()
			.and_then(|w| w.confirm_with_message("Discard the current diagram?").ok())
			.unwrap_or(false);
		if confirmed {
			editor.update(|ed| {
				ed.new_graph();
			});
		}
	};

	let on_save = move |_| {
		let bytes = editor.with_untracked(|ed| export_document(ed.graph()));
		let result = bytes
			.map_err(|e| JsValue::from_str(&e.to_string()))
			.and_then(|bytes| export_name.with_value(|name| download(name, &bytes)));
		match result {
			Ok(()) => info!("diagram exported"),
			Err(e) => error!("export failed: {e:?}"),
		}
	};

	let on_file = move |ev: leptos::ev::Event| {
		let input: HtmlInputElement = event_target(&ev);
		let Some(file) = input.files().and_then(|files| files.get(0)) else {
			return;
		};
		// Clearing lets the same file be chosen twice in a row.
		input.set_value("");
		spawn_local(async move {
			let text = match JsFuture::from(file.text()).await {
				Ok(text) => text.as_string().unwrap_or_default(),
				Err(e) => {
					error!("could not read {}: {e:?}", file.name());
					return;
				}
			};
			match import_document(text.as_bytes()) {
				Ok(graph) => editor.update(|ed| ed.load_graph(graph)),
				Err(e) => {
					error!("rejected {}: {e}", file.name());
					window_message("Invalid graph JSON");
				}
			}
		});
	};

	view! {
		<nav class="toolbar d-flex gap-2 p-2 border-bottom align-items-center">
			<strong class="me-3">"Flow Editor"</strong>
			<button class="btn btn-sm btn-outline-secondary" on:click=on_new>
				"New"
			</button>
			<button class="btn btn-sm btn-outline-secondary" on:click=on_save>
				"Save"
			</button>
			<button
				class="btn btn-sm btn-outline-secondary"
				on:click=move |_| {
					if let Some(input) = file_input.get_untracked() {
						input.click();
					}
				}
			>
				"Load"
			</button>
			<input type="file" accept=".json,application/json" style="display: none;" node_ref=file_input on:change=on_file />
			<span class="vr mx-1"></span>
			<button
				class="btn btn-sm btn-outline-secondary"
				title="Undo (Ctrl+Z)"
				prop:disabled=move || !editor.with(FlowEditor::can_undo)
				on:click=move |_| editor.update(|ed| {
					ed.undo();
				})
			>
				"Undo"
			</button>
			<button
				class="btn btn-sm btn-outline-secondary"
				title="Redo (Ctrl+Shift+Z)"
				prop:disabled=move || !editor.with(FlowEditor::can_redo)
				on:click=move |_| editor.update(|ed| {
					ed.redo();
				})
			>
				"Redo"
			</button>
		</nav>
	}
}
