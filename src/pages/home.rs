use leptos::prelude::*;
use log::{error, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{Element, KeyboardEvent};

use crate::components::details::DetailsPanel;
use crate::components::flow_canvas::FlowCanvas;
use crate::components::palette::{Palette, resync};
use crate::components::toolbar::Toolbar;
use crate::config::EditorConfig;
use crate::flow::keymap::{self, KeyChord};
use crate::flow::templates::builtin_templates;
use crate::flow::{FlowEditor, HttpTemplateStore, LocalStorage, Persistence, TemplatePalette, TemplateStore};

/// Shortcuts stay out of the way while the user types into a form control.
fn typing_in_form(ev: &KeyboardEvent) -> bool {
	ev.target()
		.and_then(|t| t.dyn_into::<Element>().ok())
		.is_some_and(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT"))
}

/// The editor page: toolbar, palette, canvas and details panel around one
/// shared [`FlowEditor`].
#[component]
pub fn Home() -> impl IntoView {
	let config = EditorConfig::default();
	let storage = LocalStorage::new(config.storage_key.clone());

	let mut initial = FlowEditor::new(&config);
	match storage.load() {
		Ok(Some(graph)) => initial.restore(graph),
		Ok(None) => {}
		Err(e) => {
			error!("saved diagram under `{}` is unreadable: {e}", config.storage_key);
			if let Some(window) = web_sys::window() {
				let _ = window.alert_with_message(
					"The saved diagram could not be read. It is kept until you make a change.",
				);
			}
		}
	}
	let editor = RwSignal::new(initial);

	// Auto-save on every change. The first run only subscribes, so an
	// unreadable save is not overwritten before the user edits anything.
	Effect::new(move |subscribed: Option<()>| {
		editor.with(|ed| {
			if subscribed.is_none() {
				return;
			}
			if let Err(e) = storage.save(ed.graph()) {
				warn!("auto-save failed: {e}");
			}
		});
	});

	let keys = window_event_listener(leptos::ev::keydown, move |ev: KeyboardEvent| {
		if typing_in_form(&ev) {
			return;
		}
		let Some(command) = keymap::resolve(&KeyChord::from(&ev)) else {
			return;
		};
		ev.prevent_default();
		editor.update(|ed| {
			ed.dispatch(command);
		});
	});
	on_cleanup(move || keys.remove());

	let palette = RwSignal::new(TemplatePalette::new(builtin_templates()));
	let store = HttpTemplateStore::new(config.template_store_url.clone());
	let initial_fetch = store.clone();
	resync(palette, move || async move { initial_fetch.list().await });
	info!("editor ready, templates from {}", config.template_store_url);

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="flow-app" style="display: flex; flex-direction: column; height: 100vh;">
				<Toolbar editor export_name=config.export_file_name.clone() />
				<div style="display: flex; flex-grow: 1; min-height: 0;">
					<Palette editor palette store=store.clone() />
					<div class="canvas-host" style="flex-grow: 1; position: relative; overflow: hidden;">
						<FlowCanvas editor />
					</div>
					<DetailsPanel editor />
				</div>
			</div>
		</ErrorBoundary>
	}
}
