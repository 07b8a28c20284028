use leptos::prelude::*;

/// 404 Not Found Page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="container p-5">
			<h1>"Page not found"</h1>
			<a href="/">"Back to the editor"</a>
		</div>
	}
}
