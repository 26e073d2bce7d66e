//! 404 fallback page.

use leptos::prelude::*;

/// Rendered for any route the router does not know.
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found">
			<h1>"404"</h1>
			<p>"This page does not exist."</p>
			<a href="/">"Back to the bookshelf"</a>
		</div>
	}
}
