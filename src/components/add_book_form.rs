//! The add-book form: multipart upload of cover image plus metadata.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::error;
use web_sys::{FormData, HtmlFormElement, HtmlInputElement, Url};

use crate::api::{self, ApiError};
use crate::components::status::StatusMessage;

/// Form for adding a book to the shelf. The submit control stays disabled
/// for the duration of the request and is re-enabled unconditionally.
#[component]
pub fn AddBookForm(
	/// Fired with transient user-facing messages.
	on_status: Callback<StatusMessage>,
	/// Fired after a successful create, so the owner can reload.
	on_added: Callback<()>,
) -> impl IntoView {
	let form_ref = NodeRef::<leptos::html::Form>::new();
	let (submitting, set_submitting) = signal(false);
	let (preview, set_preview) = signal(Option::<String>::None);

	let on_cover_change = move |ev: web_sys::Event| {
		let input = event_target::<HtmlInputElement>(&ev);
		let url = input
			.files()
			.and_then(|files| files.get(0))
			.and_then(|file| Url::create_object_url_with_blob(&file).ok());
		set_preview.set(url);
	};

	let on_submit = move |ev: web_sys::SubmitEvent| {
		ev.prevent_default();
		let Some(form) = form_ref.get_untracked() else {
			return;
		};
		let form: HtmlFormElement = form.into();
		let Ok(data) = FormData::new_with_form(&form) else {
			on_status.run(StatusMessage::error("Could not read the form"));
			return;
		};

		set_submitting.set(true);
		spawn_local(async move {
			match api::create_book(data).await {
				Ok(book) => {
					on_status.run(StatusMessage::success(format!("Added \"{}\"", book.title)));
					form.reset();
					set_preview.set(None);
					on_added.run(());
				}
				Err(ApiError::Rejected(message)) => on_status.run(StatusMessage::error(message)),
				Err(err) => {
					error!("adding book failed: {err}");
					on_status.run(StatusMessage::error("Could not add the book"));
				}
			}
			// Re-enabled regardless of outcome.
			set_submitting.set(false);
		});
	};

	view! {
		<form class="book-form" node_ref=form_ref on:submit=on_submit>
			<label>
				"Title"
				<input type="text" name="title" required />
			</label>
			<label>
				"Author"
				<input type="text" name="author" required />
			</label>
			<label>
				"Date read"
				<input type="date" name="date_read" required />
			</label>
			<label>
				"Cover image"
				<input
					type="file"
					name="cover"
					accept="image/*"
					required
					on:change=on_cover_change
				/>
			</label>
			{move || {
				preview
					.get()
					.map(|url| view! { <img class="cover-preview" src=url alt="Cover preview" /> })
			}}
			<button type="submit" prop:disabled=move || submitting.get()>
				{move || if submitting.get() { "Adding..." } else { "Add Book" }}
			</button>
		</form>
	}
}
