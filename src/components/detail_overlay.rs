//! The book detail overlay.
//!
//! Pure display: given a book it shows cover, title, author, and the read
//! date. Closing (escape key, outside click, mode switch) is owned by the
//! page and the canvas; this component only renders and offers the close
//! button.

use leptos::prelude::*;

use crate::api::Book;
use crate::components::book_graph::timeline::format_read_date;

/// Overlay panel for the currently selected book, hidden when `None`.
#[component]
pub fn DetailOverlay(
	/// The book to display.
	#[prop(into)]
	book: Signal<Option<Book>>,
	/// Fired by the explicit close control.
	on_close: Callback<()>,
) -> impl IntoView {
	view! {
		{move || {
			book.get().map(|b| {
				let alt = b.title.clone();
				let read = format!("Read: {}", format_read_date(&b.date_read));
				view! {
					<div class="book-details">
						<button class="close-details" on:click=move |_| on_close.run(())>
							"\u{00d7}"
						</button>
						<img class="book-cover-detail" src=b.cover_image_url alt=alt />
						<h3 class="book-title">{b.title}</h3>
						<p class="book-author">{b.author}</p>
						<p class="book-date">{read}</p>
					</div>
				}
			})
		}}
	}
}
