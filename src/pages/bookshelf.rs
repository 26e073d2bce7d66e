//! The bookshelf page: mode toolbar, canvas, detail overlay, add-book form.

use std::time::Duration;

use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::warn;

use crate::api::{self, Book, ReadingTimeSummary};
use crate::components::book_graph::{BookGraphCanvas, Mode, ViewKind};
use crate::components::{AddBookForm, DetailOverlay, StatusMessage};

/// The single page of the app.
#[component]
pub fn Bookshelf() -> impl IntoView {
	let mode = RwSignal::new(Mode::View);
	let view_kind = RwSignal::new(ViewKind::Graph);
	let refresh = RwSignal::new(0u32);
	let selected = RwSignal::new(Option::<Book>::None);
	let status = RwSignal::new(Option::<StatusMessage>::None);
	let empty = RwSignal::new(false);
	let reading_time = RwSignal::new(Option::<ReadingTimeSummary>::None);

	let show_status = Callback::new(move |message: StatusMessage| {
		status.set(Some(message));
		set_timeout(move || status.set(None), Duration::from_secs(5));
	});
	let on_select = Callback::new(move |book| selected.set(book));
	let on_loaded = Callback::new(move |is_empty| empty.set(is_empty));
	let on_added = Callback::new(move |()| refresh.update(|n| *n += 1));
	let on_close = Callback::new(move |()| selected.set(None));

	// Escape closes the overlay from anywhere on the page.
	let escape = window_event_listener(ev::keydown, move |ev| {
		if ev.key() == "Escape" {
			selected.set(None);
		}
	});
	on_cleanup(move || escape.remove());

	// Supplementary label for the timeline view; absence is not an error.
	Effect::new(move |_| {
		spawn_local(async move {
			match api::fetch_total_reading_time().await {
				Ok(summary) => reading_time.set(Some(summary)),
				Err(err) => warn!("reading-time summary unavailable: {err}"),
			}
		});
	});

	let mode_button = move |label: &'static str, value: Mode| {
		view! {
			<button
				class="mode-toggle"
				class:active=move || mode.get() == value
				on:click=move |_| mode.set(value)
			>
				{label}
			</button>
		}
	};

	view! {
		<div class="bookshelf-page">
			<header class="shelf-header">
				<h1>"Bookshelf"</h1>
				<p class="subtitle">
					"Every book connects to the ones it made me think of."
				</p>
			</header>

			<div class="shelf-toolbar">
				{mode_button("View", Mode::View)}
				{mode_button("Connect", Mode::Connect)}
				{mode_button("Delete", Mode::Delete)}
				<button
					class="view-toggle"
					class:active=move || view_kind.get() == ViewKind::Timeline
					on:click=move |_| {
						view_kind
							.update(|v| {
								*v = match v {
									ViewKind::Graph => ViewKind::Timeline,
									ViewKind::Timeline => ViewKind::Graph,
								};
							});
					}
				>
					"Timeline"
				</button>
				{move || {
					(view_kind.get() == ViewKind::Timeline)
						.then(|| reading_time.get())
						.flatten()
						.map(|summary| {
							view! {
								<span class="reading-time">
									{format!(
										"{:.0} hours of reading across {} books",
										summary.total_minutes / 60.0,
										summary.book_count,
									)}
								</span>
							}
						})
				}}
			</div>

			{move || {
				status
					.get()
					.map(|message| {
						let class = message.class();
						view! { <div class=class>{message.text}</div> }
					})
			}}

			<div class="graph-container">
				<Show when=move || empty.get()>
					<div class="shelf-empty">
						<p>"No books on the shelf yet."</p>
						<p>"Add your first book below."</p>
					</div>
				</Show>
				<BookGraphCanvas
					mode=mode
					view=view_kind
					refresh=refresh
					selected=selected
					on_select=on_select
					on_status=show_status
					on_loaded=on_loaded
				/>
				<DetailOverlay book=selected on_close=on_close />
			</div>

			<section class="add-book">
				<h2>"Add a book"</h2>
				<AddBookForm on_status=show_status on_added=on_added />
			</section>
		</div>
	}
}
