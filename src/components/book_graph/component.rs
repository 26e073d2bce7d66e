//! The bookshelf canvas component: event wiring, the animation loop, and
//! the async calls behind connect/delete actions.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, MouseEvent, WheelEvent};

use super::interaction::{ClickAction, Mode};
use super::render::{self, ImageCache};
use super::state::{BookGraphState, ViewKind};
use super::store::GraphStore;
use crate::api::{self, ApiError, Book};
use crate::components::status::StatusMessage;

type SharedState = Rc<RefCell<Option<BookGraphState>>>;

/// Pointer travel below this is a click, not a drag.
const CLICK_SLOP: f64 = 4.0;

fn event_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn confirm(message: &str) -> bool {
	web_sys::window()
		.map(|w| w.confirm_with_message(message).unwrap_or(false))
		.unwrap_or(false)
}

/// What a resolved click asks the component to do once the state borrow is
/// released.
enum ClickOutcome {
	Select(Option<Book>),
	Status(StatusMessage),
	Connect { from: String, to: String },
	DeleteBook(Book),
	DeleteConnection(String),
	Nothing,
}

fn resolve_click(state: &SharedState, x: f64, y: f64) -> ClickOutcome {
	let mut guard = state.borrow_mut();
	let Some(s) = guard.as_mut() else {
		return ClickOutcome::Nothing;
	};

	if s.view == ViewKind::Timeline {
		// Timeline clicks cycle through the date bucket under the pointer.
		return match s.timeline.marker_at(x, y) {
			Some(index) => match s.timeline.advance(index) {
				Some(book_id) => ClickOutcome::Select(s.store.book(&book_id).cloned()),
				None => ClickOutcome::Nothing,
			},
			None => ClickOutcome::Select(None),
		};
	}

	let target = s.hit_test(x, y);
	match s.interaction.click(target) {
		ClickAction::ShowDetails(book_id) => {
			let book = s.store.book(&book_id).cloned();
			s.selected = book.as_ref().map(|b| b.id.clone());
			ClickOutcome::Select(book)
		}
		ClickAction::CloseDetails => {
			s.selected = None;
			ClickOutcome::Select(None)
		}
		ClickAction::MarkPending(_) => {
			ClickOutcome::Status(StatusMessage::info("Now click another book to connect them"))
		}
		ClickAction::ClearPending => ClickOutcome::Status(StatusMessage::info("Selection cancelled")),
		ClickAction::RequestConnection { from, to } => {
			if s.store.has_edge_between(&from, &to) {
				// Known duplicate: reject before any network call.
				ClickOutcome::Status(StatusMessage::error("These books are already connected"))
			} else {
				ClickOutcome::Connect { from, to }
			}
		}
		ClickAction::ConfirmDeleteBook(book_id) => match s.store.book(&book_id).cloned() {
			Some(book) => ClickOutcome::DeleteBook(book),
			None => ClickOutcome::Nothing,
		},
		ClickAction::ConfirmDeleteConnection(connection_id) => {
			ClickOutcome::DeleteConnection(connection_id)
		}
		ClickAction::None => ClickOutcome::Nothing,
	}
}

fn dispatch_click(
	state: &SharedState,
	x: f64,
	y: f64,
	on_select: Callback<Option<Book>>,
	on_status: Callback<StatusMessage>,
	refresh: RwSignal<u32>,
) {
	match resolve_click(state, x, y) {
		ClickOutcome::Select(book) => on_select.run(book),
		ClickOutcome::Status(message) => on_status.run(message),
		ClickOutcome::Nothing => {}
		ClickOutcome::Connect { from, to } => {
			let state = state.clone();
			spawn_local(async move {
				match api::create_connection(&from, &to).await {
					Ok(conn) => {
						if let Some(s) = state.borrow_mut().as_mut() {
							s.insert_connection(conn);
						}
						on_status.run(StatusMessage::success("Connection created"));
					}
					// The backend's own rejection text goes to the user as is.
					Err(ApiError::Rejected(message)) => {
						on_status.run(StatusMessage::error(message))
					}
					Err(err) => {
						error!("creating connection failed: {err}");
						on_status.run(StatusMessage::error("Could not create the connection"));
					}
				}
			});
		}
		ClickOutcome::DeleteBook(book) => {
			let prompt = format!(
				"Delete \"{}\" by {}?\n\nThis will also delete all of its connections.",
				book.title, book.author
			);
			if !confirm(&prompt) {
				return;
			}
			let state = state.clone();
			spawn_local(async move {
				match api::delete_book(&book.id).await {
					Ok(()) => {
						if let Some(s) = state.borrow_mut().as_mut() {
							s.remove_book(&book.id);
						}
						on_select.run(None);
						on_status.run(StatusMessage::success("Book deleted"));
						// A full reload reconciles whatever the cascade removed.
						refresh.update(|n| *n += 1);
					}
					Err(ApiError::Rejected(message)) => {
						on_status.run(StatusMessage::error(message))
					}
					Err(err) => {
						error!("deleting book failed: {err}");
						on_status.run(StatusMessage::error("Could not delete the book"));
					}
				}
			});
		}
		ClickOutcome::DeleteConnection(connection_id) => {
			if !confirm("Delete this connection between books?") {
				return;
			}
			let state = state.clone();
			spawn_local(async move {
				match api::delete_connection(&connection_id).await {
					Ok(()) => {
						if let Some(s) = state.borrow_mut().as_mut() {
							s.remove_connection(&connection_id);
						}
						on_status.run(StatusMessage::success("Connection deleted"));
					}
					Err(ApiError::Rejected(message)) => {
						on_status.run(StatusMessage::error(message))
					}
					Err(err) => {
						error!("deleting connection failed: {err}");
						on_status.run(StatusMessage::error("Could not delete the connection"));
					}
				}
			});
		}
	}
}

/// Interactive canvas showing the bookshelf as a force-directed graph or a
/// chronological timeline.
#[component]
pub fn BookGraphCanvas(
	/// Current interaction mode.
	#[prop(into)]
	mode: Signal<Mode>,
	/// Which projection to draw.
	#[prop(into)]
	view: Signal<ViewKind>,
	/// Bumping this signal forces a full reload from the backend.
	refresh: RwSignal<u32>,
	/// The book currently in the detail overlay; mirrored into the canvas
	/// highlight so closing the overlay anywhere clears the ring too.
	#[prop(into)]
	selected: Signal<Option<Book>>,
	/// Fired with the book to show in the detail overlay, or `None`.
	on_select: Callback<Option<Book>>,
	/// Fired with transient user-facing messages.
	on_status: Callback<StatusMessage>,
	/// Fired after each load with whether the shelf is empty.
	on_loaded: Callback<bool>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let images: Rc<RefCell<ImageCache>> = Rc::new(RefCell::new(ImageCache::new()));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	// Pointer-down position, for separating clicks from drags.
	let press: Rc<RefCell<Option<(f64, f64)>>> = Rc::new(RefCell::new(None));

	let (state_init, images_init, animate_init) = (state.clone(), images.clone(), animate.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (w, h) = (
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.unwrap_or(900.0),
			canvas
				.parent_element()
				.map(|p| p.client_height() as f64)
				.unwrap_or(600.0),
		);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		if let Some(s) = state_init.borrow_mut().as_mut() {
			s.resize(w, h);
		}

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		let (state_anim, images_anim, animate_inner) =
			(state_init.clone(), images_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(0.016);
				render::render(s, &images_anim.borrow(), &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = web_sys::window()
				.unwrap()
				.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Load (and reload) the snapshot whenever the refresh counter bumps.
	let (state_load, images_load) = (state.clone(), images.clone());
	Effect::new(move |_| {
		refresh.get();
		let (state, images) = (state_load.clone(), images_load.clone());
		spawn_local(async move {
			match api::fetch_books().await {
				Ok((books, connections)) => {
					let store = GraphStore::new(books, connections);
					let mut cache = ImageCache::new();
					for book in store.books() {
						if let Ok(img) = HtmlImageElement::new() {
							img.set_src(&book.cover_image_url);
							cache.insert(book.id.clone(), img);
						}
					}
					*images.borrow_mut() = cache;
					on_loaded.run(store.is_empty());

					let mut guard = state.borrow_mut();
					match guard.as_mut() {
						Some(s) => s.reload(store),
						None => {
							let (w, h) = canvas_ref
								.get_untracked()
								.map(|c| {
									let c: HtmlCanvasElement = c.into();
									(f64::from(c.width()), f64::from(c.height()))
								})
								.unwrap_or((900.0, 600.0));
							*guard = Some(BookGraphState::new(store, w, h));
						}
					}
				}
				Err(err) => {
					error!("loading the bookshelf failed: {err}");
					on_status.run(StatusMessage::error("Could not load the bookshelf"));
				}
			}
		});
	});

	// Mode switches clear pending selections and the open overlay.
	let state_mode = state.clone();
	Effect::new(move |_| {
		let mode = mode.get();
		if let Some(s) = state_mode.borrow_mut().as_mut() {
			s.set_mode(mode);
		}
		on_select.run(None);
	});

	let state_view = state.clone();
	Effect::new(move |_| {
		let view = view.get();
		if let Some(s) = state_view.borrow_mut().as_mut() {
			s.set_view(view);
		}
	});

	let state_sel = state.clone();
	Effect::new(move |_| {
		let selected = selected.get().map(|b| b.id);
		if let Some(s) = state_sel.borrow_mut().as_mut() {
			s.selected = selected;
		}
	});

	let (state_md, press_md) = (state.clone(), press.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = event_position(&canvas, &ev);
		*press_md.borrow_mut() = Some((x, y));

		if let Some(ref mut s) = *state_md.borrow_mut() {
			if s.view != ViewKind::Graph {
				return;
			}
			let (gx, gy) = s.screen_to_graph(x, y);
			if let Some(book_id) = s.layout.node_at(gx, gy, s.node_size / 2.0) {
				if let Some((nx, ny)) = s.layout.position_of(&book_id) {
					s.drag.active = true;
					s.drag.book_id = Some(book_id);
					s.drag.start_x = x;
					s.drag.start_y = y;
					s.drag.node_start_x = nx as f32;
					s.drag.node_start_y = ny as f32;
				}
			} else {
				s.pan.active = true;
				s.pan.start_x = x;
				s.pan.start_y = y;
				s.pan.transform_start_x = s.transform.x;
				s.pan.transform_start_y = s.transform.y;
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = event_position(&canvas, &ev);

		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.drag.active {
				if let Some(book_id) = s.drag.book_id.clone() {
					let (dx, dy) = (
						(x - s.drag.start_x) / s.transform.k,
						(y - s.drag.start_y) / s.transform.k,
					);
					s.layout.move_node(
						&book_id,
						s.drag.node_start_x + dx as f32,
						s.drag.node_start_y + dy as f32,
					);
				}
			} else if s.pan.active {
				s.transform.x = s.pan.transform_start_x + (x - s.pan.start_x);
				s.transform.y = s.pan.transform_start_y + (y - s.pan.start_y);
			}
		}
	};

	let (state_mu, press_mu) = (state.clone(), press.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = event_position(&canvas, &ev);

		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.drag.active = false;
			s.drag.book_id = None;
			s.pan.active = false;
		}

		if let Some((px, py)) = press_mu.borrow_mut().take() {
			if ((x - px).powi(2) + (y - py).powi(2)).sqrt() < CLICK_SLOP {
				dispatch_click(&state_mu, x, y, on_select, on_status, refresh);
			}
		}
	};

	let (state_ml, press_ml) = (state.clone(), press.clone());
	let on_mouseleave = move |_: MouseEvent| {
		press_ml.borrow_mut().take();
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.drag.active = false;
			s.drag.book_id = None;
			s.pan.active = false;
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = event_position(&canvas, &ev);
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.apply_wheel(x, y, ev.delta_y(), js_sys::Date::now());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="book-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
