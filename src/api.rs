//! HTTP client for the bookshelf backend.
//!
//! Thin wrapper over the browser `fetch` API. Every call returns a
//! [`Result`] and no call is retried; callers decide what to surface.

use serde::Deserialize;
use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{FormData, Headers, Request, RequestInit, Response};

/// One book on the shelf, as returned by the backend.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Book {
	pub id: String,
	pub title: String,
	pub author: String,
	pub cover_image_url: String,
	/// Calendar date in `YYYY-MM-DD` form.
	pub date_read: String,
	#[serde(default)]
	pub category: Option<String>,
}

/// A stored connection between two books.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Connection {
	pub id: String,
	pub from_book_id: String,
	pub to_book_id: String,
}

/// Aggregate reading-time summary for the timeline label.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ReadingTimeSummary {
	pub total_minutes: f64,
	pub book_count: u32,
}

/// Failure modes of a backend call.
#[derive(Debug, Error)]
pub enum ApiError {
	/// The fetch itself failed (offline, CORS, aborted).
	#[error("network request failed: {0}")]
	Transport(String),
	/// Non-2xx response without a usable body.
	#[error("server returned HTTP {0}")]
	Http(u16),
	/// The backend answered `success: false` with an error string.
	#[error("{0}")]
	Rejected(String),
	/// Body was not the JSON shape we expect.
	#[error("malformed response: {0}")]
	Decode(String),
}

fn transport(err: JsValue) -> ApiError {
	ApiError::Transport(format!("{err:?}"))
}

#[derive(Deserialize)]
struct BooksEnvelope {
	success: bool,
	#[serde(default)]
	books: Vec<Book>,
	#[serde(default)]
	connections: Vec<Connection>,
	#[serde(default)]
	error: Option<String>,
}

#[derive(Deserialize)]
struct BookEnvelope {
	success: bool,
	book: Option<Book>,
	#[serde(default)]
	error: Option<String>,
}

#[derive(Deserialize)]
struct ConnectionEnvelope {
	success: bool,
	connection: Option<Connection>,
	#[serde(default)]
	error: Option<String>,
}

#[derive(Deserialize)]
struct AckEnvelope {
	success: bool,
	#[serde(default)]
	error: Option<String>,
}

#[derive(Deserialize)]
struct ReadingTimeEnvelope {
	success: bool,
	total_minutes: Option<f64>,
	book_count: Option<u32>,
	#[serde(default)]
	error: Option<String>,
}

enum Body {
	None,
	Json(String),
	Form(FormData),
}

async fn request(method: &str, url: &str, body: Body) -> Result<String, ApiError> {
	let opts = RequestInit::new();
	opts.set_method(method);
	match body {
		Body::None => {}
		Body::Json(json) => {
			let headers = Headers::new().map_err(transport)?;
			headers
				.set("Content-Type", "application/json")
				.map_err(transport)?;
			opts.set_headers(&headers);
			opts.set_body(&JsValue::from_str(&json));
		}
		// Multipart; the browser sets the boundary header itself.
		Body::Form(form) => opts.set_body(form.as_ref()),
	}

	let request = Request::new_with_str_and_init(url, &opts).map_err(transport)?;
	let window = web_sys::window().ok_or_else(|| ApiError::Transport("no window".into()))?;
	let response = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(transport)?;
	let response: Response = response.dyn_into().map_err(transport)?;

	let text = JsFuture::from(response.text().map_err(transport)?)
		.await
		.map_err(transport)?;
	let text = text
		.as_string()
		.ok_or_else(|| ApiError::Decode("non-text body".into()))?;

	if !response.ok() {
		// Prefer the backend's own error string when the body carries one.
		if let Ok(ack) = serde_json::from_str::<AckEnvelope>(&text) {
			if let Some(error) = ack.error {
				return Err(ApiError::Rejected(error));
			}
		}
		return Err(ApiError::Http(response.status()));
	}
	Ok(text)
}

fn decode<T: for<'de> Deserialize<'de>>(text: &str) -> Result<T, ApiError> {
	serde_json::from_str(text).map_err(|err| ApiError::Decode(err.to_string()))
}

fn rejected(error: Option<String>) -> ApiError {
	ApiError::Rejected(error.unwrap_or_else(|| "request was rejected".into()))
}

/// Fetch the full snapshot of books and their connections.
pub async fn fetch_books() -> Result<(Vec<Book>, Vec<Connection>), ApiError> {
	let text = request("GET", "/api/books", Body::None).await?;
	let envelope: BooksEnvelope = decode(&text)?;
	if !envelope.success {
		return Err(rejected(envelope.error));
	}
	Ok((envelope.books, envelope.connections))
}

/// Create a book from the add-book form (multipart: cover image + metadata).
pub async fn create_book(form: FormData) -> Result<Book, ApiError> {
	let text = request("POST", "/api/books", Body::Form(form)).await?;
	let envelope: BookEnvelope = decode(&text)?;
	match (envelope.success, envelope.book) {
		(true, Some(book)) => Ok(book),
		(true, None) => Err(ApiError::Decode("missing book in response".into())),
		(false, _) => Err(rejected(envelope.error)),
	}
}

/// Delete a book; the backend cascades its connections.
pub async fn delete_book(id: &str) -> Result<(), ApiError> {
	let text = request("DELETE", &format!("/api/books/{id}"), Body::None).await?;
	let envelope: AckEnvelope = decode(&text)?;
	if !envelope.success {
		return Err(rejected(envelope.error));
	}
	Ok(())
}

/// Create a connection between two books.
///
/// The backend rejects duplicates (in either direction) and
/// self-connections with `success: false`.
pub async fn create_connection(from_id: &str, to_id: &str) -> Result<Connection, ApiError> {
	let body = serde_json::json!({ "fromId": from_id, "toId": to_id }).to_string();
	let text = request("POST", "/api/books/connections", Body::Json(body)).await?;
	let envelope: ConnectionEnvelope = decode(&text)?;
	match (envelope.success, envelope.connection) {
		(true, Some(connection)) => Ok(connection),
		(true, None) => Err(ApiError::Decode("missing connection in response".into())),
		(false, _) => Err(rejected(envelope.error)),
	}
}

/// Delete a single connection.
pub async fn delete_connection(id: &str) -> Result<(), ApiError> {
	let text = request(
		"DELETE",
		&format!("/api/books/connections/{id}"),
		Body::None,
	)
	.await?;
	let envelope: AckEnvelope = decode(&text)?;
	if !envelope.success {
		return Err(rejected(envelope.error));
	}
	Ok(())
}

/// Fetch the aggregate reading-time summary shown next to the timeline.
pub async fn fetch_total_reading_time() -> Result<ReadingTimeSummary, ApiError> {
	let text = request("GET", "/api/books/total-reading-time", Body::None).await?;
	let envelope: ReadingTimeEnvelope = decode(&text)?;
	if !envelope.success {
		return Err(rejected(envelope.error));
	}
	Ok(ReadingTimeSummary {
		total_minutes: envelope.total_minutes.unwrap_or(0.0),
		book_count: envelope.book_count.unwrap_or(0),
	})
}
