//! In-memory snapshot of books and connections.
//!
//! The store is rebuilt from a fresh `/api/books` load and mutated only by
//! small optimistic updates that mirror a confirmed backend change. Every
//! optimistic update is idempotent by id, so a full reload is always safe.

use std::collections::HashSet;

use log::warn;

use crate::api::{Book, Connection};

/// Canonical key for an unordered book pair. Connections are kept ordered as
/// received for rendering, but deduplicated through this key.
fn pair_key<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
	if a <= b { (a, b) } else { (b, a) }
}

/// The loaded graph snapshot plus optimistic local mutations.
#[derive(Debug, Default)]
pub struct GraphStore {
	books: Vec<Book>,
	connections: Vec<Connection>,
}

impl GraphStore {
	/// Build a sanitized snapshot. Self-loops, connections referencing a
	/// missing book, and duplicate unordered pairs are dropped with a
	/// warning rather than treated as fatal.
	pub fn new(books: Vec<Book>, connections: Vec<Connection>) -> Self {
		let ids: HashSet<&str> = books.iter().map(|b| b.id.as_str()).collect();
		let mut seen: HashSet<(String, String)> = HashSet::new();
		let connections = connections
			.into_iter()
			.filter(|conn| {
				if conn.from_book_id == conn.to_book_id {
					warn!("dropping self-connection {}", conn.id);
					return false;
				}
				if !ids.contains(conn.from_book_id.as_str())
					|| !ids.contains(conn.to_book_id.as_str())
				{
					warn!("dropping connection {} with a missing endpoint", conn.id);
					return false;
				}
				let (a, b) = pair_key(&conn.from_book_id, &conn.to_book_id);
				if !seen.insert((a.to_owned(), b.to_owned())) {
					warn!("dropping duplicate connection {}", conn.id);
					return false;
				}
				true
			})
			.collect();
		Self { books, connections }
	}

	pub fn books(&self) -> &[Book] {
		&self.books
	}

	pub fn connections(&self) -> &[Connection] {
		&self.connections
	}

	pub fn book(&self, id: &str) -> Option<&Book> {
		self.books.iter().find(|b| b.id == id)
	}

	pub fn connection(&self, id: &str) -> Option<&Connection> {
		self.connections.iter().find(|c| c.id == id)
	}

	/// Whether any connection joins the two books, in either direction.
	pub fn has_edge_between(&self, a: &str, b: &str) -> bool {
		let key = pair_key(a, b);
		self.connections
			.iter()
			.any(|c| pair_key(&c.from_book_id, &c.to_book_id) == key)
	}

	pub fn is_empty(&self) -> bool {
		self.books.is_empty()
	}

	/// Insert a freshly created connection. Returns `false` (leaving the
	/// store unchanged) for self-loops, unknown endpoints, duplicate pairs,
	/// or an id already present.
	pub fn apply_created_edge(&mut self, conn: Connection) -> bool {
		if conn.from_book_id == conn.to_book_id
			|| self.book(&conn.from_book_id).is_none()
			|| self.book(&conn.to_book_id).is_none()
			|| self.has_edge_between(&conn.from_book_id, &conn.to_book_id)
			|| self.connection(&conn.id).is_some()
		{
			return false;
		}
		self.connections.push(conn);
		true
	}

	/// Remove one connection by id. Returns whether anything was removed.
	pub fn apply_removed_edge(&mut self, id: &str) -> bool {
		let before = self.connections.len();
		self.connections.retain(|c| c.id != id);
		self.connections.len() != before
	}

	/// Remove a book and every connection incident to it.
	pub fn apply_removed_node(&mut self, id: &str) -> bool {
		let before = self.books.len();
		self.books.retain(|b| b.id != id);
		self.connections
			.retain(|c| c.from_book_id != id && c.to_book_id != id);
		self.books.len() != before
	}
}

#[cfg(test)]
mod tests {
	use super::GraphStore;
	use crate::api::{Book, Connection};

	fn book(id: &str, title: &str) -> Book {
		Book {
			id: id.into(),
			title: title.into(),
			author: "Author".into(),
			cover_image_url: format!("/uploads/{id}.jpg"),
			date_read: "2024-01-01".into(),
			category: None,
		}
	}

	fn conn(id: &str, from: &str, to: &str) -> Connection {
		Connection {
			id: id.into(),
			from_book_id: from.into(),
			to_book_id: to.into(),
		}
	}

	fn three_books() -> Vec<Book> {
		vec![book("1", "A"), book("2", "B"), book("3", "C")]
	}

	#[test]
	fn drops_connections_with_missing_endpoints() {
		let store = GraphStore::new(
			three_books(),
			vec![conn("e1", "1", "2"), conn("e2", "2", "missing")],
		);
		assert_eq!(store.connections().len(), 1);
		assert_eq!(store.connections()[0].id, "e1");
	}

	#[test]
	fn drops_self_loops_and_duplicate_pairs_in_either_direction() {
		let store = GraphStore::new(
			three_books(),
			vec![
				conn("e1", "1", "2"),
				conn("e2", "2", "1"),
				conn("e3", "3", "3"),
			],
		);
		assert_eq!(store.connections().len(), 1);
		assert_eq!(store.connections()[0].id, "e1");
	}

	#[test]
	fn duplicate_create_leaves_store_unchanged() {
		let mut store = GraphStore::new(three_books(), vec![conn("e1", "1", "2")]);
		assert!(!store.apply_created_edge(conn("e2", "2", "1")));
		assert!(!store.apply_created_edge(conn("e1", "1", "2")));
		assert_eq!(store.connections().len(), 1);
	}

	#[test]
	fn self_connection_is_never_inserted() {
		let mut store = GraphStore::new(three_books(), vec![]);
		assert!(!store.apply_created_edge(conn("e1", "2", "2")));
		assert!(store.connections().is_empty());
	}

	#[test]
	fn connect_scenario_adds_new_pair_without_duplicating_existing() {
		let mut store = GraphStore::new(three_books(), vec![conn("e1", "1", "2")]);
		assert!(store.apply_created_edge(conn("new", "1", "3")));
		assert_eq!(store.connections().len(), 2);
		assert!(store.has_edge_between("1", "2"));
		assert!(store.has_edge_between("3", "1"));
	}

	#[test]
	fn removing_a_book_cascades_to_incident_edges_only() {
		let mut store = GraphStore::new(
			three_books(),
			vec![conn("e1", "1", "2"), conn("e2", "2", "3")],
		);
		assert!(store.apply_removed_node("1"));
		assert!(store.book("1").is_none());
		assert_eq!(store.connections().len(), 1);
		assert_eq!(store.connections()[0].id, "e2");
	}

	#[test]
	fn removing_an_edge_removes_only_that_edge() {
		let mut store = GraphStore::new(
			three_books(),
			vec![conn("e1", "1", "2"), conn("e2", "2", "3")],
		);
		assert!(store.apply_removed_edge("e1"));
		assert!(!store.apply_removed_edge("e1"));
		assert_eq!(store.books().len(), 3);
		assert_eq!(store.connections().len(), 1);
	}
}
