//! Owned per-instance state for one bookshelf graph view.
//!
//! Everything lives on this struct (no module globals); the component
//! creates it once per page view and drops it on unmount.

use super::interaction::{ClickTarget, InteractionState, Mode};
use super::layout::BookLayout;
use super::scale::{
	self, RELOAD_SETTLE_TICKS, SETTLE_TICKS, STABILIZE_TICKS, ZoomThrottle, startup_physics,
};
use super::store::GraphStore;
use super::timeline::{TimelineView, build_timeline};
use crate::api::Connection;

/// Which projection of the book set is on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewKind {
	#[default]
	Graph,
	Timeline,
}

/// Camera transform: screen = world * k + (x, y).
#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

/// In-progress node drag.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub book_id: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

/// In-progress background pan.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Extra slack around a node's visual radius when hit-testing.
const NODE_HIT_SLACK: f64 = 4.0;
/// World-space tolerance for edge hits.
const EDGE_HIT_TOLERANCE: f64 = 6.0;

pub struct BookGraphState {
	pub store: GraphStore,
	pub layout: BookLayout,
	pub timeline: TimelineView,
	pub interaction: InteractionState,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	zoom_throttle: ZoomThrottle,
	/// Rendered node diameter in world units, derived from the scale.
	pub node_size: f64,
	/// Remaining simulation ticks before physics freezes.
	pub settle_ticks: u32,
	pub view: ViewKind,
	/// Node shown in the detail overlay.
	pub selected: Option<String>,
	pub width: f64,
	pub height: f64,
}

impl BookGraphState {
	pub fn new(store: GraphStore, width: f64, height: f64) -> Self {
		let layout = BookLayout::new(&store, width, height, startup_physics());
		let timeline = build_timeline(store.books(), width, height);
		Self {
			store,
			layout,
			timeline,
			interaction: InteractionState::default(),
			transform: ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			zoom_throttle: ZoomThrottle::new(),
			node_size: scale::node_size(1.0),
			settle_ticks: STABILIZE_TICKS,
			view: ViewKind::default(),
			selected: None,
			width,
			height,
		}
	}

	/// Swap in a freshly loaded snapshot, keeping camera and placements.
	pub fn reload(&mut self, store: GraphStore) {
		self.store = store;
		self.layout.rebuild(&self.store);
		self.timeline = build_timeline(self.store.books(), self.width, self.height);
		if let Some(selected) = &self.selected {
			if self.store.book(selected).is_none() {
				self.selected = None;
			}
		}
		self.settle_ticks = self.settle_ticks.max(RELOAD_SETTLE_TICKS);
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Resolve a click in graph view. Nodes win over edges when both are
	/// under the pointer.
	pub fn hit_test(&self, sx: f64, sy: f64) -> ClickTarget {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let radius = self.node_size / 2.0 + NODE_HIT_SLACK;
		if let Some(book_id) = self.layout.node_at(gx, gy, radius) {
			return ClickTarget::Node(book_id);
		}
		if let Some(connection_id) = self.layout.connection_at(gx, gy, EDGE_HIT_TOLERANCE) {
			return ClickTarget::Edge(connection_id);
		}
		ClickTarget::Background
	}

	/// One wheel event: clamped anchored zoom, node resize, and a throttled
	/// spacing reapplication followed by a short settle window.
	pub fn apply_wheel(&mut self, sx: f64, sy: f64, delta_y: f64, now_ms: f64) {
		if self.view != ViewKind::Graph {
			return;
		}
		let new_k = scale::wheel_scale(self.transform.k, delta_y);
		if (new_k - self.transform.k).abs() < 1e-9 {
			// Already at the bound; skip the recompute entirely.
			return;
		}
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
		self.node_size = scale::node_size(new_k);

		if self.zoom_throttle.ready(now_ms) {
			let spacing = scale::spacing(new_k);
			self.layout.set_physics(scale::settle_physics(spacing));
			self.settle_ticks = SETTLE_TICKS;
		}
	}

	/// Switch interaction mode, clearing pending and selection highlights.
	pub fn set_mode(&mut self, mode: Mode) {
		self.interaction.set_mode(mode);
		self.selected = None;
	}

	pub fn set_view(&mut self, view: ViewKind) {
		if self.view == view {
			return;
		}
		self.view = view;
		if view == ViewKind::Timeline {
			// Re-entering the timeline resets every click cycle.
			self.timeline = build_timeline(self.store.books(), self.width, self.height);
		}
	}

	/// Advance physics while a settle window is open.
	pub fn tick(&mut self, dt: f32) {
		if self.view == ViewKind::Graph && self.settle_ticks > 0 {
			self.layout.tick(dt);
			self.settle_ticks -= 1;
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.layout.resize(width, height);
		self.timeline = build_timeline(self.store.books(), width, height);
	}

	/// Apply a confirmed new connection locally.
	pub fn insert_connection(&mut self, conn: Connection) -> bool {
		if !self.store.apply_created_edge(conn.clone()) {
			return false;
		}
		self.layout.add_connection(&conn);
		self.settle_ticks = self.settle_ticks.max(SETTLE_TICKS);
		true
	}

	/// Apply a confirmed connection deletion locally.
	pub fn remove_connection(&mut self, connection_id: &str) {
		if self.store.apply_removed_edge(connection_id) {
			self.layout.remove_connection(connection_id);
		}
	}

	/// Apply a confirmed book deletion locally: the node and every incident
	/// edge disappear.
	pub fn remove_book(&mut self, book_id: &str) {
		if self.store.apply_removed_node(book_id) {
			self.layout.remove_book(book_id);
			self.timeline = build_timeline(self.store.books(), self.width, self.height);
			if self.selected.as_deref() == Some(book_id) {
				self.selected = None;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::{Book, Connection};
	use crate::components::book_graph::scale::{MIN_SCALE, SPACING_INTERVAL_MS};

	fn book(id: &str) -> Book {
		Book {
			id: id.into(),
			title: format!("Book {id}"),
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

	fn state() -> BookGraphState {
		let store = GraphStore::new(
			vec![book("1"), book("2"), book("3")],
			vec![conn("e1", "1", "2")],
		);
		BookGraphState::new(store, 800.0, 600.0)
	}

	#[test]
	fn zooming_out_at_the_floor_clamps_to_min_scale() {
		let mut s = state();
		s.transform.k = MIN_SCALE + 0.01;
		s.apply_wheel(400.0, 300.0, 120.0, 0.0);
		assert_eq!(s.transform.k, MIN_SCALE);
		// A further scroll out is a no-op.
		let (x, y) = (s.transform.x, s.transform.y);
		s.apply_wheel(400.0, 300.0, 120.0, SPACING_INTERVAL_MS * 2.0);
		assert_eq!(s.transform.k, MIN_SCALE);
		assert_eq!((s.transform.x, s.transform.y), (x, y));
	}

	#[test]
	fn switching_mode_clears_pending_and_selection() {
		let mut s = state();
		s.set_mode(Mode::Connect);
		s.interaction.click(ClickTarget::Node("1".into()));
		s.selected = Some("1".into());
		s.set_mode(Mode::View);
		assert_eq!(s.interaction.pending(), None);
		assert_eq!(s.selected, None);
	}

	#[test]
	fn physics_freezes_after_the_stabilization_window() {
		let mut s = state();
		for _ in 0..STABILIZE_TICKS {
			s.tick(0.016);
		}
		assert_eq!(s.settle_ticks, 0);
		let frozen = s.layout.position_of("1");
		s.tick(0.016);
		assert_eq!(s.layout.position_of("1"), frozen);
	}

	#[test]
	fn node_hits_win_over_edge_hits() {
		let mut s = state();
		s.layout.move_node("1", 0.0, 0.0);
		s.layout.move_node("2", 100.0, 0.0);
		s.layout.move_node("3", 0.0, 300.0);
		// Directly over node 2 and over the 1-2 segment.
		assert_eq!(s.hit_test(100.0, 0.0), ClickTarget::Node("2".into()));
		// Between the endpoints only the edge remains.
		assert_eq!(s.hit_test(50.0, 0.0), ClickTarget::Edge("e1".into()));
		assert_eq!(s.hit_test(400.0, 400.0), ClickTarget::Background);
	}

	#[test]
	fn deleting_the_selected_book_closes_its_overlay() {
		let mut s = state();
		s.selected = Some("1".into());
		s.remove_book("1");
		assert_eq!(s.selected, None);
		assert!(s.store.book("1").is_none());
		assert!(!s.store.has_edge_between("1", "2"));
	}

	#[test]
	fn duplicate_connection_insert_is_rejected_locally() {
		let mut s = state();
		assert!(!s.insert_connection(conn("e9", "2", "1")));
		assert_eq!(s.store.connections().len(), 1);
	}

	#[test]
	fn timeline_cursors_reset_when_the_view_is_reentered() {
		let mut s = state();
		s.set_view(ViewKind::Timeline);
		let first = s.timeline.advance(0);
		let second = s.timeline.advance(0);
		assert_ne!(first, second);
		s.set_view(ViewKind::Graph);
		s.set_view(ViewKind::Timeline);
		assert_eq!(s.timeline.advance(0), first);
	}
}
