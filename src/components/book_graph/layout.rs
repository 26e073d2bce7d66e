//! Wrapper around the force-directed simulation.
//!
//! The rest of the component only sees rebuild/add/remove/tick/positions, so
//! the concrete engine is swappable. `force_graph` fixes its parameters at
//! construction time, so physics changes and structural removals reconstruct
//! the simulation while carrying node positions (and anchors) across by
//! book id.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::scale::PhysicsProfile;
use super::store::GraphStore;
use crate::api::Connection;

/// Per-node payload: the backing book id.
#[derive(Clone, Debug, Default)]
pub struct NodeGlyph {
	pub book_id: String,
}

#[derive(Clone, Debug)]
struct EdgeHandle {
	connection_id: String,
	from_id: String,
	to_id: String,
}

/// A rendered connection segment in world coordinates.
#[derive(Clone, Debug)]
pub struct EdgeLine {
	pub connection_id: String,
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
}

/// Saved node placement: position plus whether the user pinned it.
type Placement = (f32, f32, bool);

fn params(profile: PhysicsProfile) -> SimulationParameters {
	SimulationParameters {
		force_charge: profile.charge,
		force_spring: profile.spring,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: profile.damping,
	}
}

/// Distance from a point to a line segment, for edge hit-testing.
fn dist_to_segment(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
	let (dx, dy) = (x2 - x1, y2 - y1);
	let len_sq = dx * dx + dy * dy;
	let t = if len_sq == 0.0 {
		0.0
	} else {
		(((px - x1) * dx + (py - y1) * dy) / len_sq).clamp(0.0, 1.0)
	};
	let (cx, cy) = (x1 + t * dx, y1 + t * dy);
	((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

/// The layout engine instance for one graph view.
pub struct BookLayout {
	graph: ForceGraph<NodeGlyph, ()>,
	index_of: HashMap<String, DefaultNodeIdx>,
	edges: Vec<EdgeHandle>,
	profile: PhysicsProfile,
	width: f64,
	height: f64,
}

impl BookLayout {
	pub fn new(store: &GraphStore, width: f64, height: f64, profile: PhysicsProfile) -> Self {
		let mut layout = Self {
			graph: ForceGraph::new(params(profile)),
			index_of: HashMap::new(),
			edges: Vec::new(),
			profile,
			width,
			height,
		};
		layout.populate(store, &HashMap::new());
		layout
	}

	/// Replace the node and edge sets from a fresh snapshot, keeping the
	/// placement of every surviving node.
	pub fn rebuild(&mut self, store: &GraphStore) {
		let placements = self.placements();
		self.graph = ForceGraph::new(params(self.profile));
		self.index_of.clear();
		self.edges.clear();
		self.populate(store, &placements);
	}

	fn populate(&mut self, store: &GraphStore, placements: &HashMap<String, Placement>) {
		let count = store.books().len().max(1);
		for (i, book) in store.books().iter().enumerate() {
			let (x, y, anchored) = placements.get(&book.id).copied().unwrap_or_else(|| {
				// New nodes seed on a circle around the canvas center.
				let angle = (i as f64) * 2.0 * PI / count as f64;
				(
					(self.width / 2.0 + 120.0 * angle.cos()) as f32,
					(self.height / 2.0 + 120.0 * angle.sin()) as f32,
					false,
				)
			});
			let idx = self.graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: anchored,
				user_data: NodeGlyph {
					book_id: book.id.clone(),
				},
			});
			self.index_of.insert(book.id.clone(), idx);
		}
		for conn in store.connections() {
			self.attach(conn);
		}
	}

	fn attach(&mut self, conn: &Connection) -> bool {
		let (Some(&from), Some(&to)) = (
			self.index_of.get(&conn.from_book_id),
			self.index_of.get(&conn.to_book_id),
		) else {
			return false;
		};
		self.graph.add_edge(from, to, EdgeData::default());
		self.edges.push(EdgeHandle {
			connection_id: conn.id.clone(),
			from_id: conn.from_book_id.clone(),
			to_id: conn.to_book_id.clone(),
		});
		true
	}

	fn placements(&self) -> HashMap<String, Placement> {
		let mut placements = HashMap::new();
		self.graph.visit_nodes(|node| {
			placements.insert(
				node.data.user_data.book_id.clone(),
				(node.x(), node.y(), node.data.is_anchor),
			);
		});
		placements
	}

	/// Reconstruct the simulation from the tracked nodes and edges,
	/// dropping nodes rejected by `keep`.
	fn reconstruct(&mut self, keep: impl Fn(&str) -> bool) {
		let mut nodes: Vec<(String, Placement)> = Vec::new();
		self.graph.visit_nodes(|node| {
			let id = node.data.user_data.book_id.clone();
			if keep(&id) {
				nodes.push((id, (node.x(), node.y(), node.data.is_anchor)));
			}
		});

		self.graph = ForceGraph::new(params(self.profile));
		self.index_of.clear();
		for (id, (x, y, anchored)) in nodes {
			let idx = self.graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: anchored,
				user_data: NodeGlyph {
					book_id: id.clone(),
				},
			});
			self.index_of.insert(id, idx);
		}

		let handles = std::mem::take(&mut self.edges);
		for handle in handles {
			if let (Some(&from), Some(&to)) = (
				self.index_of.get(&handle.from_id),
				self.index_of.get(&handle.to_id),
			) {
				self.graph.add_edge(from, to, EdgeData::default());
				self.edges.push(handle);
			}
		}
	}

	/// Swap in a new physics profile, keeping all placements.
	pub fn set_physics(&mut self, profile: PhysicsProfile) {
		self.profile = profile;
		self.reconstruct(|_| true);
	}

	/// Optimistically attach a confirmed new connection.
	pub fn add_connection(&mut self, conn: &Connection) -> bool {
		// The engine has no edge removal, so additions go through the same
		// tracked-edge path reconstruction relies on.
		self.attach(conn)
	}

	/// Drop a single connection.
	pub fn remove_connection(&mut self, connection_id: &str) {
		self.edges.retain(|e| e.connection_id != connection_id);
		self.reconstruct(|_| true);
	}

	/// Drop a node; incident edges fall away during reconstruction.
	pub fn remove_book(&mut self, book_id: &str) {
		self.edges
			.retain(|e| e.from_id != book_id && e.to_id != book_id);
		self.reconstruct(|id| id != book_id);
	}

	/// Advance the simulation one step.
	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn position_of(&self, book_id: &str) -> Option<(f64, f64)> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.data.user_data.book_id == book_id {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	/// Move a node to an explicit position, pinning it there.
	pub fn move_node(&mut self, book_id: &str, x: f32, y: f32) {
		self.graph.visit_nodes_mut(|node| {
			if node.data.user_data.book_id == book_id {
				node.data.x = x;
				node.data.y = y;
				node.data.is_anchor = true;
			}
		});
	}

	/// Book whose node covers the given world-space point, if any.
	pub fn node_at(&self, gx: f64, gy: f64, radius: f64) -> Option<String> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < radius {
				found = Some(node.data.user_data.book_id.clone());
			}
		});
		found
	}

	/// Connection whose segment passes within `tolerance` of the point.
	pub fn connection_at(&self, gx: f64, gy: f64, tolerance: f64) -> Option<String> {
		self.edge_lines()
			.into_iter()
			.find(|line| dist_to_segment(gx, gy, line.x1, line.y1, line.x2, line.y2) < tolerance)
			.map(|line| line.connection_id)
	}

	/// Current edge segments in world coordinates, for rendering and
	/// hit-testing.
	pub fn edge_lines(&self) -> Vec<EdgeLine> {
		let mut positions: HashMap<&str, (f64, f64)> = HashMap::new();
		let mut raw: Vec<(String, f64, f64)> = Vec::new();
		self.graph.visit_nodes(|node| {
			raw.push((
				node.data.user_data.book_id.clone(),
				node.x() as f64,
				node.y() as f64,
			));
		});
		for (id, x, y) in &raw {
			positions.insert(id, (*x, *y));
		}
		self.edges
			.iter()
			.filter_map(|handle| {
				let &(x1, y1) = positions.get(handle.from_id.as_str())?;
				let &(x2, y2) = positions.get(handle.to_id.as_str())?;
				Some(EdgeLine {
					connection_id: handle.connection_id.clone(),
					x1,
					y1,
					x2,
					y2,
				})
			})
			.collect()
	}

	/// Visit every node as `(book_id, x, y)` in world coordinates.
	pub fn for_each_node(&self, mut f: impl FnMut(&str, f64, f64)) {
		self.graph.visit_nodes(|node| {
			f(
				&node.data.user_data.book_id,
				node.x() as f64,
				node.y() as f64,
			);
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::{Book, Connection};
	use crate::components::book_graph::scale::{settle_physics, startup_physics};

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

	fn store() -> GraphStore {
		GraphStore::new(
			vec![book("1"), book("2"), book("3")],
			vec![conn("e1", "1", "2"), conn("e2", "2", "3")],
		)
	}

	#[test]
	fn rebuild_preserves_surviving_positions() {
		let mut layout = BookLayout::new(&store(), 800.0, 600.0, startup_physics());
		for _ in 0..20 {
			layout.tick(0.016);
		}
		let before = layout.position_of("2").expect("node 2 placed");

		let mut smaller = store();
		smaller.apply_removed_node("1");
		layout.rebuild(&smaller);

		assert_eq!(layout.position_of("2"), Some(before));
		assert!(layout.position_of("1").is_none());
	}

	#[test]
	fn set_physics_keeps_placements() {
		let mut layout = BookLayout::new(&store(), 800.0, 600.0, startup_physics());
		layout.move_node("3", 42.0, 17.0);
		layout.set_physics(settle_physics(400.0));
		assert_eq!(layout.position_of("3"), Some((42.0, 17.0)));
		assert_eq!(layout.edge_lines().len(), 2);
	}

	#[test]
	fn removing_a_book_drops_incident_edges() {
		let mut layout = BookLayout::new(&store(), 800.0, 600.0, startup_physics());
		layout.remove_book("2");
		assert!(layout.position_of("2").is_none());
		assert!(layout.edge_lines().is_empty());
	}

	#[test]
	fn removing_a_connection_leaves_the_rest() {
		let mut layout = BookLayout::new(&store(), 800.0, 600.0, startup_physics());
		layout.remove_connection("e1");
		let lines = layout.edge_lines();
		assert_eq!(lines.len(), 1);
		assert_eq!(lines[0].connection_id, "e2");
	}

	#[test]
	fn node_hit_testing_respects_the_radius() {
		let mut layout = BookLayout::new(&store(), 800.0, 600.0, startup_physics());
		layout.move_node("1", 100.0, 100.0);
		assert_eq!(layout.node_at(104.0, 103.0, 20.0), Some("1".into()));
		assert_eq!(layout.node_at(300.0, 300.0, 20.0), None);
	}

	#[test]
	fn connection_hit_testing_uses_segment_distance() {
		let mut layout = BookLayout::new(&store(), 800.0, 600.0, startup_physics());
		layout.move_node("1", 0.0, 0.0);
		layout.move_node("2", 100.0, 0.0);
		layout.move_node("3", 500.0, 500.0);
		assert_eq!(layout.connection_at(50.0, 3.0, 6.0), Some("e1".into()));
		assert_eq!(layout.connection_at(50.0, 30.0, 6.0), None);
	}

	#[test]
	fn segment_distance_handles_endpoints_and_degenerate_segments() {
		assert_eq!(dist_to_segment(0.0, 5.0, 0.0, 0.0, 10.0, 0.0), 5.0);
		assert_eq!(dist_to_segment(-3.0, 0.0, 0.0, 0.0, 10.0, 0.0), 3.0);
		assert_eq!(dist_to_segment(3.0, 4.0, 1.0, 1.0, 1.0, 1.0), (4.0f64 + 9.0).sqrt());
	}
}
