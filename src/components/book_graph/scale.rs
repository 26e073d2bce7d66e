//! Scale/zoom model: clamped zoom factor, node sizing, and the spacing
//! curve fed back into the physics simulation.
//!
//! Node size grows sub-linearly with zoom while target spacing grows faster,
//! which is what produces the infinite-depth feel instead of a plain camera
//! zoom. Spacing reapplication is throttled and followed by a short settle
//! window so the simulation never runs unattended.

/// Zoom bounds.
pub const MIN_SCALE: f64 = 0.2;
pub const MAX_SCALE: f64 = 8.0;

/// Node diameter at scale 1.0, in world units, and its hard cap.
pub const BASE_NODE_SIZE: f64 = 40.0;
pub const MAX_NODE_SIZE: f64 = 65.0;
const SIZE_EXPONENT: f64 = 0.12;

/// Target inter-node spacing at scale 1.0 and its growth exponent. Spacing
/// must outgrow node size, hence the larger exponent.
pub const BASE_SPACING: f64 = 250.0;
const SPACING_EXPONENT: f64 = 0.4;

/// Minimum interval between spacing reapplications.
pub const SPACING_INTERVAL_MS: f64 = 100.0;

/// Simulation ticks granted after the initial load, then never again.
pub const STABILIZE_TICKS: u32 = 300;
/// Short settle window after each spacing reapplication or optimistic edit.
pub const SETTLE_TICKS: u32 = 6;
/// Settle window after a snapshot reload changes the structure.
pub const RELOAD_SETTLE_TICKS: u32 = 30;

const WHEEL_STEP: f64 = 1.1;

/// Clamp a zoom factor into the supported range.
pub fn clamp_scale(scale: f64) -> f64 {
	scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Next zoom factor for one wheel event. Scrolling out shrinks, scrolling in
/// grows, always clamped.
pub fn wheel_scale(scale: f64, delta_y: f64) -> f64 {
	let factor = if delta_y > 0.0 {
		1.0 / WHEEL_STEP
	} else {
		WHEEL_STEP
	};
	clamp_scale(scale * factor)
}

/// Rendered node diameter for a zoom factor; non-decreasing and capped.
pub fn node_size(scale: f64) -> f64 {
	(BASE_NODE_SIZE * scale.powf(SIZE_EXPONENT)).min(MAX_NODE_SIZE)
}

/// Target inter-node spacing for a zoom factor.
pub fn spacing(scale: f64) -> f64 {
	BASE_SPACING * scale.powf(SPACING_EXPONENT)
}

/// Physics constants handed to the layout engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsProfile {
	pub charge: f32,
	pub spring: f32,
	pub damping: f32,
}

/// Profile for the initial stabilization run.
pub fn startup_physics() -> PhysicsProfile {
	PhysicsProfile {
		charge: 150.0,
		spring: 0.05,
		damping: 0.9,
	}
}

/// Profile for a spacing reapplication: repulsion carries the target
/// spacing (the engine has no direct spring-length parameter), springs are
/// nearly off and damping is heavy so nodes drift without jitter.
pub fn settle_physics(spacing: f64) -> PhysicsProfile {
	PhysicsProfile {
		charge: (150.0 * spacing / BASE_SPACING) as f32,
		spring: 0.005,
		damping: 0.97,
	}
}

/// Rate limiter for spacing reapplications, by timestamp comparison.
#[derive(Debug)]
pub struct ZoomThrottle {
	last_ms: f64,
}

impl ZoomThrottle {
	pub fn new() -> Self {
		Self {
			last_ms: f64::NEG_INFINITY,
		}
	}

	/// True at most once per [`SPACING_INTERVAL_MS`].
	pub fn ready(&mut self, now_ms: f64) -> bool {
		if now_ms - self.last_ms >= SPACING_INTERVAL_MS {
			self.last_ms = now_ms;
			true
		} else {
			false
		}
	}
}

impl Default for ZoomThrottle {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn scale_clamps_at_both_bounds() {
		assert_eq!(clamp_scale(0.01), MIN_SCALE);
		assert_eq!(clamp_scale(50.0), MAX_SCALE);
		assert_eq!(clamp_scale(1.5), 1.5);
	}

	#[test]
	fn scrolling_out_near_the_floor_lands_exactly_on_min_scale() {
		let scale = wheel_scale(MIN_SCALE + 0.01, 120.0);
		assert_eq!(scale, MIN_SCALE);
	}

	#[test]
	fn wheel_direction_matches_zoom_direction() {
		assert!(wheel_scale(1.0, -120.0) > 1.0);
		assert!(wheel_scale(1.0, 120.0) < 1.0);
	}

	#[test]
	fn node_size_is_non_decreasing_and_capped() {
		let mut prev = 0.0;
		for step in 0..200 {
			let scale = MIN_SCALE + (MAX_SCALE - MIN_SCALE) * f64::from(step) / 199.0;
			let size = node_size(scale);
			assert!(size >= prev);
			assert!(size <= MAX_NODE_SIZE);
			prev = size;
		}
		// Far past the cap the size stays constant.
		assert_eq!(node_size(1e3), MAX_NODE_SIZE);
		assert_eq!(node_size(1e6), MAX_NODE_SIZE);
	}

	#[test]
	fn spacing_outgrows_node_size() {
		let size_ratio = node_size(4.0) / node_size(1.0);
		let spacing_ratio = spacing(4.0) / spacing(1.0);
		assert!(spacing_ratio > size_ratio);
	}

	#[test]
	fn throttle_allows_at_most_one_update_per_interval() {
		let mut throttle = ZoomThrottle::new();
		assert!(throttle.ready(0.0));
		assert!(!throttle.ready(50.0));
		assert!(!throttle.ready(99.0));
		assert!(throttle.ready(150.0));
	}
}
