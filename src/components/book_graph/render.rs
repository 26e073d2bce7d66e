//! Canvas drawing for both projections of the book set.

use std::collections::HashMap;
use std::f64::consts::PI;

use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::state::{BookGraphState, ViewKind};
use super::timeline::MARKER_RADIUS;

/// Cover images keyed by book id, loaded once per snapshot.
pub type ImageCache = HashMap<String, HtmlImageElement>;

const BACKGROUND: &str = "#faf6ef";
const ACCENT: &str = "#C16A28";
const ACCENT_FAINT: &str = "rgba(193, 106, 40, 0.3)";
const EDGE_COLOR: &str = "rgba(26, 26, 26, 0.1)";
const INK: &str = "#1a1a1a";

pub fn render(state: &BookGraphState, images: &ImageCache, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	match state.view {
		ViewKind::Graph => {
			ctx.save();
			let _ = ctx.translate(state.transform.x, state.transform.y);
			let _ = ctx.scale(state.transform.k, state.transform.k);
			draw_edges(state, ctx);
			draw_nodes(state, images, ctx);
			ctx.restore();
		}
		ViewKind::Timeline => draw_timeline(state, images, ctx),
	}
}

fn draw_edges(state: &BookGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_line_width(1.5 / k);
	for line in state.layout.edge_lines() {
		ctx.begin_path();
		ctx.move_to(line.x1, line.y1);
		ctx.line_to(line.x2, line.y2);
		ctx.stroke();
	}
}

fn draw_cover(
	images: &ImageCache,
	ctx: &CanvasRenderingContext2d,
	book_id: &str,
	x: f64,
	y: f64,
	size: f64,
) -> bool {
	let half = size / 2.0;
	if let Some(img) = images.get(book_id) {
		if img.complete() && img.natural_width() > 0 {
			let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
				img,
				x - half,
				y - half,
				size,
				size,
			);
			return true;
		}
	}
	false
}

fn draw_nodes(state: &BookGraphState, images: &ImageCache, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let size = state.node_size;
	let half = size / 2.0;
	let pending = state.interaction.pending();
	let selected = state.selected.as_deref();

	state.layout.for_each_node(|book_id, x, y| {
		if !draw_cover(images, ctx, book_id, x, y, size) {
			// Cover still loading: a plain paper placeholder.
			ctx.set_fill_style_str("#e9e2d5");
			ctx.fill_rect(x - half, y - half, size, size);
		}

		let highlighted = pending == Some(book_id) || selected == Some(book_id);
		if highlighted {
			ctx.set_stroke_style_str(ACCENT);
			ctx.set_line_width(4.0 / k);
		} else {
			ctx.set_stroke_style_str(ACCENT_FAINT);
			ctx.set_line_width(2.0 / k);
		}
		ctx.stroke_rect(x - half, y - half, size, size);
	});
}

fn draw_timeline(state: &BookGraphState, images: &ImageCache, ctx: &CanvasRenderingContext2d) {
	let markers = state.timeline.markers();
	if markers.is_empty() {
		return;
	}

	// Connecting step line beneath the markers.
	ctx.set_stroke_style_str(ACCENT_FAINT);
	ctx.set_line_width(1.5);
	ctx.begin_path();
	ctx.move_to(markers[0].x, markers[0].y);
	for marker in &markers[1..] {
		ctx.line_to(marker.x, marker.y);
	}
	ctx.stroke();

	ctx.set_text_align("center");
	for (i, marker) in markers.iter().enumerate() {
		// Clip the current book's cover into the marker circle.
		ctx.save();
		ctx.begin_path();
		let _ = ctx.arc(marker.x, marker.y, MARKER_RADIUS, 0.0, 2.0 * PI);
		ctx.clip();
		let drawn = state
			.timeline
			.current(i)
			.map(|id| draw_cover(images, ctx, id, marker.x, marker.y, MARKER_RADIUS * 2.0))
			.unwrap_or(false);
		if !drawn {
			ctx.set_fill_style_str(ACCENT);
			ctx.fill_rect(
				marker.x - MARKER_RADIUS,
				marker.y - MARKER_RADIUS,
				MARKER_RADIUS * 2.0,
				MARKER_RADIUS * 2.0,
			);
		}
		ctx.restore();

		ctx.set_stroke_style_str(ACCENT);
		ctx.set_line_width(2.0);
		ctx.begin_path();
		let _ = ctx.arc(marker.x, marker.y, MARKER_RADIUS, 0.0, 2.0 * PI);
		ctx.stroke();

		if marker.book_ids.len() > 1 {
			ctx.set_fill_style_str(INK);
			ctx.set_font("bold 11px sans-serif");
			let _ = ctx.fill_text(
				&format!("x{}", marker.book_ids.len()),
				marker.x + MARKER_RADIUS + 10.0,
				marker.y - MARKER_RADIUS,
			);
		}

		ctx.set_fill_style_str(INK);
		ctx.set_font("11px sans-serif");
		let _ = ctx.fill_text(&marker.label, marker.x, marker.y + MARKER_RADIUS + 16.0);
	}
}
