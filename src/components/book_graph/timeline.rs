//! Timeline alternate view: the same books projected onto a chronological
//! axis, bucketed by calendar date.
//!
//! `x` is proportional to elapsed time since the earliest read date, `y` to
//! the running count of books read, so the markers climb as a monotone step
//! function. Same-day books share one marker and clicks cycle through them.

use std::collections::HashMap;

use log::warn;
use time::Date;
use time::macros::format_description;

use crate::api::Book;

/// Visual marker radius and the slightly larger click target around it.
pub const MARKER_RADIUS: f64 = 16.0;
pub const MARKER_HIT_RADIUS: f64 = 22.0;

const MARGIN: f64 = 80.0;

/// One date bucket on the axis.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineMarker {
	/// Grouping key, the raw `YYYY-MM-DD` string.
	pub date_key: String,
	/// Human-readable date label.
	pub label: String,
	pub x: f64,
	pub y: f64,
	/// Ids of the books read on this date, in load order.
	pub book_ids: Vec<String>,
}

/// Markers plus the per-group click-cycling cursor. The cursor is ephemeral:
/// rebuilding the timeline resets every group to its first book.
#[derive(Debug, Default)]
pub struct TimelineView {
	markers: Vec<TimelineMarker>,
	cursor: HashMap<String, usize>,
}

/// Parse a stored `date_read` value.
fn parse_date(raw: &str) -> Option<Date> {
	let format = format_description!("[year]-[month]-[day]");
	Date::parse(raw, &format).ok()
}

/// Format a `date_read` value for display, falling back to the raw string
/// when it does not parse.
pub fn format_read_date(raw: &str) -> String {
	let format = format_description!("[month repr:long] [day padding:none], [year]");
	parse_date(raw)
		.and_then(|date| date.format(&format).ok())
		.unwrap_or_else(|| raw.to_owned())
}

/// Project the book set onto the timeline for a canvas of the given size.
/// Books with unparseable dates are dropped with a warning.
pub fn build_timeline(books: &[Book], width: f64, height: f64) -> TimelineView {
	let mut dated: Vec<(Date, &Book)> = books
		.iter()
		.filter_map(|book| match parse_date(&book.date_read) {
			Some(date) => Some((date, book)),
			None => {
				warn!("book {} has unparseable date_read {:?}", book.id, book.date_read);
				None
			}
		})
		.collect();
	if dated.is_empty() {
		return TimelineView::default();
	}
	// Stable sort keeps load order within a date bucket.
	dated.sort_by_key(|(date, _)| *date);

	let total = dated.len() as f64;
	let first_day = dated[0].0.to_julian_day();
	let last_day = dated[dated.len() - 1].0.to_julian_day();
	let span = f64::from(last_day - first_day);
	let usable_w = (width - 2.0 * MARGIN).max(1.0);
	let usable_h = (height - 2.0 * MARGIN).max(1.0);

	let mut markers: Vec<TimelineMarker> = Vec::new();
	let mut cumulative = 0usize;
	for (date, book) in dated {
		cumulative += 1;
		if let Some(last) = markers.last_mut() {
			if last.date_key == book.date_read {
				last.book_ids.push(book.id.clone());
				// The step height tracks the last book of the bucket.
				last.y = MARGIN + usable_h * (1.0 - cumulative as f64 / total);
				continue;
			}
		}
		let frac = if span == 0.0 {
			// Every book on the same day: one centered marker.
			0.5
		} else {
			f64::from(date.to_julian_day() - first_day) / span
		};
		markers.push(TimelineMarker {
			date_key: book.date_read.clone(),
			label: format_read_date(&book.date_read),
			x: MARGIN + usable_w * frac,
			y: MARGIN + usable_h * (1.0 - cumulative as f64 / total),
			book_ids: vec![book.id.clone()],
		});
	}

	TimelineView {
		markers,
		cursor: HashMap::new(),
	}
}

impl TimelineView {
	pub fn markers(&self) -> &[TimelineMarker] {
		&self.markers
	}

	/// Marker under a canvas-space point, if any.
	pub fn marker_at(&self, x: f64, y: f64) -> Option<usize> {
		self.markers.iter().position(|marker| {
			let (dx, dy) = (marker.x - x, marker.y - y);
			(dx * dx + dy * dy).sqrt() <= MARKER_HIT_RADIUS
		})
	}

	/// Book id a marker currently shows, without advancing the cursor.
	pub fn current(&self, index: usize) -> Option<&str> {
		let marker = self.markers.get(index)?;
		let at = self.cursor.get(&marker.date_key).copied().unwrap_or(0);
		marker.book_ids.get(at).map(String::as_str)
	}

	/// Return the marker's current book id and step its cursor, wrapping
	/// back to the first book after the last.
	pub fn advance(&mut self, index: usize) -> Option<String> {
		let marker = self.markers.get(index)?;
		let at = self
			.cursor
			.entry(marker.date_key.clone())
			.or_insert(0);
		let id = marker.book_ids.get(*at)?.clone();
		*at = (*at + 1) % marker.book_ids.len();
		Some(id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::Book;

	fn book(id: &str, date: &str) -> Book {
		Book {
			id: id.into(),
			title: format!("Book {id}"),
			author: "Author".into(),
			cover_image_url: format!("/uploads/{id}.jpg"),
			date_read: date.into(),
			category: None,
		}
	}

	#[test]
	fn same_day_books_share_one_marker_and_clicks_cycle_with_wraparound() {
		let books = vec![
			book("a", "2024-01-01"),
			book("b", "2024-01-01"),
			book("c", "2024-01-01"),
		];
		let mut timeline = build_timeline(&books, 800.0, 600.0);
		assert_eq!(timeline.markers().len(), 1);
		assert_eq!(timeline.markers()[0].book_ids.len(), 3);

		assert_eq!(timeline.advance(0).as_deref(), Some("a"));
		assert_eq!(timeline.advance(0).as_deref(), Some("b"));
		assert_eq!(timeline.advance(0).as_deref(), Some("c"));
		assert_eq!(timeline.advance(0).as_deref(), Some("a"));
	}

	#[test]
	fn single_date_snapshot_is_centered() {
		let timeline = build_timeline(&[book("a", "2024-01-01")], 800.0, 600.0);
		assert_eq!(timeline.markers()[0].x, 400.0);
	}

	#[test]
	fn markers_advance_in_time_and_climb_in_count() {
		let books = vec![
			book("a", "2023-01-10"),
			book("b", "2023-03-05"),
			book("c", "2023-06-20"),
		];
		let timeline = build_timeline(&books, 800.0, 600.0);
		let markers = timeline.markers();
		assert_eq!(markers.len(), 3);
		assert!(markers[0].x < markers[1].x && markers[1].x < markers[2].x);
		// Canvas y grows downward, so the running count climbs as y shrinks.
		assert!(markers[0].y > markers[1].y && markers[1].y > markers[2].y);
	}

	#[test]
	fn unsorted_input_is_ordered_chronologically() {
		let books = vec![book("late", "2024-05-01"), book("early", "2024-01-01")];
		let timeline = build_timeline(&books, 800.0, 600.0);
		assert_eq!(timeline.markers()[0].book_ids, vec!["early".to_owned()]);
	}

	#[test]
	fn unparseable_dates_are_dropped() {
		let books = vec![book("a", "2024-01-01"), book("b", "not-a-date")];
		let timeline = build_timeline(&books, 800.0, 600.0);
		assert_eq!(timeline.markers().len(), 1);
		assert_eq!(timeline.markers()[0].book_ids, vec!["a".to_owned()]);
	}

	#[test]
	fn rebuild_resets_the_cycling_cursor() {
		let books = vec![book("a", "2024-01-01"), book("b", "2024-01-01")];
		let mut timeline = build_timeline(&books, 800.0, 600.0);
		assert_eq!(timeline.advance(0).as_deref(), Some("a"));
		assert_eq!(timeline.advance(0).as_deref(), Some("b"));
		let mut rebuilt = build_timeline(&books, 800.0, 600.0);
		assert_eq!(rebuilt.advance(0).as_deref(), Some("a"));
	}
}
