//! UI components.

mod add_book_form;
pub mod book_graph;
mod detail_overlay;
mod status;

pub use add_book_form::AddBookForm;
pub use detail_overlay::DetailOverlay;
pub use status::{StatusLevel, StatusMessage};
