//! Top-level pages.

pub mod bookshelf;
pub mod not_found;
