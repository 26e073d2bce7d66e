mod component;
mod interaction;
mod layout;
mod render;
pub mod scale;
mod state;
mod store;
pub mod timeline;

pub use component::BookGraphCanvas;
pub use interaction::Mode;
pub use state::ViewKind;
