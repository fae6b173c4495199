pub mod base;
pub mod compose;
pub mod draw;
pub mod overlay;

pub use base::{render_base, render_fallback};
pub use compose::{compose, export_png};
pub use overlay::render_overlay;
