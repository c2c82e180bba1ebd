//! Presentation container: package geography, placeholder roles, and
//! slide creation from layout templates.

mod presentation;
mod shapes;

pub use presentation::{AppendedSlide, LayoutEntry, Presentation, SlideEntry};
pub use shapes::{scan_shapes, PlaceholderRole, ShapeText};
