//! # redeck
//!
//! Content-preserving recoloring and layout remapping for PowerPoint
//! presentations.
//!
//! Given a .pptx deck and a four-color scheme, redeck repaints every
//! slide's background and text runs, and can rebuild each slide's
//! extracted title/body content under a different layout template,
//! appending the rebuilt copies after the originals so the two can be
//! compared side by side.
//!
//! ## Quick Start
//!
//! ```no_run
//! use redeck::{redesign_file, ColorScheme, DesignOptions};
//!
//! // Recolor with the built-in fallback scheme and rebuild slides
//! // under layout template 1.
//! let options = DesignOptions::new(ColorScheme::fallback()).with_layout(1);
//! let (output, report) = redesign_file("quarterly.pptx", &options)?;
//! println!("wrote {}", output.display());
//! for warning in &report.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! # Ok::<(), redeck::Error>(())
//! ```
//!
//! ## Piecewise API
//!
//! ```no_run
//! use redeck::{apply_background, apply_text_colors, remap, Presentation};
//!
//! let mut prs = Presentation::open("slides.pptx")?;
//! apply_background(&mut prs, "#0D1B2A")?;
//! apply_text_colors(&mut prs, "#E0E1DD", "#FFFFFF")?;
//! let summary = remap(&mut prs, 1)?;
//! println!("appended {} slides", summary.appended);
//! prs.save("designed_slides.pptx")?;
//! # Ok::<(), redeck::Error>(())
//! ```

pub mod advisor;
pub mod color;
pub mod container;
pub mod deck;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod remap;
pub mod style;

// Re-exports
pub use advisor::ColorScheme;
pub use color::{resolve, Rgb};
pub use container::{PptxPackage, Relationship, Relationships};
pub use deck::{
    scan_shapes, AppendedSlide, LayoutEntry, PlaceholderRole, Presentation, ShapeText, SlideEntry,
};
pub use error::{Error, Result};
pub use extract::{extract, SlideContent};
pub use pipeline::{
    designed_filename, redesign_bytes, redesign_file, DesignOptions, DesignReport, DesignWarning,
    Designed,
};
pub use remap::{remap, RemapSummary, RemapWarning, SEPARATOR_CAPTION};
pub use style::{apply_background, apply_text_colors};
