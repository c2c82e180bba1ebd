//! Layout remapping: rebuild every content-bearing slide under a new
//! layout template, appending the copies after the originals.

use crate::deck::Presentation;
use crate::error::{Error, Result};
use crate::extract;
use std::fmt;

/// Title of the divider slide inserted before the redesigned copies.
pub const SEPARATOR_CAPTION: &str = "--- Redesigned Slides ---";

/// A non-fatal, per-slide condition recorded during a remap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemapWarning {
    /// The target layout has no body or object placeholder, so the
    /// appended slide keeps its title only. `slide` is the 1-based
    /// position among the appended content slides.
    MissingBodyPlaceholder { slide: usize },
}

impl fmt::Display for RemapWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemapWarning::MissingBodyPlaceholder { slide } => write!(
                f,
                "target layout has no body placeholder; appended slide {slide} keeps its title only"
            ),
        }
    }
}

/// Outcome of a successful remap.
#[derive(Debug, Clone, Default)]
pub struct RemapSummary {
    /// Total slides appended, separator included.
    pub appended: usize,
    /// Whether a divider slide was inserted before the copies.
    pub separator_added: bool,
    pub warnings: Vec<RemapWarning>,
}

/// Append redesigned copies of every content-bearing slide, built from
/// the layout template at `layout_index`.
///
/// The slide list is snapshotted up front, so the appends never feed
/// back into the extraction pass and originals stay untouched. A
/// divider slide is inserted first when a layout named like a header
/// exists ("Header" or "Title Only" in its name, first match in
/// template order); with no match the divider is skipped silently.
///
/// Aborts without mutating on an out-of-range index
/// ([`Error::InvalidLayout`]) or when no slide yields any text
/// ([`Error::NoExtractableContent`]). A missing body placeholder on
/// the target layout is per-slide and non-fatal: the slide keeps its
/// title and a [`RemapWarning`] is recorded.
pub fn remap(prs: &mut Presentation, layout_index: usize) -> Result<RemapSummary> {
    let layout_count = prs.layouts().len();
    if layout_index >= layout_count {
        return Err(Error::InvalidLayout {
            index: layout_index,
            count: layout_count,
        });
    }

    let snapshot: Vec<String> = (0..prs.slide_count())
        .map(|i| prs.read_slide_xml(i))
        .collect::<Result<_>>()?;

    let mut contents = Vec::new();
    for xml in &snapshot {
        let content = extract::extract(xml)?;
        if !content.is_empty() {
            contents.push(content);
        }
    }
    if contents.is_empty() {
        return Err(Error::NoExtractableContent);
    }

    let mut summary = RemapSummary::default();

    let separator_layout = prs
        .layouts()
        .iter()
        .position(|l| l.name.contains("Header") || l.name.contains("Title Only"));
    if let Some(index) = separator_layout {
        prs.append_slide(index, Some(SEPARATOR_CAPTION), None)?;
        summary.separator_added = true;
        summary.appended += 1;
    }

    for (position, content) in contents.iter().enumerate() {
        let appended = prs.append_slide(layout_index, Some(&content.title), Some(&content.body))?;
        summary.appended += 1;
        if !appended.body_placed {
            summary.warnings.push(RemapWarning::MissingBodyPlaceholder {
                slide: position + 1,
            });
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let warning = RemapWarning::MissingBodyPlaceholder { slide: 2 };
        assert_eq!(
            warning.to_string(),
            "target layout has no body placeholder; appended slide 2 keeps its title only"
        );
    }
}
