//! Best-effort extraction of a slide's title and body text.

use crate::deck::{scan_shapes, ShapeText};
use crate::error::Result;

/// The `{title, body}` pair derived from one slide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideContent {
    pub title: String,
    pub body: String,
}

impl SlideContent {
    /// True when the slide yielded neither title nor body text.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.body.is_empty()
    }
}

/// Extract a slide's title and main body text.
///
/// The body search runs in two passes because not every template marks
/// its main text box with a recognized placeholder role: first the
/// body/object placeholders, then, only if that found nothing, any
/// non-title shape carrying a text frame. Both passes keep the longest
/// text, first seen winning on equal length. A slide with no
/// text-bearing shapes yields an empty pair.
pub fn extract(slide_xml: &str) -> Result<SlideContent> {
    Ok(extract_from_shapes(&scan_shapes(slide_xml)?))
}

fn extract_from_shapes(shapes: &[ShapeText]) -> SlideContent {
    let title_index = shapes
        .iter()
        .position(|s| s.role.is_some_and(|r| r.is_title()));
    let mut title = title_index
        .map(|i| shapes[i].text.clone())
        .unwrap_or_default();

    let mut body = String::new();
    let mut best_len: Option<usize> = None;
    for shape in shapes {
        if shape.role.is_some_and(|r| r.is_content()) && shape.has_text_frame {
            let len = shape.text.chars().count();
            if best_len.is_none_or(|max| len > max) {
                body = shape.text.clone();
                best_len = Some(len);
            }
        }
    }

    if body.is_empty() {
        let mut best_len: Option<usize> = None;
        for (i, shape) in shapes.iter().enumerate() {
            if Some(i) == title_index || !shape.has_text_frame {
                continue;
            }
            let len = shape.text.chars().count();
            if best_len.is_none_or(|max| len > max) {
                body = shape.text.clone();
                best_len = Some(len);
            }
        }
    }

    if title.is_empty() && !body.is_empty() {
        title = body.split('\n').next().unwrap_or("").to_string();
    }

    SlideContent { title, body }
}
