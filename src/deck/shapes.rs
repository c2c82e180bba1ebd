//! Placeholder roles and shape scanning.

use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Placeholder role of a shape, from the `p:ph/@type` attribute.
///
/// A `p:ph` with no `type` attribute is an object placeholder (the
/// schema default). Unrecognized values map to `Other` so role matches
/// stay exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderRole {
    Title,
    CenterTitle,
    Subtitle,
    Body,
    Object,
    Other,
}

impl PlaceholderRole {
    pub(crate) fn from_type_attr(value: Option<&str>) -> Self {
        match value {
            None | Some("obj") => Self::Object,
            Some("title") => Self::Title,
            Some("ctrTitle") => Self::CenterTitle,
            Some("subTitle") => Self::Subtitle,
            Some("body") => Self::Body,
            Some(_) => Self::Other,
        }
    }

    /// Roles that make a shape the slide's designated title.
    pub fn is_title(self) -> bool {
        matches!(self, Self::Title | Self::CenterTitle)
    }

    /// Roles painted with the title color (subtitles included).
    pub fn is_title_styled(self) -> bool {
        matches!(self, Self::Title | Self::CenterTitle | Self::Subtitle)
    }

    /// Roles that hold a slide's main content.
    pub fn is_content(self) -> bool {
        matches!(self, Self::Body | Self::Object)
    }
}

/// A top-level shape's role and text, in document order.
#[derive(Debug, Clone)]
pub struct ShapeText {
    /// Placeholder role, `None` for a free shape.
    pub role: Option<PlaceholderRole>,
    /// Whether the shape carries a `p:txBody`.
    pub has_text_frame: bool,
    /// Plain text: runs concatenated, paragraph boundaries and line
    /// breaks as `\n`.
    pub text: String,
}

/// Scan a slide's top-level `p:sp` shapes.
///
/// Shapes nested in groups are skipped (a group exposes no text frame
/// of its own), as are tables and pictures, which live in other
/// element kinds entirely.
pub fn scan_shapes(xml: &str) -> Result<Vec<ShapeText>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut shapes = Vec::new();
    let mut group_depth = 0usize;
    let mut current: Option<ShapeText> = None;
    let mut in_txbody = false;
    let mut in_run = false;
    let mut in_text = false;
    let mut para_index = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().local_name().as_ref() {
                b"grpSp" => group_depth += 1,
                b"sp" if group_depth == 0 && current.is_none() => {
                    current = Some(ShapeText {
                        role: None,
                        has_text_frame: false,
                        text: String::new(),
                    });
                }
                b"ph" if current.is_some() && !in_txbody => {
                    if let Some(shape) = current.as_mut() {
                        shape.role = Some(role_from_ph(e));
                    }
                }
                b"txBody" if current.is_some() => {
                    in_txbody = true;
                    para_index = 0;
                    if let Some(shape) = current.as_mut() {
                        shape.has_text_frame = true;
                    }
                }
                b"p" if in_txbody => {
                    if para_index > 0 {
                        if let Some(shape) = current.as_mut() {
                            shape.text.push('\n');
                        }
                    }
                    para_index += 1;
                }
                b"r" if in_txbody => in_run = true,
                b"t" if in_run => in_text = true,
                b"br" if in_txbody => {
                    if let Some(shape) = current.as_mut() {
                        shape.text.push('\n');
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().local_name().as_ref() {
                b"ph" if current.is_some() && !in_txbody => {
                    if let Some(shape) = current.as_mut() {
                        shape.role = Some(role_from_ph(e));
                    }
                }
                b"p" if in_txbody => {
                    // Empty paragraph still contributes a line.
                    if para_index > 0 {
                        if let Some(shape) = current.as_mut() {
                            shape.text.push('\n');
                        }
                    }
                    para_index += 1;
                }
                b"br" if in_txbody => {
                    if let Some(shape) = current.as_mut() {
                        shape.text.push('\n');
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if in_text {
                    if let Some(shape) = current.as_mut() {
                        let text = e.unescape().unwrap_or_default();
                        shape.text.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.name().local_name().as_ref() {
                b"grpSp" => group_depth = group_depth.saturating_sub(1),
                b"sp" if group_depth == 0 => {
                    if let Some(shape) = current.take() {
                        shapes.push(shape);
                    }
                }
                b"txBody" => in_txbody = false,
                b"r" => in_run = false,
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(shapes)
}

/// A placeholder a layout passes on to slides created from it.
#[derive(Debug, Clone)]
pub(crate) struct LayoutPlaceholder {
    pub role: PlaceholderRole,
    /// Raw `type` attribute, preserved verbatim on the new slide.
    pub type_attr: Option<String>,
    /// Raw `idx` attribute, the key that binds a slide placeholder to
    /// its layout counterpart for geometry inheritance.
    pub idx_attr: Option<String>,
}

/// Placeholders a new slide inherits from a layout, in document order.
///
/// Date, footer, and slide-number placeholders stay on the layout and
/// are not cloned onto slides.
pub(crate) fn scan_layout_placeholders(xml: &str) -> Result<Vec<LayoutPlaceholder>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut placeholders = Vec::new();
    let mut in_sp = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match e.name().local_name().as_ref() {
                    b"sp" => in_sp = true,
                    b"ph" if in_sp => {
                        let mut type_attr = None;
                        let mut idx_attr = None;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"type" => {
                                    type_attr =
                                        Some(String::from_utf8_lossy(&attr.value).to_string())
                                }
                                b"idx" => {
                                    idx_attr =
                                        Some(String::from_utf8_lossy(&attr.value).to_string())
                                }
                                _ => {}
                            }
                        }
                        if !matches!(type_attr.as_deref(), Some("dt" | "ftr" | "sldNum")) {
                            placeholders.push(LayoutPlaceholder {
                                role: PlaceholderRole::from_type_attr(type_attr.as_deref()),
                                type_attr,
                                idx_attr,
                            });
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                if e.name().local_name().as_ref() == b"sp" {
                    in_sp = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(placeholders)
}

fn role_from_ph(e: &quick_xml::events::BytesStart<'_>) -> PlaceholderRole {
    let mut type_attr = None;
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"type" {
            type_attr = Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    PlaceholderRole::from_type_attr(type_attr.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE_XML: &str = r#"<?xml version="1.0"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
       xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld>
    <p:spTree>
      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="2" name="Title 1"/>
          <p:nvPr><p:ph type="title"/></p:nvPr>
        </p:nvSpPr>
        <p:txBody>
          <a:bodyPr/>
          <a:p><a:r><a:t>Quarterly Update</a:t></a:r></a:p>
        </p:txBody>
      </p:sp>
      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="3" name="Content Placeholder 2"/>
          <p:nvPr><p:ph idx="1"/></p:nvPr>
        </p:nvSpPr>
        <p:txBody>
          <a:bodyPr/>
          <a:p><a:r><a:t>First point</a:t></a:r></a:p>
          <a:p><a:r><a:t>Second </a:t></a:r><a:r><a:t>point</a:t></a:r></a:p>
        </p:txBody>
      </p:sp>
      <p:sp>
        <p:nvSpPr><p:cNvPr id="4" name="TextBox 3"/></p:nvSpPr>
        <p:txBody>
          <a:bodyPr/>
          <a:p><a:r><a:t>Loose note</a:t></a:r></a:p>
        </p:txBody>
      </p:sp>
    </p:spTree>
  </p:cSld>
</p:sld>"#;

    #[test]
    fn test_scan_roles_and_text() {
        let shapes = scan_shapes(SLIDE_XML).unwrap();
        assert_eq!(shapes.len(), 3);

        assert_eq!(shapes[0].role, Some(PlaceholderRole::Title));
        assert_eq!(shapes[0].text, "Quarterly Update");

        // No type attribute defaults to an object placeholder.
        assert_eq!(shapes[1].role, Some(PlaceholderRole::Object));
        assert_eq!(shapes[1].text, "First point\nSecond point");

        assert_eq!(shapes[2].role, None);
        assert!(shapes[2].has_text_frame);
        assert_eq!(shapes[2].text, "Loose note");
    }

    #[test]
    fn test_grouped_shapes_are_skipped() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
            <p:grpSp>
              <p:sp><p:txBody><a:p><a:r><a:t>inside group</a:t></a:r></a:p></p:txBody></p:sp>
            </p:grpSp>
            <p:sp><p:txBody><a:p><a:r><a:t>outside</a:t></a:r></a:p></p:txBody></p:sp>
        </p:spTree></p:cSld></p:sld>"#;
        let shapes = scan_shapes(xml).unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].text, "outside");
    }

    #[test]
    fn test_line_break_element() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
            <p:sp><p:txBody><a:p><a:r><a:t>one</a:t></a:r><a:br/><a:r><a:t>two</a:t></a:r></a:p></p:txBody></p:sp>
        </p:spTree></p:cSld></p:sld>"#;
        let shapes = scan_shapes(xml).unwrap();
        assert_eq!(shapes[0].text, "one\ntwo");
    }

    #[test]
    fn test_role_mapping() {
        assert_eq!(PlaceholderRole::from_type_attr(Some("ctrTitle")), PlaceholderRole::CenterTitle);
        assert_eq!(PlaceholderRole::from_type_attr(Some("subTitle")), PlaceholderRole::Subtitle);
        assert_eq!(PlaceholderRole::from_type_attr(Some("body")), PlaceholderRole::Body);
        assert_eq!(PlaceholderRole::from_type_attr(None), PlaceholderRole::Object);
        assert_eq!(PlaceholderRole::from_type_attr(Some("pic")), PlaceholderRole::Other);

        assert!(PlaceholderRole::CenterTitle.is_title());
        assert!(!PlaceholderRole::Subtitle.is_title());
        assert!(PlaceholderRole::Subtitle.is_title_styled());
        assert!(PlaceholderRole::Object.is_content());
    }

    #[test]
    fn test_scan_layout_placeholders_filters_chrome() {
        let xml = r#"<p:sldLayout xmlns:a="a" xmlns:p="p"><p:cSld name="Title and Content"><p:spTree>
            <p:sp><p:nvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr></p:sp>
            <p:sp><p:nvSpPr><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr></p:sp>
            <p:sp><p:nvSpPr><p:nvPr><p:ph type="dt" idx="10"/></p:nvPr></p:nvSpPr></p:sp>
            <p:sp><p:nvSpPr><p:nvPr><p:ph type="ftr" idx="11"/></p:nvPr></p:nvSpPr></p:sp>
            <p:sp><p:nvSpPr><p:nvPr><p:ph type="sldNum" idx="12"/></p:nvPr></p:nvSpPr></p:sp>
        </p:spTree></p:cSld></p:sldLayout>"#;
        let placeholders = scan_layout_placeholders(xml).unwrap();
        assert_eq!(placeholders.len(), 2);
        assert_eq!(placeholders[0].role, PlaceholderRole::Title);
        assert_eq!(placeholders[1].role, PlaceholderRole::Object);
        assert_eq!(placeholders[1].idx_attr.as_deref(), Some("1"));
    }
}
