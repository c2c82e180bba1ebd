//! The in-memory presentation: slide and layout geography over the
//! OPC package, plus slide creation from layout templates.

use crate::container::PptxPackage;
use crate::deck::shapes::{scan_layout_placeholders, LayoutPlaceholder, PlaceholderRole};
use crate::error::{Error, Result};
use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;
use std::path::Path;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const SLIDE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const SLIDE_LAYOUT_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

/// One entry of the presentation's ordered slide list.
#[derive(Debug, Clone)]
pub struct SlideEntry {
    /// Slide ID from `p:sldIdLst` (256 and up).
    pub id: u32,
    /// Relationship ID binding the slide into the presentation part.
    pub rel_id: String,
    /// Package part path, e.g. `ppt/slides/slide1.xml`.
    pub path: String,
}

/// One entry of the presentation's layout-template list.
#[derive(Debug, Clone)]
pub struct LayoutEntry {
    /// Display name from the layout's `p:cSld/@name`.
    pub name: String,
    /// Package part path, e.g. `ppt/slideLayouts/slideLayout1.xml`.
    pub path: String,
}

/// Result of appending a slide from a layout template.
#[derive(Debug, Clone, Copy)]
pub struct AppendedSlide {
    /// Index of the new slide in the slide list.
    pub index: usize,
    /// Whether requested title text landed in a title placeholder.
    pub title_placed: bool,
    /// Whether requested body text landed in a body/object placeholder.
    pub body_placed: bool,
}

/// A mutable slide deck loaded from a .pptx package.
///
/// Slides are enumerated from `p:sldIdLst`; layout templates follow
/// the first slide master's `sldLayoutIdLst`, which is the order a
/// user sees in the application's layout picker.
pub struct Presentation {
    package: PptxPackage,
    slides: Vec<SlideEntry>,
    layouts: Vec<LayoutEntry>,
}

impl Presentation {
    /// Open a presentation from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_package(PptxPackage::open(path)?)
    }

    /// Load a presentation from .pptx bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_package(PptxPackage::from_bytes(data)?)
    }

    fn from_package(package: PptxPackage) -> Result<Self> {
        let xml = package.read_xml(PRESENTATION_PART)?;
        let lists = parse_presentation_lists(&xml)?;
        let rels = package.relationships(PRESENTATION_PART)?;

        let slides = lists
            .slides
            .into_iter()
            .filter_map(|(id, rel_id)| {
                rels.get(&rel_id).map(|rel| SlideEntry {
                    id,
                    path: PptxPackage::resolve_path(PRESENTATION_PART, &rel.target),
                    rel_id,
                })
            })
            .collect();

        let mut layouts = Vec::new();
        if let Some(master_rel) = lists.master_rel_id.as_deref().and_then(|id| rels.get(id)) {
            let master_path = PptxPackage::resolve_path(PRESENTATION_PART, &master_rel.target);
            let master_xml = package.read_xml(&master_path)?;
            let master_rels = package.relationships(&master_path)?;
            for rel_id in parse_layout_rel_ids(&master_xml)? {
                let Some(rel) = master_rels.get(&rel_id) else {
                    continue;
                };
                let path = PptxPackage::resolve_path(&master_path, &rel.target);
                let name = read_layout_name(&package.read_xml(&path)?)?;
                layouts.push(LayoutEntry { name, path });
            }
        }

        Ok(Self {
            package,
            slides,
            layouts,
        })
    }

    /// Number of slides in the deck.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// The ordered slide list.
    pub fn slides(&self) -> &[SlideEntry] {
        &self.slides
    }

    /// The ordered layout-template list.
    pub fn layouts(&self) -> &[LayoutEntry] {
        &self.layouts
    }

    /// Read a slide's XML by slide index.
    pub fn read_slide_xml(&self, index: usize) -> Result<String> {
        let entry = self
            .slides
            .get(index)
            .ok_or_else(|| Error::InvalidData(format!("slide index {index} out of range")))?;
        self.package.read_xml(&entry.path)
    }

    /// Replace a slide's XML by slide index.
    pub fn write_slide_xml(&mut self, index: usize, xml: &str) -> Result<()> {
        let path = self
            .slides
            .get(index)
            .ok_or_else(|| Error::InvalidData(format!("slide index {index} out of range")))?
            .path
            .clone();
        self.package.put_part(&path, xml.as_bytes().to_vec());
        Ok(())
    }

    /// The underlying package, for part-level inspection.
    pub fn package(&self) -> &PptxPackage {
        &self.package
    }

    /// Append a new slide created from a layout template.
    ///
    /// Title text goes into the layout's first title placeholder and
    /// body text into its first body/object placeholder, one paragraph
    /// per line; the [`AppendedSlide`] records whether each landed.
    /// Remaining inherited placeholders are cloned empty so geometry
    /// still follows the layout. The new slide is wired into the
    /// content types, the presentation relationships, and `sldIdLst`;
    /// existing slide parts are not touched.
    pub fn append_slide(
        &mut self,
        layout_index: usize,
        title: Option<&str>,
        body: Option<&str>,
    ) -> Result<AppendedSlide> {
        let layout = self
            .layouts
            .get(layout_index)
            .ok_or(Error::InvalidLayout {
                index: layout_index,
                count: self.layouts.len(),
            })?
            .clone();
        let placeholders = scan_layout_placeholders(&self.package.read_xml(&layout.path)?)?;

        let has_title_ph = placeholders.iter().any(|p| p.role.is_title());
        let has_body_ph = placeholders.iter().any(|p| p.role.is_content());

        let slide_number = self.next_slide_number();
        let slide_path = format!("ppt/slides/slide{slide_number}.xml");
        let slide_xml = compose_slide_xml(&placeholders, title, body);
        self.package.put_part(&slide_path, slide_xml.into_bytes());

        let layout_file = layout.path.rsplit('/').next().unwrap_or(&layout.path);
        let rels_xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
             <Relationship Id=\"rId1\" Type=\"{SLIDE_LAYOUT_REL_TYPE}\" Target=\"../slideLayouts/{layout_file}\"/>\
             </Relationships>"
        );
        self.package.put_part(
            &format!("ppt/slides/_rels/slide{slide_number}.xml.rels"),
            rels_xml.into_bytes(),
        );

        self.register_content_type(&slide_path)?;
        let rel_id = self.register_presentation_rel(&slide_path)?;
        let slide_id = self.register_slide_id(&rel_id)?;

        self.slides.push(SlideEntry {
            id: slide_id,
            rel_id,
            path: slide_path,
        });

        Ok(AppendedSlide {
            index: self.slides.len() - 1,
            title_placed: title.is_some() && has_title_ph,
            body_placed: body.is_some() && has_body_ph,
        })
    }

    /// Serialize the deck back to .pptx bytes.
    pub fn save_to_bytes(&self) -> Result<Vec<u8>> {
        self.package.to_bytes()
    }

    /// Write the deck to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.save_to_bytes()?)?;
        Ok(())
    }

    fn next_slide_number(&self) -> u32 {
        self.package
            .parts_with_prefix("ppt/slides/slide")
            .filter_map(|name| {
                name.strip_prefix("ppt/slides/slide")
                    .and_then(|rest| rest.strip_suffix(".xml"))
                    .and_then(|n| n.parse::<u32>().ok())
            })
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Add a `<Override>` for the new slide part.
    fn register_content_type(&mut self, part: &str) -> Result<()> {
        let xml = self.package.read_xml(CONTENT_TYPES_PART)?;
        let mut reader = Reader::from_str(&xml);
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        let mut buf = Vec::new();
        loop {
            let event = reader.read_event_into(&mut buf).map_err(xml_err)?;
            match event {
                Event::End(e) if e.name().as_ref() == b"Types" => {
                    let mut over = BytesStart::new("Override");
                    over.push_attribute(("PartName", format!("/{part}").as_str()));
                    over.push_attribute(("ContentType", SLIDE_CONTENT_TYPE));
                    writer.write_event(Event::Empty(over)).map_err(xml_err)?;
                    writer.write_event(Event::End(e)).map_err(xml_err)?;
                }
                Event::Eof => break,
                other => writer.write_event(other).map_err(xml_err)?,
            }
            buf.clear();
        }
        self.package
            .put_part(CONTENT_TYPES_PART, writer.into_inner().into_inner());
        Ok(())
    }

    /// Add a slide relationship to the presentation part, returning
    /// the minted `rIdN`.
    fn register_presentation_rel(&mut self, part: &str) -> Result<String> {
        let rels = self.package.relationships(PRESENTATION_PART)?;
        let rel_id = format!("rId{}", rels.max_rid() + 1);
        let target = part.strip_prefix("ppt/").unwrap_or(part);

        let rels_path = PptxPackage::rels_path_for(PRESENTATION_PART);
        let xml = self.package.read_xml(&rels_path)?;
        let mut reader = Reader::from_str(&xml);
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        let mut buf = Vec::new();
        loop {
            let event = reader.read_event_into(&mut buf).map_err(xml_err)?;
            match event {
                Event::End(e) if e.name().as_ref() == b"Relationships" => {
                    let mut rel = BytesStart::new("Relationship");
                    rel.push_attribute(("Id", rel_id.as_str()));
                    rel.push_attribute(("Type", SLIDE_REL_TYPE));
                    rel.push_attribute(("Target", target));
                    writer.write_event(Event::Empty(rel)).map_err(xml_err)?;
                    writer.write_event(Event::End(e)).map_err(xml_err)?;
                }
                Event::Eof => break,
                other => writer.write_event(other).map_err(xml_err)?,
            }
            buf.clear();
        }
        self.package
            .put_part(&rels_path, writer.into_inner().into_inner());
        Ok(rel_id)
    }

    /// Append a `p:sldId` for the new slide, returning the minted ID.
    fn register_slide_id(&mut self, rel_id: &str) -> Result<u32> {
        let slide_id = self
            .slides
            .iter()
            .map(|s| s.id)
            .max()
            .unwrap_or(255)
            .max(255)
            + 1;
        let id_text = slide_id.to_string();

        let xml = self.package.read_xml(PRESENTATION_PART)?;
        let mut reader = Reader::from_str(&xml);
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        let mut buf = Vec::new();
        let mut inserted = false;

        let sld_id_event = |id_text: &str, rel_id: &str| {
            let mut sld_id = BytesStart::new("p:sldId");
            sld_id.push_attribute(("id", id_text));
            sld_id.push_attribute(("r:id", rel_id));
            sld_id
        };

        loop {
            let event = reader.read_event_into(&mut buf).map_err(xml_err)?;
            match event {
                Event::End(e) if e.name().local_name().as_ref() == b"sldIdLst" => {
                    writer
                        .write_event(Event::Empty(sld_id_event(&id_text, rel_id)))
                        .map_err(xml_err)?;
                    writer.write_event(Event::End(e)).map_err(xml_err)?;
                    inserted = true;
                }
                // A deck saved with zero slides keeps an empty list.
                Event::Empty(e) if e.name().local_name().as_ref() == b"sldIdLst" => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    writer.write_event(Event::Start(e)).map_err(xml_err)?;
                    writer
                        .write_event(Event::Empty(sld_id_event(&id_text, rel_id)))
                        .map_err(xml_err)?;
                    writer
                        .write_event(Event::End(BytesEnd::new(name.as_str())))
                        .map_err(xml_err)?;
                    inserted = true;
                }
                Event::Eof => break,
                other => writer.write_event(other).map_err(xml_err)?,
            }
            buf.clear();
        }

        if !inserted {
            return Err(Error::InvalidData(
                "presentation.xml has no slide id list".to_string(),
            ));
        }
        self.package
            .put_part(PRESENTATION_PART, writer.into_inner().into_inner());
        Ok(slide_id)
    }
}

impl std::fmt::Debug for Presentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presentation")
            .field("slides", &self.slides.len())
            .field("layouts", &self.layouts.len())
            .finish()
    }
}

fn xml_err<E: std::fmt::Display>(e: E) -> Error {
    Error::XmlParse(e.to_string())
}

struct PresentationLists {
    /// `(slide id, relationship id)` pairs from `sldIdLst`.
    slides: Vec<(u32, String)>,
    /// Relationship ID of the first slide master.
    master_rel_id: Option<String>,
}

fn parse_presentation_lists(xml: &str) -> Result<PresentationLists> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut slides = Vec::new();
    let mut master_rel_id: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match e.name().local_name().as_ref() {
                    b"sldId" => {
                        let mut id = 0u32;
                        let mut rel_id = String::new();
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"id" => {
                                    id = String::from_utf8_lossy(&attr.value)
                                        .parse()
                                        .unwrap_or(0);
                                }
                                key if key.ends_with(b":id") => {
                                    rel_id = String::from_utf8_lossy(&attr.value).to_string();
                                }
                                _ => {}
                            }
                        }
                        if !rel_id.is_empty() {
                            slides.push((id, rel_id));
                        }
                    }
                    b"sldMasterId" if master_rel_id.is_none() => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref().ends_with(b":id") {
                                master_rel_id =
                                    Some(String::from_utf8_lossy(&attr.value).to_string());
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(PresentationLists {
        slides,
        master_rel_id,
    })
}

/// Relationship IDs from the master's `sldLayoutIdLst`, in order.
fn parse_layout_rel_ids(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut rel_ids = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if e.name().local_name().as_ref() == b"sldLayoutId" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref().ends_with(b":id") {
                            rel_ids.push(String::from_utf8_lossy(&attr.value).to_string());
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(rel_ids)
}

/// A layout's display name from `p:cSld/@name`, empty when unnamed.
fn read_layout_name(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if e.name().local_name().as_ref() == b"cSld" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"name" {
                            return Ok(attr
                                .unescape_value()
                                .map(|v| v.into_owned())
                                .unwrap_or_default());
                        }
                    }
                    return Ok(String::new());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(String::new())
}

/// Build the XML for a slide created from a layout's placeholders.
fn compose_slide_xml(
    placeholders: &[LayoutPlaceholder],
    title: Option<&str>,
    body: Option<&str>,
) -> String {
    let mut shapes = String::new();
    let mut shape_id = 2u32;
    let mut title_text = title;
    let mut body_text = body;

    for ph in placeholders {
        let text = if ph.role.is_title() {
            title_text.take()
        } else if ph.role.is_content() {
            body_text.take()
        } else {
            None
        };
        shapes.push_str(&compose_shape(ph, shape_id, text));
        shape_id += 1;
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <p:sld xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
         xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
         <p:cSld><p:spTree>\
         <p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
         <p:grpSpPr/>\
         {shapes}\
         </p:spTree></p:cSld>\
         <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>\
         </p:sld>"
    )
}

fn compose_shape(ph: &LayoutPlaceholder, shape_id: u32, text: Option<&str>) -> String {
    let mut ph_attrs = String::new();
    if let Some(t) = &ph.type_attr {
        ph_attrs.push_str(&format!(" type=\"{t}\""));
    }
    if let Some(i) = &ph.idx_attr {
        ph_attrs.push_str(&format!(" idx=\"{i}\""));
    }

    let base_name = if ph.role.is_title() {
        "Title"
    } else if ph.role == PlaceholderRole::Subtitle {
        "Subtitle"
    } else if ph.role.is_content() {
        "Content Placeholder"
    } else {
        "Placeholder"
    };

    // One a:p per line; empty lines keep their paragraph.
    let paragraphs = match text {
        Some(t) if !t.is_empty() => t
            .split('\n')
            .map(|line| {
                if line.is_empty() {
                    "<a:p/>".to_string()
                } else {
                    format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", escape(line))
                }
            })
            .collect::<String>(),
        _ => "<a:p/>".to_string(),
    };

    format!(
        "<p:sp><p:nvSpPr>\
         <p:cNvPr id=\"{shape_id}\" name=\"{base_name} {num}\"/>\
         <p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr>\
         <p:nvPr><p:ph{ph_attrs}/></p:nvPr>\
         </p:nvSpPr><p:spPr/>\
         <p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody>\
         </p:sp>",
        num = shape_id - 1
    )
}
