//! OPC package layer for .pptx archives.
//!
//! A presentation is a ZIP archive of XML parts plus relationship
//! files. Unlike a read-only extractor, the package keeps every part
//! in memory so individual parts can be rewritten and the whole
//! archive serialized back out; parts that were never touched pass
//! through byte-for-byte, in their original archive order.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

/// A relationship entry from a `.rels` part.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute)
    pub target: String,
    /// Whether the target is external
    pub external: bool,
}

/// Relationships parsed from a `.rels` part, in document order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    rels: Vec<Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    pub fn len(&self) -> usize {
        self.rels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Highest numeric suffix among `rIdN` identifiers, 0 when none.
    ///
    /// Used to mint the next free ID when a new part is wired in.
    pub fn max_rid(&self) -> u32 {
        self.rels
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
    }

    fn push(&mut self, rel: Relationship) {
        self.rels.push(rel);
    }
}

/// In-memory OPC package over a .pptx ZIP archive.
pub struct PptxPackage {
    /// Part names in original archive order; appended parts go last.
    order: Vec<String>,
    parts: HashMap<String, Vec<u8>>,
}

impl PptxPackage {
    /// Open a package from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(fs::read(path.as_ref())?)
    }

    /// Load a package from a byte vector, reading every part eagerly.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
        let mut order = Vec::with_capacity(archive.len());
        let mut parts = HashMap::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut bytes = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut bytes)?;
            if parts.insert(name.clone(), bytes).is_none() {
                order.push(name);
            }
        }
        Ok(Self { order, parts })
    }

    /// Read an XML part as a string.
    ///
    /// OOXML parts are normally UTF-8, but UTF-16 (either endianness)
    /// shows up in the wild; those are decoded and their declaration
    /// pointed at UTF-8 so the string can be re-parsed.
    pub fn read_xml(&self, name: &str) -> Result<String> {
        let bytes = self.read_binary(name)?;
        decode_xml_bytes(bytes)
    }

    /// Read a part's raw bytes.
    pub fn read_binary(&self, name: &str) -> Result<&[u8]> {
        self.parts
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::MissingPart(name.to_string()))
    }

    /// Replace a part's bytes, or append a new part at the end.
    pub fn put_part(&mut self, name: &str, bytes: Vec<u8>) {
        if self.parts.insert(name.to_string(), bytes).is_none() {
            self.order.push(name.to_string());
        }
    }

    /// Check if a part exists in the package.
    pub fn exists(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    /// All part names, in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Part names matching a prefix.
    pub fn parts_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.part_names().filter(move |n| n.starts_with(prefix))
    }

    /// The `.rels` part name governing a part (`""` for the package).
    pub fn rels_path_for(part: &str) -> String {
        if part.is_empty() || part == "/" {
            return "_rels/.rels".to_string();
        }
        match part.rfind('/') {
            Some(slash) => format!("{}/_rels/{}.rels", &part[..slash], &part[slash + 1..]),
            None => format!("_rels/{part}.rels"),
        }
    }

    /// Parse the relationships governing a part.
    ///
    /// A missing `.rels` part yields an empty collection, not an
    /// error; OPC treats the two the same.
    pub fn relationships(&self, part: &str) -> Result<Relationships> {
        let rels_path = Self::rels_path_for(part);
        if !self.exists(&rels_path) {
            return Ok(Relationships::new());
        }
        let xml = self.read_xml(&rels_path)?;
        parse_relationships(&xml)
    }

    /// Resolve a relative OPC reference from a base part.
    pub fn resolve_path(base: &str, relative: &str) -> String {
        if let Some(stripped) = relative.strip_prefix('/') {
            return stripped.to_string();
        }
        let mut segments: Vec<&str> = match base.rfind('/') {
            Some(slash) => base[..slash].split('/').collect(),
            None => Vec::new(),
        };
        for segment in relative.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }
        segments.join("/")
    }

    /// Serialize all parts back into a deflated ZIP archive.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for name in &self.order {
            writer.start_file(name.clone(), options)?;
            writer.write_all(&self.parts[name])?;
        }
        Ok(writer.finish()?.into_inner())
    }
}

impl std::fmt::Debug for PptxPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PptxPackage")
            .field("parts", &self.order.len())
            .finish()
    }
}

fn parse_relationships(xml: &str) -> Result<Relationships> {
    if xml.trim().is_empty() {
        return Ok(Relationships::new());
    }

    let mut rels = Relationships::new();
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Empty(e)) | Ok(quick_xml::events::Event::Start(e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut id = String::new();
                let mut rel_type = String::new();
                let mut target = String::new();
                let mut external = false;

                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                        b"TargetMode" => {
                            external =
                                String::from_utf8_lossy(&attr.value).to_lowercase() == "external"
                        }
                        _ => {}
                    }
                }

                if !id.is_empty() {
                    rels.push(Relationship {
                        id,
                        rel_type,
                        target,
                        external,
                    });
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Decode an XML part, tolerating a UTF-8 BOM and UTF-16 encodings.
fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8(bytes[3..].to_vec())
            .map_err(|e| Error::InvalidData(e.to_string()));
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Ok(fix_declaration(&decode_utf16(&bytes[2..], u16::from_le_bytes)?));
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Ok(fix_declaration(&decode_utf16(&bytes[2..], u16::from_be_bytes)?));
    }
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

fn decode_utf16(bytes: &[u8], combine: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|c| combine([c[0], c[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::InvalidData(e.to_string()))
}

/// After decoding, the declaration still claims UTF-16; quick-xml
/// would refuse to re-read the string, so point it at UTF-8.
fn fix_declaration(content: &str) -> String {
    match content.find("?>") {
        Some(end) if content.starts_with("<?xml") => {
            let decl = content[..end]
                .replace("UTF-16", "UTF-8")
                .replace("utf-16", "UTF-8");
            format!("{}{}", decl, &content[end..])
        }
        _ => content.to_string(),
    }
}
