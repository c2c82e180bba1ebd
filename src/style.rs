//! Recoloring: slide backgrounds and text-run colors.
//!
//! Both operations rewrite slide XML as a streaming event pipeline so
//! everything not being recolored passes through untouched. Applying
//! the same colors twice is a no-op after the first pass.

use crate::color::{self, Rgb};
use crate::deck::Presentation;
use crate::error::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// Set every slide's background to a solid fill of the resolved color.
///
/// Unresolvable input degrades to black rather than aborting; zero
/// slides is a valid no-op.
pub fn apply_background(prs: &mut Presentation, bg_hex: &str) -> Result<()> {
    let rgb = color::resolve(bg_hex);
    for index in 0..prs.slide_count() {
        let xml = prs.read_slide_xml(index)?;
        let painted = paint_background(&xml, rgb)?;
        prs.write_slide_xml(index, &painted)?;
    }
    Ok(())
}

/// Force every text run's color according to its shape's role.
///
/// A shape is title-styled when it is a placeholder whose role is
/// title, center-title, or subtitle; every other text-frame shape gets
/// the body color. Table and picture text is untouched, as is text
/// inside grouped shapes (neither carries a shape-level text frame).
pub fn apply_text_colors(prs: &mut Presentation, title_hex: &str, body_hex: &str) -> Result<()> {
    let title_rgb = color::resolve(title_hex);
    let body_rgb = color::resolve(body_hex);
    for index in 0..prs.slide_count() {
        let xml = prs.read_slide_xml(index)?;
        let painted = paint_runs(&xml, title_rgb, body_rgb)?;
        prs.write_slide_xml(index, &painted)?;
    }
    Ok(())
}

fn xml_err<E: std::fmt::Display>(e: E) -> Error {
    Error::XmlParse(e.to_string())
}

fn is_fill_element(local: &[u8]) -> bool {
    matches!(
        local,
        b"solidFill" | b"gradFill" | b"pattFill" | b"noFill" | b"grpFill" | b"blipFill"
    )
}

fn write_solid_fill(writer: &mut Writer<Cursor<Vec<u8>>>, rgb: Rgb) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new("a:solidFill")))
        .map_err(xml_err)?;
    let mut clr = BytesStart::new("a:srgbClr");
    let hex = rgb.hex();
    clr.push_attribute(("val", hex.as_str()));
    writer.write_event(Event::Empty(clr)).map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new("a:solidFill")))
        .map_err(xml_err)?;
    Ok(())
}

/// Rewrite a slide so `p:cSld` opens with a solid background fill.
/// Any existing `p:bg` subtree is replaced.
fn paint_background(xml: &str, rgb: Rgb) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();

    // Set after injecting the new background; the next element, if it
    // is the old `p:bg`, is dropped. `p:bg` is always first in `cSld`.
    let mut awaiting_old_bg = false;
    let mut skip_depth = 0usize;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(xml_err)?;
        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
            continue;
        }
        match event {
            Event::Start(e) if e.name().local_name().as_ref() == b"cSld" => {
                writer.write_event(Event::Start(e)).map_err(xml_err)?;
                writer
                    .write_event(Event::Start(BytesStart::new("p:bg")))
                    .map_err(xml_err)?;
                writer
                    .write_event(Event::Start(BytesStart::new("p:bgPr")))
                    .map_err(xml_err)?;
                write_solid_fill(&mut writer, rgb)?;
                writer
                    .write_event(Event::Empty(BytesStart::new("a:effectLst")))
                    .map_err(xml_err)?;
                writer
                    .write_event(Event::End(BytesEnd::new("p:bgPr")))
                    .map_err(xml_err)?;
                writer
                    .write_event(Event::End(BytesEnd::new("p:bg")))
                    .map_err(xml_err)?;
                awaiting_old_bg = true;
            }
            Event::Start(e) if awaiting_old_bg && e.name().local_name().as_ref() == b"bg" => {
                awaiting_old_bg = false;
                skip_depth = 1;
            }
            Event::Empty(e) if awaiting_old_bg && e.name().local_name().as_ref() == b"bg" => {
                awaiting_old_bg = false;
            }
            Event::Start(e) => {
                awaiting_old_bg = false;
                writer.write_event(Event::Start(e)).map_err(xml_err)?;
            }
            Event::Empty(e) => {
                awaiting_old_bg = false;
                writer.write_event(Event::Empty(e)).map_err(xml_err)?;
            }
            Event::Eof => break,
            other => writer.write_event(other).map_err(xml_err)?,
        }
        buf.clear();
    }

    String::from_utf8(writer.into_inner().into_inner()).map_err(|e| Error::InvalidData(e.to_string()))
}

/// Rewrite a slide, forcing each `a:r` run's fill to the role color.
///
/// Existing direct fill children of `a:rPr` are dropped and a single
/// `a:solidFill` inserted, after `a:ln` if present so the property
/// order the schema wants is kept. Runs with no `a:rPr` gain one.
fn paint_runs(xml: &str, title_rgb: Rgb, body_rgb: Rgb) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();

    let mut group_depth = 0usize;
    let mut in_sp = false;
    let mut sp_title_styled = false;
    let mut in_txbody = false;
    let mut in_run = false;
    let mut run_has_rpr = false;
    let mut in_rpr = false;
    let mut rpr_child_depth = 0usize;
    let mut rpr_fill_done = false;
    let mut skip_depth = 0usize;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(xml_err)?;

        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
            continue;
        }

        // Grouped shapes pass through untouched.
        if group_depth > 0 {
            match &event {
                Event::Start(e) if e.name().local_name().as_ref() == b"grpSp" => group_depth += 1,
                Event::End(e) if e.name().local_name().as_ref() == b"grpSp" => group_depth -= 1,
                _ => {}
            }
            match event {
                Event::Eof => break,
                other => writer.write_event(other).map_err(xml_err)?,
            }
            buf.clear();
            continue;
        }

        let run_color = if sp_title_styled { title_rgb } else { body_rgb };

        match event {
            Event::Start(e) => {
                let local_owned = e.name().local_name().as_ref().to_vec();
                let local = local_owned.as_slice();
                match local {
                    b"grpSp" => {
                        group_depth += 1;
                        writer.write_event(Event::Start(e)).map_err(xml_err)?;
                    }
                    b"sp" => {
                        in_sp = true;
                        sp_title_styled = false;
                        writer.write_event(Event::Start(e)).map_err(xml_err)?;
                    }
                    b"ph" if in_sp && !in_txbody => {
                        sp_title_styled = ph_is_title_styled(&e);
                        writer.write_event(Event::Start(e)).map_err(xml_err)?;
                    }
                    b"txBody" if in_sp => {
                        in_txbody = true;
                        writer.write_event(Event::Start(e)).map_err(xml_err)?;
                    }
                    b"r" if in_txbody => {
                        in_run = true;
                        run_has_rpr = false;
                        writer.write_event(Event::Start(e)).map_err(xml_err)?;
                    }
                    b"rPr" if in_run && !in_rpr => {
                        in_rpr = true;
                        run_has_rpr = true;
                        rpr_child_depth = 0;
                        rpr_fill_done = false;
                        writer.write_event(Event::Start(e)).map_err(xml_err)?;
                    }
                    _ if in_rpr => {
                        if rpr_child_depth == 0 {
                            if is_fill_element(local) {
                                if !rpr_fill_done {
                                    write_solid_fill(&mut writer, run_color)?;
                                    rpr_fill_done = true;
                                }
                                skip_depth = 1;
                            } else if local == b"ln" {
                                writer.write_event(Event::Start(e)).map_err(xml_err)?;
                                rpr_child_depth += 1;
                            } else {
                                if !rpr_fill_done {
                                    write_solid_fill(&mut writer, run_color)?;
                                    rpr_fill_done = true;
                                }
                                writer.write_event(Event::Start(e)).map_err(xml_err)?;
                                rpr_child_depth += 1;
                            }
                        } else {
                            writer.write_event(Event::Start(e)).map_err(xml_err)?;
                            rpr_child_depth += 1;
                        }
                    }
                    b"t" if in_run && !run_has_rpr => {
                        // Run carries no properties yet; give it some
                        // so the color has somewhere to live.
                        run_has_rpr = true;
                        writer
                            .write_event(Event::Start(BytesStart::new("a:rPr")))
                            .map_err(xml_err)?;
                        write_solid_fill(&mut writer, run_color)?;
                        writer
                            .write_event(Event::End(BytesEnd::new("a:rPr")))
                            .map_err(xml_err)?;
                        writer.write_event(Event::Start(e)).map_err(xml_err)?;
                    }
                    _ => writer.write_event(Event::Start(e)).map_err(xml_err)?,
                }
            }
            Event::Empty(e) => {
                let local_owned = e.name().local_name().as_ref().to_vec();
                let local = local_owned.as_slice();
                match local {
                    b"ph" if in_sp && !in_txbody => {
                        sp_title_styled = ph_is_title_styled(&e);
                        writer.write_event(Event::Empty(e)).map_err(xml_err)?;
                    }
                    b"rPr" if in_run && !in_rpr => {
                        // Expand the empty element so the fill fits.
                        run_has_rpr = true;
                        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                        writer.write_event(Event::Start(e)).map_err(xml_err)?;
                        write_solid_fill(&mut writer, run_color)?;
                        writer
                            .write_event(Event::End(BytesEnd::new(name.as_str())))
                            .map_err(xml_err)?;
                    }
                    _ if in_rpr && rpr_child_depth == 0 => {
                        if is_fill_element(local) {
                            if !rpr_fill_done {
                                write_solid_fill(&mut writer, run_color)?;
                                rpr_fill_done = true;
                            }
                        } else if local == b"ln" {
                            writer.write_event(Event::Empty(e)).map_err(xml_err)?;
                        } else {
                            if !rpr_fill_done {
                                write_solid_fill(&mut writer, run_color)?;
                                rpr_fill_done = true;
                            }
                            writer.write_event(Event::Empty(e)).map_err(xml_err)?;
                        }
                    }
                    _ => writer.write_event(Event::Empty(e)).map_err(xml_err)?,
                }
            }
            Event::End(e) => {
                let local_owned = e.name().local_name().as_ref().to_vec();
                match local_owned.as_slice() {
                    b"rPr" if in_rpr && rpr_child_depth == 0 => {
                        if !rpr_fill_done {
                            write_solid_fill(&mut writer, run_color)?;
                        }
                        in_rpr = false;
                        writer.write_event(Event::End(e)).map_err(xml_err)?;
                    }
                    _ if in_rpr => {
                        rpr_child_depth = rpr_child_depth.saturating_sub(1);
                        writer.write_event(Event::End(e)).map_err(xml_err)?;
                    }
                    b"r" => {
                        in_run = false;
                        writer.write_event(Event::End(e)).map_err(xml_err)?;
                    }
                    b"txBody" => {
                        in_txbody = false;
                        writer.write_event(Event::End(e)).map_err(xml_err)?;
                    }
                    b"sp" => {
                        in_sp = false;
                        sp_title_styled = false;
                        writer.write_event(Event::End(e)).map_err(xml_err)?;
                    }
                    _ => writer.write_event(Event::End(e)).map_err(xml_err)?,
                }
            }
            Event::Eof => break,
            other => writer.write_event(other).map_err(xml_err)?,
        }
        buf.clear();
    }

    String::from_utf8(writer.into_inner().into_inner()).map_err(|e| Error::InvalidData(e.to_string()))
}

fn ph_is_title_styled(e: &BytesStart<'_>) -> bool {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"type" {
            return matches!(attr.value.as_ref(), b"title" | b"ctrTitle" | b"subTitle");
        }
    }
    false
}
