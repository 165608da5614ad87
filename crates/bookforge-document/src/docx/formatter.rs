// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX formatter — rewrites `word/document.xml` in place via a streaming
// quick-xml event pass.
//
// Three rewrites are applied:
//   * every `w:sectPr` gets the trim-size page dimensions and 1-inch margins;
//   * every paragraph with non-whitespace text gets the genre line spacing;
//   * every run in such a paragraph gets the requested font and the genre
//     body size.
// Whitespace-only paragraphs pass through untouched so intentional blank
// lines (stanza breaks in poetry, scene breaks) survive.
//
// Input that cannot be read as a DOCX at all does not fail the job: a
// minimal placeholder document carrying a diagnostic note is synthesized and
// formatted instead.

use std::io::{Cursor, Write};

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use tracing::{debug, instrument, warn};

use bookforge_core::error::{BookforgeError, Result};
use bookforge_core::rules::FormattingRules;
use bookforge_core::types::{FontFamily, Genre, TrimSize};

use super::archive::{DOCUMENT_XML, DocxArchive};

/// Twentieths-of-a-point per inch (the OOXML page geometry unit).
const TWIPS_PER_INCH: f32 = 1440.0;

/// Fixed page margin on all four sides: 1 inch.
const MARGIN_TWIPS: u32 = 1440;

/// Note written into the placeholder document when the upload is unreadable.
const PLACEHOLDER_NOTE: &str = "Bookforge could not read the uploaded manuscript, so this \
     replacement document was generated in its place. The requested page size, margins, \
     typeface, and line spacing have still been applied. Please re-export the original \
     file from your word processor and upload it again for a full conversion.";

/// Resolved layout parameters for one formatting pass.
#[derive(Debug, Clone, Copy)]
struct LayoutSpec {
    page_w_twips: u32,
    page_h_twips: u32,
    /// Line spacing in twentieths of a point (multiplier × 240).
    line_units: u32,
    /// Body font size in half-points.
    half_points: u32,
    font: FontFamily,
}

impl LayoutSpec {
    fn resolve(rules: &FormattingRules, trim_size: TrimSize, font: FontFamily, genre: Genre) -> Self {
        let (w_in, h_in) = trim_size.dimensions_in();
        let rule = rules.genre_rule(genre);
        Self {
            page_w_twips: (w_in * TWIPS_PER_INCH).round() as u32,
            page_h_twips: (h_in * TWIPS_PER_INCH).round() as u32,
            line_units: (rule.line_spacing * 240.0).round() as u32,
            half_points: (rule.font_size_pt * 2.0).round() as u32,
            font,
        }
    }
}

/// Applies trim size, margins, and genre conventions to DOCX manuscripts.
pub struct DocxFormatter<'a> {
    rules: &'a FormattingRules,
}

impl<'a> DocxFormatter<'a> {
    pub fn new(rules: &'a FormattingRules) -> Self {
        Self { rules }
    }

    /// Format a DOCX manuscript, returning the rewritten container bytes.
    ///
    /// Never fails on unreadable input — see the module note on the
    /// placeholder fallback. Errors are limited to repacking faults.
    #[instrument(skip_all, fields(input_len = input.len(), trim = trim_size.id(), genre = genre.id()))]
    pub fn format(
        &self,
        input: &[u8],
        trim_size: TrimSize,
        font: FontFamily,
        genre: Genre,
    ) -> Result<Vec<u8>> {
        let layout = LayoutSpec::resolve(self.rules, trim_size, font, genre);

        let mut archive = match DocxArchive::from_bytes(input) {
            Ok(archive) => archive,
            Err(err) => {
                warn!(%err, "upload is not a readable DOCX container, substituting placeholder");
                placeholder_archive()
            }
        };
        if !archive.contains(DOCUMENT_XML) {
            warn!("container has no word/document.xml, substituting placeholder");
            archive = placeholder_archive();
        }

        let xml = archive.document_xml()?.to_vec();
        let rewritten = match rewrite_document_xml(&xml, &layout) {
            Ok(rewritten) => rewritten,
            Err(err) => {
                warn!(%err, "document XML unreadable, substituting placeholder");
                archive = placeholder_archive();
                rewrite_document_xml(archive.document_xml()?, &layout)?
            }
        };

        debug!(output_xml_len = rewritten.len(), "document XML rewritten");
        archive.set(DOCUMENT_XML, rewritten);
        archive.to_bytes()
    }
}

// ---------------------------------------------------------------------------
// XML rewrite pass
// ---------------------------------------------------------------------------

/// Rewrite `word/document.xml`, returning the new XML bytes.
fn rewrite_document_xml(xml: &[u8], layout: &LayoutSpec) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:p" => {
                let start = Event::Start(e.into_owned());
                let paragraph = collect_subtree(&mut reader, start, b"w:p")?;
                emit_paragraph(&mut writer, &paragraph, layout)?;
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:sectPr" => {
                let start = Event::Start(e.into_owned());
                let section = collect_subtree(&mut reader, start, b"w:sectPr")?;
                emit_sect_pr(&mut writer, &section, layout)?;
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:sectPr" => {
                emit_sect_pr_from_empty(&mut writer, &e.into_owned(), layout)?;
            }
            Ok(event) => writer.write_event(event)?,
            Err(err) => return Err(BookforgeError::Docx(format!("XML parse: {err}"))),
        }
        buf.clear();
    }

    Ok(writer.into_inner().into_inner())
}

/// Read events until the matching end tag of `name`, returning the whole
/// subtree (first event included, end tag included) as owned events.
fn collect_subtree(
    reader: &mut Reader<&[u8]>,
    first: Event<'static>,
    name: &[u8],
) -> Result<Vec<Event<'static>>> {
    let mut events = vec![first];
    let mut depth = 1usize;
    let mut buf = Vec::new();

    while depth > 0 {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => {
                return Err(BookforgeError::Docx(format!(
                    "unexpected end of document inside <{}>",
                    String::from_utf8_lossy(name)
                )));
            }
            Ok(event) => {
                match &event {
                    Event::Start(e) if e.name().as_ref() == name => depth += 1,
                    Event::End(e) if e.name().as_ref() == name => depth -= 1,
                    _ => {}
                }
                events.push(event.into_owned());
            }
            Err(err) => return Err(BookforgeError::Docx(format!("XML parse: {err}"))),
        }
        buf.clear();
    }

    Ok(events)
}

/// Does this paragraph contain any non-whitespace text in a `w:t`?
fn paragraph_has_text(events: &[Event<'static>]) -> bool {
    let mut in_text = false;
    for event in events {
        match event {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) if e.name().as_ref() == b"w:t" => in_text = false,
            Event::Text(t) if in_text => {
                if t.unescape().map(|s| !s.trim().is_empty()).unwrap_or(false) {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

/// Index just past the subtree starting at `events[start]` (a `Start` of `name`).
fn skip_subtree(events: &[Event<'static>], start: usize, name: &[u8]) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i < events.len() {
        match &events[i] {
            Event::Start(e) if e.name().as_ref() == name => depth += 1,
            Event::End(e) if e.name().as_ref() == name => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    events.len()
}

/// Re-emit one paragraph subtree, injecting spacing and run formatting when
/// the paragraph carries visible text.
fn emit_paragraph<W: Write>(
    writer: &mut Writer<W>,
    events: &[Event<'static>],
    layout: &LayoutSpec,
) -> Result<()> {
    if !paragraph_has_text(events) {
        // Intentional blank line — spacing and runs stay as authored, but a
        // section break embedded in its pPr still gets the page geometry.
        let mut i = 0usize;
        while i < events.len() {
            match &events[i] {
                Event::Start(e) if e.name().as_ref() == b"w:sectPr" => {
                    let end = skip_subtree(events, i, b"w:sectPr");
                    emit_sect_pr(writer, &events[i..end], layout)?;
                    i = end;
                }
                Event::Empty(e) if e.name().as_ref() == b"w:sectPr" => {
                    let empty = e.clone();
                    emit_sect_pr_from_empty(writer, &empty, layout)?;
                    i += 1;
                }
                event => {
                    writer.write_event(event.clone())?;
                    i += 1;
                }
            }
        }
        return Ok(());
    }

    // events[0] is Start(w:p); the final event is End(w:p).
    writer.write_event(events[0].clone())?;
    let body = &events[1..];
    let mut i = 0usize;

    // Paragraph properties: reuse an existing pPr (dropping its spacing) or
    // synthesize one. The pPr, when present, is always the first child.
    match body.first() {
        Some(Event::Start(e)) if e.name().as_ref() == b"w:pPr" => {
            writer.write_event(body[0].clone())?;
            write_spacing(writer, layout)?;
            i = 1;
            while i < body.len() {
                match &body[i] {
                    Event::End(e) if e.name().as_ref() == b"w:pPr" => {
                        writer.write_event(body[i].clone())?;
                        i += 1;
                        break;
                    }
                    Event::Empty(e) if e.name().as_ref() == b"w:spacing" => i += 1,
                    Event::Start(e) if e.name().as_ref() == b"w:spacing" => {
                        i = skip_subtree(body, i, b"w:spacing");
                    }
                    Event::Start(e) if e.name().as_ref() == b"w:sectPr" => {
                        let end = skip_subtree(body, i, b"w:sectPr");
                        emit_sect_pr(writer, &body[i..end], layout)?;
                        i = end;
                    }
                    Event::Empty(e) if e.name().as_ref() == b"w:sectPr" => {
                        let empty = e.clone();
                        emit_sect_pr_from_empty(writer, &empty, layout)?;
                        i += 1;
                    }
                    event => {
                        writer.write_event(event.clone())?;
                        i += 1;
                    }
                }
            }
        }
        Some(Event::Empty(e)) if e.name().as_ref() == b"w:pPr" => {
            write_ppr_full(writer, layout)?;
            i = 1;
        }
        _ => write_ppr_full(writer, layout)?,
    }

    // Run content: inject font/size into every run's properties.
    while i < body.len() {
        match &body[i] {
            Event::Start(e) if e.name().as_ref() == b"w:r" => {
                writer.write_event(body[i].clone())?;
                i += 1;
                match body.get(i) {
                    Some(Event::Start(e2)) if e2.name().as_ref() == b"w:rPr" => {
                        writer.write_event(body[i].clone())?;
                        write_run_props(writer, layout)?;
                        i += 1;
                        while i < body.len() {
                            match &body[i] {
                                Event::End(e3) if e3.name().as_ref() == b"w:rPr" => {
                                    writer.write_event(body[i].clone())?;
                                    i += 1;
                                    break;
                                }
                                Event::Empty(e3) if is_overridden_run_prop(e3.name().as_ref()) => {
                                    i += 1;
                                }
                                Event::Start(e3) if is_overridden_run_prop(e3.name().as_ref()) => {
                                    let name = e3.name().as_ref().to_vec();
                                    i = skip_subtree(body, i, &name);
                                }
                                event => {
                                    writer.write_event(event.clone())?;
                                    i += 1;
                                }
                            }
                        }
                    }
                    Some(Event::Empty(e2)) if e2.name().as_ref() == b"w:rPr" => {
                        write_rpr_full(writer, layout)?;
                        i += 1;
                    }
                    _ => write_rpr_full(writer, layout)?,
                }
            }
            event => {
                writer.write_event(event.clone())?;
                i += 1;
            }
        }
    }

    Ok(())
}

fn is_overridden_run_prop(name: &[u8]) -> bool {
    matches!(name, b"w:rFonts" | b"w:sz" | b"w:szCs")
}

/// Re-emit a section-properties subtree with the resolved page geometry,
/// dropping whatever `w:pgSz` / `w:pgMar` the input carried.
fn emit_sect_pr<W: Write>(
    writer: &mut Writer<W>,
    events: &[Event<'static>],
    layout: &LayoutSpec,
) -> Result<()> {
    writer.write_event(events[0].clone())?;
    write_page_geometry(writer, layout)?;

    let mut i = 1usize;
    while i < events.len() {
        match &events[i] {
            Event::Empty(e)
                if matches!(e.name().as_ref(), b"w:pgSz" | b"w:pgMar") =>
            {
                i += 1;
            }
            Event::Start(e) if matches!(e.name().as_ref(), b"w:pgSz" | b"w:pgMar") => {
                let name = e.name().as_ref().to_vec();
                i = skip_subtree(events, i, &name);
            }
            event => {
                writer.write_event(event.clone())?;
                i += 1;
            }
        }
    }

    Ok(())
}

/// Expand an empty `<w:sectPr/>` into one carrying the page geometry.
fn emit_sect_pr_from_empty<W: Write>(
    writer: &mut Writer<W>,
    empty: &BytesStart<'static>,
    layout: &LayoutSpec,
) -> Result<()> {
    writer.write_event(Event::Start(empty.clone()))?;
    write_page_geometry(writer, layout)?;
    writer.write_event(Event::End(BytesEnd::new("w:sectPr")))?;
    Ok(())
}

// -- Element builders ---------------------------------------------------------

fn write_spacing<W: Write>(writer: &mut Writer<W>, layout: &LayoutSpec) -> Result<()> {
    let line = layout.line_units.to_string();
    let mut el = BytesStart::new("w:spacing");
    el.push_attribute(("w:line", line.as_str()));
    el.push_attribute(("w:lineRule", "auto"));
    writer.write_event(Event::Empty(el))?;
    Ok(())
}

fn write_ppr_full<W: Write>(writer: &mut Writer<W>, layout: &LayoutSpec) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("w:pPr")))?;
    write_spacing(writer, layout)?;
    writer.write_event(Event::End(BytesEnd::new("w:pPr")))?;
    Ok(())
}

fn write_run_props<W: Write>(writer: &mut Writer<W>, layout: &LayoutSpec) -> Result<()> {
    let font = layout.font.name();
    let mut fonts = BytesStart::new("w:rFonts");
    fonts.push_attribute(("w:ascii", font));
    fonts.push_attribute(("w:hAnsi", font));
    fonts.push_attribute(("w:cs", font));
    writer.write_event(Event::Empty(fonts))?;

    let half_points = layout.half_points.to_string();
    let mut sz = BytesStart::new("w:sz");
    sz.push_attribute(("w:val", half_points.as_str()));
    writer.write_event(Event::Empty(sz))?;

    let mut sz_cs = BytesStart::new("w:szCs");
    sz_cs.push_attribute(("w:val", half_points.as_str()));
    writer.write_event(Event::Empty(sz_cs))?;
    Ok(())
}

fn write_rpr_full<W: Write>(writer: &mut Writer<W>, layout: &LayoutSpec) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("w:rPr")))?;
    write_run_props(writer, layout)?;
    writer.write_event(Event::End(BytesEnd::new("w:rPr")))?;
    Ok(())
}

fn write_page_geometry<W: Write>(writer: &mut Writer<W>, layout: &LayoutSpec) -> Result<()> {
    let (w, h) = (layout.page_w_twips.to_string(), layout.page_h_twips.to_string());
    let mut pg_sz = BytesStart::new("w:pgSz");
    pg_sz.push_attribute(("w:w", w.as_str()));
    pg_sz.push_attribute(("w:h", h.as_str()));
    writer.write_event(Event::Empty(pg_sz))?;

    let margin = MARGIN_TWIPS.to_string();
    let mut pg_mar = BytesStart::new("w:pgMar");
    for side in ["w:top", "w:right", "w:bottom", "w:left"] {
        pg_mar.push_attribute((side, margin.as_str()));
    }
    pg_mar.push_attribute(("w:header", "720"));
    pg_mar.push_attribute(("w:footer", "720"));
    pg_mar.push_attribute(("w:gutter", "0"));
    writer.write_event(Event::Empty(pg_mar))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Placeholder document
// ---------------------------------------------------------------------------

/// Minimal single-part DOCX carrying the diagnostic note.
///
/// The empty `<w:sectPr/>` is expanded with the resolved geometry by the
/// same rewrite pass that formats real manuscripts.
fn placeholder_archive() -> DocxArchive {
    let mut archive = DocxArchive::empty();

    archive.set_string(
        "[Content_Types].xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#,
    );

    archive.set_string(
        "_rels/.rels",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#,
    );

    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Unreadable manuscript</w:t></w:r></w:p><w:p><w:r><w:t xml:space="preserve">{PLACEHOLDER_NOTE}</w:t></w:r></w:p><w:sectPr/></w:body></w:document>"#
    );
    archive.set_string(DOCUMENT_XML, document);

    archive
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:pPr><w:spacing w:line="240" w:lineRule="auto"/></w:pPr><w:r><w:rPr><w:rFonts w:ascii="Courier New"/><w:sz w:val="20"/></w:rPr><w:t>Chapter one opens here.</w:t></w:r></w:p><w:p/><w:p><w:r><w:t xml:space="preserve">   </w:t></w:r></w:p><w:p><w:r><w:t>A bare paragraph.</w:t></w:r></w:p><w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="720" w:right="720" w:bottom="720" w:left="720" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr></w:body></w:document>"#;

    fn sample_docx() -> Vec<u8> {
        let mut archive = DocxArchive::empty();
        archive.set_string(DOCUMENT_XML, SAMPLE_DOCUMENT_XML);
        archive.to_bytes().expect("pack sample")
    }

    fn format_sample(trim: TrimSize, font: FontFamily, genre: Genre) -> String {
        let rules = FormattingRules::default();
        let formatter = DocxFormatter::new(&rules);
        let output = formatter
            .format(&sample_docx(), trim, font, genre)
            .expect("format");
        let archive = DocxArchive::from_bytes(&output).expect("unpack output");
        String::from_utf8(archive.document_xml().expect("part").to_vec()).expect("utf8")
    }

    #[test]
    fn applies_trim_size_and_margins_to_section() {
        let xml = format_sample(TrimSize::SixByNine, FontFamily::TimesNewRoman, Genre::NonFiction);
        // 6in × 1440 = 8640 twips, 9in × 1440 = 12960 twips.
        assert!(xml.contains(r#"<w:pgSz w:w="8640" w:h="12960"/>"#), "{xml}");
        assert!(xml.contains(
            r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440""#
        ));
        // The original A4 geometry must be gone.
        assert!(!xml.contains("11906"));
        assert!(!xml.contains(r#"w:top="720""#));
    }

    #[test]
    fn applies_genre_spacing_and_replaces_run_formatting() {
        let xml = format_sample(TrimSize::SixByNine, FontFamily::Georgia, Genre::NonFiction);
        // Non-fiction: 1.2 × 240 = 288; 12pt = 24 half-points.
        assert!(xml.contains(r#"<w:spacing w:line="288" w:lineRule="auto"/>"#));
        assert!(xml.contains(r#"<w:rFonts w:ascii="Georgia" w:hAnsi="Georgia" w:cs="Georgia"/>"#));
        assert!(xml.contains(r#"<w:sz w:val="24"/>"#));
        // The original run formatting must be gone.
        assert!(!xml.contains("Courier New"));
        assert!(!xml.contains(r#"<w:sz w:val="20"/>"#));
    }

    #[test]
    fn whitespace_only_paragraphs_are_left_untouched() {
        let xml = format_sample(TrimSize::FiveByEight, FontFamily::Arial, Genre::Poetry);
        // Two text-bearing paragraphs get spacing; the empty and the
        // whitespace-only paragraph do not.
        assert_eq!(xml.matches("<w:spacing").count(), 2);
        assert!(xml.contains("<w:p/>"));
        assert!(xml.contains(r#"<w:t xml:space="preserve">   </w:t>"#));
    }

    #[test]
    fn synthesizes_run_properties_when_absent() {
        let xml = format_sample(TrimSize::SixByNine, FontFamily::Garamond, Genre::Romance);
        // "A bare paragraph." has no rPr in the input; one must be created.
        assert!(xml.contains(
            r#"<w:rPr><w:rFonts w:ascii="Garamond" w:hAnsi="Garamond" w:cs="Garamond"/>"#
        ));
        // Romance: 1.3 × 240 = 312.
        assert!(xml.contains(r#"w:line="312""#));
    }

    #[test]
    fn unreadable_input_becomes_formatted_placeholder() {
        let rules = FormattingRules::default();
        let formatter = DocxFormatter::new(&rules);
        let output = formatter
            .format(b"this is not a zip archive", TrimSize::SixByNine, FontFamily::TimesNewRoman, Genre::NonFiction)
            .expect("placeholder path must not fail the job");

        let archive = DocxArchive::from_bytes(&output).expect("output is a valid DOCX");
        let xml = String::from_utf8(archive.document_xml().expect("part").to_vec()).expect("utf8");
        assert!(xml.contains("could not read the uploaded manuscript"));
        // Placeholder still carries the requested geometry and formatting.
        assert!(xml.contains(r#"<w:pgSz w:w="8640" w:h="12960"/>"#));
        assert!(xml.contains(r#"w:line="288""#));
        assert!(xml.contains("Times New Roman"));
    }

    #[test]
    fn corrupt_document_xml_becomes_formatted_placeholder() {
        let mut archive = DocxArchive::empty();
        archive.set_string(DOCUMENT_XML, "<w:document><w:body><w:p>broken");
        let input = archive.to_bytes().expect("pack");

        let rules = FormattingRules::default();
        let formatter = DocxFormatter::new(&rules);
        let output = formatter
            .format(&input, TrimSize::SevenByTen, FontFamily::Arial, Genre::SelfHelp)
            .expect("placeholder path must not fail the job");

        let restored = DocxArchive::from_bytes(&output).expect("output is a valid DOCX");
        let xml = String::from_utf8(restored.document_xml().expect("part").to_vec()).expect("utf8");
        assert!(xml.contains("could not read the uploaded manuscript"));
        assert!(xml.contains(r#"<w:pgSz w:w="10080" w:h="14400"/>"#));
    }

    #[test]
    fn section_break_in_textless_paragraph_is_rewritten() {
        // Word emits mid-document section breaks as a paragraph with no run
        // content, only a pPr carrying the sectPr.
        let document = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:pPr><w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="720" w:right="720" w:bottom="720" w:left="720"/></w:sectPr></w:pPr></w:p><w:p><w:r><w:t>Part two begins.</w:t></w:r></w:p><w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#;
        let mut archive = DocxArchive::empty();
        archive.set_string(DOCUMENT_XML, document);
        let input = archive.to_bytes().expect("pack");

        let rules = FormattingRules::default();
        let formatter = DocxFormatter::new(&rules);
        let output = formatter
            .format(&input, TrimSize::SixByNine, FontFamily::TimesNewRoman, Genre::NonFiction)
            .expect("format");

        let restored = DocxArchive::from_bytes(&output).expect("unpack");
        let xml = String::from_utf8(restored.document_xml().expect("part").to_vec()).expect("utf8");
        // Both the break's sectPr and the body-level sectPr get the new size.
        assert_eq!(xml.matches(r#"<w:pgSz w:w="8640" w:h="12960"/>"#).count(), 2);
        assert!(!xml.contains("11906"));
        assert!(!xml.contains(r#"w:top="720""#));
        // The break paragraph itself gains no spacing; only the one text
        // paragraph does.
        assert_eq!(xml.matches("<w:spacing").count(), 1);
    }

    #[test]
    fn section_break_inside_paragraph_properties_is_rewritten() {
        let document = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:pPr><w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:pPr><w:r><w:t>Part one ends.</w:t></w:r></w:p><w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:body></w:document>"#;
        let mut archive = DocxArchive::empty();
        archive.set_string(DOCUMENT_XML, document);
        let input = archive.to_bytes().expect("pack");

        let rules = FormattingRules::default();
        let formatter = DocxFormatter::new(&rules);
        let output = formatter
            .format(&input, TrimSize::FiveByEight, FontFamily::Georgia, Genre::Romance)
            .expect("format");

        let restored = DocxArchive::from_bytes(&output).expect("unpack");
        let xml = String::from_utf8(restored.document_xml().expect("part").to_vec()).expect("utf8");
        // Both the mid-document and the body-level sectPr get the new size.
        assert_eq!(xml.matches(r#"<w:pgSz w:w="7200" w:h="11520"/>"#).count(), 2);
        assert!(!xml.contains("12240"));
    }
}
