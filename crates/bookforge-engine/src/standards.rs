// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Long-form reference text describing the formatting conventions Bookforge
// applies. Returned verbatim to callers; nothing here is computed.

/// The formatting standards reference shown to authors.
pub static FORMATTING_STANDARDS: &str = "\
BOOKFORGE FORMATTING STANDARDS

Trim sizes
  5\" x 8\"    — trade paperback, common for fiction and poetry.
  6\" x 9\"    — the standard book size for most genres.
  7\" x 10\"   — textbooks, workbooks, and illustrated non-fiction.
  8.5\" x 11\" — letter size, for manuals and large-format reference.

Page geometry
  Every formatted document uses 1-inch margins on all four sides at the
  selected trim size. Word-processing manuscripts keep their full text;
  page dimensions, margins, paragraph spacing, and body font are rewritten.

Typefaces
  Times New Roman, Arial, Georgia, and Garamond are available for body
  text. Serif faces (Times New Roman, Georgia, Garamond) are conventional
  for print fiction; Arial suits workbooks and technical material.

Genre conventions
  Non-fiction, biography     — 12pt body, 1.2 line spacing.
  Self-help                  — 12pt body, 1.25 line spacing.
  Fiction (romance, mystery & thriller, science fiction, fantasy,
  literary fiction)          — 12pt body, 1.3 line spacing.
  Young adult                — 12pt body, 1.4 line spacing.
  Poetry                     — 11pt body, 1.15 line spacing; blank lines
                               between stanzas are preserved exactly.

PDF manuscripts
  PDF input is not reflowed. Bookforge verifies the file, counts its
  pages, and produces a specification sheet at the requested trim size
  recording your directives and the detected page count. For a full
  conversion, upload the manuscript as a .docx file.
";

/// Return the standards text.
pub fn formatting_standards() -> &'static str {
    FORMATTING_STANDARDS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standards_text_is_returned_verbatim() {
        assert!(std::ptr::eq(formatting_standards(), FORMATTING_STANDARDS));
        assert!(formatting_standards().contains("1-inch margins"));
        assert!(formatting_standards().contains("not reflowed"));
    }
}
