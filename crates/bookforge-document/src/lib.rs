// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bookforge-document — Manuscript transformation for the Bookforge engine.
//
// Provides the two format-specific formatters: a DOCX rewriter that applies
// page geometry, margins, and genre-driven paragraph/run formatting in place,
// and a PDF formatter that emits a summary document at the target trim size.
// Both degrade gracefully rather than failing a job: unparseable DOCX input
// is replaced by a diagnostic placeholder document, and PDF generation faults
// fall back to returning the original bytes.

pub mod docx;
pub mod pdf;

pub use docx::formatter::DocxFormatter;
pub use pdf::PdfFormatter;
