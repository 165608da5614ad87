// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upload validation — pure checks over the request and the static
// enumerations. Runs before any side effect; a failed validation never
// creates a job.

use bookforge_core::error::{BookforgeError, Result};
use bookforge_core::types::{FontFamily, Genre, ManuscriptKind, TrimSize};

/// Upload size ceiling: 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// The resolved, known-good directives of a validated upload.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedUpload {
    pub kind: ManuscriptKind,
    pub trim_size: TrimSize,
    pub font: FontFamily,
    pub genre: Genre,
}

/// Validate an upload request.
///
/// Checks, in order: file kind (by extension), byte-size ceiling, then each
/// directive against its enumeration. Unknown enumeration values are
/// rejected here rather than deep inside the transformation code.
pub fn validate(
    filename: &str,
    byte_len: u64,
    trim_size_id: &str,
    font_name: &str,
    genre_id: &str,
) -> Result<ValidatedUpload> {
    let kind = ManuscriptKind::from_filename(filename)
        .ok_or_else(|| BookforgeError::UnsupportedFormat(filename.to_string()))?;

    if byte_len > MAX_UPLOAD_BYTES {
        return Err(BookforgeError::FileTooLarge {
            size: byte_len,
            limit: MAX_UPLOAD_BYTES,
        });
    }

    let trim_size = TrimSize::parse(trim_size_id)
        .ok_or_else(|| BookforgeError::InvalidTrimSize(trim_size_id.to_string()))?;
    let font = FontFamily::parse(font_name)
        .ok_or_else(|| BookforgeError::InvalidFont(font_name.to_string()))?;
    let genre = Genre::parse(genre_id)
        .ok_or_else(|| BookforgeError::InvalidGenre(genre_id.to_string()))?;

    Ok(ValidatedUpload {
        kind,
        trim_size,
        font,
        genre,
    })
}
