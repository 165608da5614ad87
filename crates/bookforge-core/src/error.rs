// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bookforge.

use thiserror::Error;

/// Top-level error type for all Bookforge operations.
#[derive(Debug, Error)]
pub enum BookforgeError {
    // -- Upload validation (synchronous, no job is created) --
    #[error("unsupported manuscript format: {0} (only .docx and .pdf are accepted)")]
    UnsupportedFormat(String),

    #[error("file too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("invalid trim size: {0}")]
    InvalidTrimSize(String),

    #[error("invalid font: {0}")]
    InvalidFont(String),

    #[error("invalid genre: {0}")]
    InvalidGenre(String),

    // -- Entitlement (synchronous, no job is created) --
    #[error("genre '{genre}' is not available on the {tier} plan; upgrade to {required}")]
    GenreNotAllowed {
        genre: String,
        tier: String,
        required: String,
    },

    #[error("monthly quota exhausted: {used} of {limit} jobs used this month")]
    QuotaExceeded { used: u32, limit: u32 },

    // -- Job lookup --
    #[error("job not found")]
    NotFound,

    #[error("job {0} has not finished processing")]
    IncompleteJob(String),

    // -- Transformation --
    #[error("invalid PDF file: {0}")]
    InvalidPdf(String),

    #[error("DOCX operation failed: {0}")]
    Docx(String),

    #[error("document processing failed for job {job_id}: {detail}")]
    Processing { job_id: String, detail: String },

    // -- Storage / persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BookforgeError {
    /// True for denials the caller sees before any job exists.
    ///
    /// Validation and entitlement failures never touch the record store.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat(_)
                | Self::FileTooLarge { .. }
                | Self::InvalidTrimSize(_)
                | Self::InvalidFont(_)
                | Self::InvalidGenre(_)
                | Self::GenreNotAllowed { .. }
                | Self::QuotaExceeded { .. }
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BookforgeError>;
