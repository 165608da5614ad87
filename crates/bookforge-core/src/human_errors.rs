// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for authors who are not technical users.
//
// Every engine error is mapped to plain English with a clear suggestion.
// The taxonomy uses four severity levels that drive presentation.

use crate::error::BookforgeError;

/// Severity of an error from the author's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Temporary fault — retrying the upload may succeed.
    Transient,
    /// The author must change something about the request.
    ActionRequired,
    /// Cannot be fixed by retrying — wrong file type, corrupt input, etc.
    Permanent,
    /// A subscription change is needed (genre access or quota).
    UpgradeRequired,
}

/// A plain-English error with an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the author should try (shown as body text).
    pub suggestion: String,
    /// Whether resubmitting the same request could succeed.
    pub retriable: bool,
    /// Severity level (drives icon/colour in any front end).
    pub severity: Severity,
}

/// Convert a `BookforgeError` into a `HumanError` a first-time author can act on.
pub fn humanize_error(err: &BookforgeError) -> HumanError {
    match err {
        BookforgeError::UnsupportedFormat(name) => HumanError {
            message: "This file type can't be formatted.".into(),
            suggestion: format!(
                "Save your manuscript as a Word document (.docx) or a PDF and upload it again. (File: {name})"
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        BookforgeError::FileTooLarge { size, limit } => HumanError {
            message: "Your manuscript is too large to upload.".into(),
            suggestion: format!(
                "Files must be under {} MB (yours is {} MB). Try removing embedded images or splitting the manuscript.",
                limit / (1024 * 1024),
                size / (1024 * 1024),
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BookforgeError::InvalidTrimSize(value) => HumanError {
            message: "That book size isn't one we offer.".into(),
            suggestion: format!("Pick one of the listed trim sizes. (Requested: {value})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BookforgeError::InvalidFont(value) => HumanError {
            message: "That font isn't one we offer.".into(),
            suggestion: format!("Pick one of the listed typefaces. (Requested: {value})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BookforgeError::InvalidGenre(value) => HumanError {
            message: "That genre isn't one we recognise.".into(),
            suggestion: format!("Pick one of the listed genres. (Requested: {value})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BookforgeError::GenreNotAllowed {
            genre, required, ..
        } => HumanError {
            message: format!("The {genre} genre isn't included in your plan."),
            suggestion: format!("Upgrade to the {required} plan to format {genre} manuscripts."),
            retriable: false,
            severity: Severity::UpgradeRequired,
        },

        BookforgeError::QuotaExceeded { limit, .. } => HumanError {
            message: "You've used all your formatting jobs for this month.".into(),
            suggestion: format!(
                "Your plan includes {limit} jobs per month. Upgrade your plan, or wait until next month."
            ),
            retriable: false,
            severity: Severity::UpgradeRequired,
        },

        BookforgeError::NotFound => HumanError {
            message: "We couldn't find that job.".into(),
            suggestion: "Check the job ID — it may belong to a different account.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BookforgeError::IncompleteJob(job_id) => HumanError {
            message: "That document isn't ready yet.".into(),
            suggestion: format!("Job {job_id} hasn't finished. Check its status and try again."),
            retriable: true,
            severity: Severity::Transient,
        },

        BookforgeError::InvalidPdf(detail) => HumanError {
            message: "This PDF couldn't be read.".into(),
            suggestion: format!(
                "The file doesn't look like a real PDF. Re-export it from your writing tool and upload again. ({detail})"
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        BookforgeError::Docx(detail) => HumanError {
            message: "This Word document couldn't be rebuilt.".into(),
            suggestion: format!(
                "Re-save the manuscript from your word processor and upload again. ({detail})"
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        BookforgeError::Processing { detail, .. } => HumanError {
            message: "Something went wrong while formatting your manuscript.".into(),
            suggestion: format!("Try uploading again. If it keeps failing, contact support. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
        },

        BookforgeError::Database(detail) => HumanError {
            message: "We had trouble saving your job.".into(),
            suggestion: format!("Please try again in a moment. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
        },

        BookforgeError::Io(err) => HumanError {
            message: "We had trouble reading or writing a file.".into(),
            suggestion: format!("Please try again. ({err})"),
            retriable: true,
            severity: Severity::Transient,
        },

        BookforgeError::Serialization(err) => HumanError {
            message: "We had trouble recording your job details.".into(),
            suggestion: format!("Please try again. ({err})"),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}
