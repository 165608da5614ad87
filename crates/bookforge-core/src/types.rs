// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Bookforge formatting engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a formatting job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of an already-authenticated account.
///
/// Credential issuance and verification are external concerns; the engine
/// only ever sees an identity that has already passed authentication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supported manuscript input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManuscriptKind {
    Docx,
    Pdf,
}

impl ManuscriptKind {
    /// Infer the manuscript kind from a filename's extension.
    ///
    /// Only `.docx` and `.pdf` are supported; everything else is `None`.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = filename.rsplit_once('.').map(|(_, e)| e)?;
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(Self::Docx),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pdf => "pdf",
        }
    }
}

/// Lifecycle states of a formatting job.
///
/// Transitions only move forward: `Processing` → `Completed` or
/// `Processing` → `Failed`. Both end states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Accepted and being transformed.
    Processing,
    /// Output produced — see the job's output reference.
    Completed,
    /// Transformation failed — see the job's error field.
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        })
    }
}

/// Target trim sizes (physical page dimensions of the formatted book).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrimSize {
    /// 5" × 8" trade paperback.
    FiveByEight,
    /// 6" × 9" standard book.
    SixByNine,
    /// 7" × 10" textbook / workbook.
    SevenByTen,
    /// 8.5" × 11" letter.
    LetterSize,
}

impl TrimSize {
    pub const ALL: [TrimSize; 4] = [
        Self::FiveByEight,
        Self::SixByNine,
        Self::SevenByTen,
        Self::LetterSize,
    ];

    /// Stable identifier used at the intake boundary (e.g. `"6x9"`).
    pub fn id(&self) -> &'static str {
        match self {
            Self::FiveByEight => "5x8",
            Self::SixByNine => "6x9",
            Self::SevenByTen => "7x10",
            Self::LetterSize => "8.5x11",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.id() == id)
    }

    /// Page dimensions in inches (width, height).
    pub fn dimensions_in(&self) -> (f32, f32) {
        match self {
            Self::FiveByEight => (5.0, 8.0),
            Self::SixByNine => (6.0, 9.0),
            Self::SevenByTen => (7.0, 10.0),
            Self::LetterSize => (8.5, 11.0),
        }
    }
}

/// Literary genres the formatter understands.
///
/// Each genre maps to a line-spacing / font-size rule (see
/// [`crate::rules::FormattingRules`]); tiers restrict which genres an
/// account may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    NonFiction,
    Poetry,
    Romance,
    MysteryThriller,
    SciFi,
    Fantasy,
    LiteraryFiction,
    YoungAdult,
    Biography,
    SelfHelp,
}

impl Genre {
    pub const ALL: [Genre; 10] = [
        Self::NonFiction,
        Self::Poetry,
        Self::Romance,
        Self::MysteryThriller,
        Self::SciFi,
        Self::Fantasy,
        Self::LiteraryFiction,
        Self::YoungAdult,
        Self::Biography,
        Self::SelfHelp,
    ];

    /// Stable identifier used at the intake boundary.
    pub fn id(&self) -> &'static str {
        match self {
            Self::NonFiction => "non_fiction",
            Self::Poetry => "poetry",
            Self::Romance => "romance",
            Self::MysteryThriller => "mystery_thriller",
            Self::SciFi => "sci_fi",
            Self::Fantasy => "fantasy",
            Self::LiteraryFiction => "literary_fiction",
            Self::YoungAdult => "young_adult",
            Self::Biography => "biography",
            Self::SelfHelp => "self_help",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|g| g.id() == id)
    }
}

/// Typefaces available for manuscript body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    TimesNewRoman,
    Arial,
    Georgia,
    Garamond,
}

impl FontFamily {
    pub const ALL: [FontFamily; 4] = [
        Self::TimesNewRoman,
        Self::Arial,
        Self::Georgia,
        Self::Garamond,
    ];

    /// Family name as written into the output document.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TimesNewRoman => "Times New Roman",
            Self::Arial => "Arial",
            Self::Georgia => "Georgia",
            Self::Garamond => "Garamond",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }
}

/// Subscription tiers controlling quota and genre access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Free,
    Creator,
    Business,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Self::Free, Self::Creator, Self::Business];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Creator => "creator",
            Self::Business => "business",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.id() == id)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// A complete formatting job record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatJob {
    pub id: JobId,
    pub account_id: AccountId,
    pub original_filename: String,
    pub trim_size: TrimSize,
    pub font: FontFamily,
    pub genre: Genre,
    pub kind: ManuscriptKind,
    pub status: JobStatus,
    /// SHA-256 hash of the output payload, set when the job completes.
    pub output_hash: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FormatJob {
    pub fn new(
        account_id: AccountId,
        original_filename: String,
        trim_size: TrimSize,
        font: FontFamily,
        genre: Genre,
        kind: ManuscriptKind,
    ) -> Self {
        Self {
            id: JobId::new(),
            account_id,
            original_filename,
            trim_size,
            font,
            genre,
            kind,
            status: JobStatus::Processing,
            output_hash: None,
            error_message: None,
            created_at: Utc::now(),
        }
    }

    /// Filename the formatted output is served under.
    pub fn output_filename(&self) -> String {
        format!("formatted_{}", self.original_filename)
    }
}

/// Month key (`YYYY-MM`) used by the usage ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthKey(pub String);

impl MonthKey {
    /// Key for the current calendar month (UTC).
    pub fn current() -> Self {
        Self(Utc::now().format("%Y-%m").to_string())
    }

    pub fn from_date(date: &DateTime<Utc>) -> Self {
        Self(date.format("%Y-%m").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_filename_matches_supported_extensions() {
        assert_eq!(
            ManuscriptKind::from_filename("draft.docx"),
            Some(ManuscriptKind::Docx)
        );
        assert_eq!(
            ManuscriptKind::from_filename("Draft.PDF"),
            Some(ManuscriptKind::Pdf)
        );
        assert_eq!(ManuscriptKind::from_filename("notes.txt"), None);
        assert_eq!(ManuscriptKind::from_filename("no_extension"), None);
    }

    #[test]
    fn trim_size_ids_round_trip() {
        for size in TrimSize::ALL {
            assert_eq!(TrimSize::parse(size.id()), Some(size));
        }
        assert_eq!(TrimSize::parse("4x6"), None);
    }

    #[test]
    fn genre_ids_round_trip() {
        for genre in Genre::ALL {
            assert_eq!(Genre::parse(genre.id()), Some(genre));
        }
        assert_eq!(Genre::parse("cookbook"), None);
    }

    #[test]
    fn terminal_states() {
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn month_key_formats_calendar_month() {
        let date = chrono::DateTime::parse_from_rfc3339("2025-03-15T12:00:00Z")
            .expect("parse date")
            .with_timezone(&Utc);
        assert_eq!(MonthKey::from_date(&date).as_str(), "2025-03");
    }
}
