// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Persistent job records backed by SQLite.
//
// The store holds formatting-job metadata (but NOT the document bytes);
// output payloads live in the blob store and are referenced by their SHA-256
// hash. Status transitions are enforced here: a job leaves `processing`
// exactly once, and terminal rows are never updated again.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use tracing::{debug, info, instrument};

use bookforge_core::error::{BookforgeError, Result};
use bookforge_core::types::{
    AccountId, FontFamily, FormatJob, Genre, JobId, JobStatus, ManuscriptKind, TrimSize,
};

/// SQLite schema for the jobs table.
const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id TEXT PRIMARY KEY,
        account_id TEXT NOT NULL,
        original_filename TEXT NOT NULL,
        trim_size TEXT NOT NULL,
        font TEXT NOT NULL,
        genre TEXT NOT NULL,
        kind TEXT NOT NULL,
        status TEXT NOT NULL,
        output_hash TEXT,
        error_message TEXT,
        created_at TEXT NOT NULL
    )
"#;

const SELECT_COLUMNS: &str = "id, account_id, original_filename, trim_size, font, genre, \
     kind, status, output_hash, error_message, created_at";

/// Persistent job store backed by a SQLite database.
///
/// All methods are synchronous because `rusqlite` does not support async
/// natively — which matches the pipeline's one-synchronous-unit-of-work
/// model.
pub struct JobStore {
    /// The open SQLite connection.
    conn: Connection,
}

impl JobStore {
    /// Open (or create) the job database at the given path.
    ///
    /// Applies WAL journal mode for better concurrent-read behavior and
    /// creates the `jobs` table if it does not exist.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| BookforgeError::Database(format!("open: {e}")))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| BookforgeError::Database(format!("WAL pragma: {e}")))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| BookforgeError::Database(format!("create table: {e}")))?;

        info!("job database opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| BookforgeError::Database(format!("open in-memory: {e}")))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| BookforgeError::Database(format!("create table: {e}")))?;

        debug!("in-memory job database opened");
        Ok(Self { conn })
    }

    /// Insert a new job record.
    ///
    /// The job's `id`, `status`, and `created_at` fields must already be
    /// populated (they are set by `FormatJob::new`).
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    pub fn insert_job(&self, job: &FormatJob) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO jobs (id, account_id, original_filename, trim_size, font,
                 genre, kind, status, output_hash, error_message, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    job.id.to_string(),
                    job.account_id.as_str(),
                    job.original_filename,
                    encode(&job.trim_size)?,
                    encode(&job.font)?,
                    encode(&job.genre)?,
                    encode(&job.kind)?,
                    encode(&job.status)?,
                    job.output_hash,
                    job.error_message,
                    job.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| BookforgeError::Database(format!("insert job: {e}")))?;

        info!(job_id = %job.id, "job recorded");
        Ok(())
    }

    /// Transition a job from `processing` to `completed`, recording the
    /// output hash.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub fn complete_job(&self, job_id: &JobId, output_hash: &str) -> Result<()> {
        self.transition(job_id, JobStatus::Completed, Some(output_hash), None)
    }

    /// Transition a job from `processing` to `failed`, recording the error
    /// text.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub fn fail_job(&self, job_id: &JobId, error_message: &str) -> Result<()> {
        self.transition(job_id, JobStatus::Failed, None, Some(error_message))
    }

    /// Conditional terminal transition. Only rows still in `processing`
    /// match; a zero-row update means the job is unknown or already
    /// terminal, which is a programming error rather than a user-facing
    /// condition.
    fn transition(
        &self,
        job_id: &JobId,
        status: JobStatus,
        output_hash: Option<&str>,
        error_message: Option<&str>,
    ) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "UPDATE jobs SET status = ?1, output_hash = ?2, error_message = ?3
                 WHERE id = ?4 AND status = ?5",
                params![
                    encode(&status)?,
                    output_hash,
                    error_message,
                    job_id.to_string(),
                    encode(&JobStatus::Processing)?,
                ],
            )
            .map_err(|e| BookforgeError::Database(format!("update status: {e}")))?;

        if rows == 0 {
            return Err(BookforgeError::Database(format!(
                "job {job_id} not found or already terminal"
            )));
        }

        debug!(job_id = %job_id, status = ?status, "job transitioned");
        Ok(())
    }

    /// Retrieve a single job by its ID.
    ///
    /// Returns `None` if the job does not exist. Ownership checks are the
    /// caller's responsibility.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub fn get_job(&self, job_id: &JobId) -> Result<Option<FormatJob>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {SELECT_COLUMNS} FROM jobs WHERE id = ?1"))
            .map_err(|e| BookforgeError::Database(format!("prepare get_job: {e}")))?;

        let mut rows = stmt
            .query_map(params![job_id.to_string()], row_to_format_job)
            .map_err(|e| BookforgeError::Database(format!("query get_job: {e}")))?;

        match rows.next() {
            Some(Ok(job)) => Ok(Some(job)),
            Some(Err(e)) => Err(BookforgeError::Database(format!("row parse: {e}"))),
            None => Ok(None),
        }
    }

    /// All jobs owned by an account, newest first.
    #[instrument(skip(self), fields(account = %account_id))]
    pub fn jobs_for_account(&self, account_id: &AccountId) -> Result<Vec<FormatJob>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM jobs WHERE account_id = ?1
                 ORDER BY created_at DESC"
            ))
            .map_err(|e| BookforgeError::Database(format!("prepare history: {e}")))?;

        let jobs = stmt
            .query_map(params![account_id.as_str()], row_to_format_job)
            .map_err(|e| BookforgeError::Database(format!("query history: {e}")))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| BookforgeError::Database(format!("collect rows: {e}")))?;

        debug!(count = jobs.len(), "retrieved account history");
        Ok(jobs)
    }
}

/// JSON-encode an enum column the same way it is decoded.
fn encode<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| BookforgeError::Database(format!("serialize column: {e}")))
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Map a SQLite row to a `FormatJob`.
///
/// Column indices must match `SELECT_COLUMNS`.
fn row_to_format_job(row: &rusqlite::Row<'_>) -> rusqlite::Result<FormatJob> {
    let id_str: String = row.get(0)?;
    let account_id: String = row.get(1)?;
    let original_filename: String = row.get(2)?;
    let trim_size_json: String = row.get(3)?;
    let font_json: String = row.get(4)?;
    let genre_json: String = row.get(5)?;
    let kind_json: String = row.get(6)?;
    let status_json: String = row.get(7)?;
    let output_hash: Option<String> = row.get(8)?;
    let error_message: Option<String> = row.get(9)?;
    let created_at_str: String = row.get(10)?;

    let uuid = uuid::Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let trim_size: TrimSize = decode(3, &trim_size_json)?;
    let font: FontFamily = decode(4, &font_json)?;
    let genre: Genre = decode(5, &genre_json)?;
    let kind: ManuscriptKind = decode(6, &kind_json)?;
    let status: JobStatus = decode(7, &status_json)?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(10, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(FormatJob {
        id: JobId(uuid),
        account_id: AccountId::new(account_id),
        original_filename,
        trim_size,
        font,
        genre,
        kind,
        status,
        output_hash,
        error_message,
        created_at,
    })
}

fn decode<T: serde::de::DeserializeOwned>(column: usize, json: &str) -> rusqlite::Result<T> {
    serde_json::from_str(json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: create a minimal test job.
    fn test_job() -> FormatJob {
        FormatJob::new(
            AccountId::new("acct-1"),
            "draft.docx".into(),
            TrimSize::SixByNine,
            FontFamily::TimesNewRoman,
            Genre::NonFiction,
            ManuscriptKind::Docx,
        )
    }

    #[test]
    fn insert_and_retrieve_job() {
        let store = JobStore::open_in_memory().expect("open in-memory db");
        let job = test_job();
        store.insert_job(&job).expect("insert");

        let retrieved = store.get_job(&job.id).expect("get_job").expect("found");
        assert_eq!(retrieved.id, job.id);
        assert_eq!(retrieved.original_filename, "draft.docx");
        assert_eq!(retrieved.status, JobStatus::Processing);
        assert_eq!(retrieved.trim_size, TrimSize::SixByNine);
        assert!(retrieved.output_hash.is_none());
    }

    #[test]
    fn complete_records_output_reference() {
        let store = JobStore::open_in_memory().expect("open in-memory db");
        let job = test_job();
        store.insert_job(&job).expect("insert");

        store.complete_job(&job.id, "abc123").expect("complete");

        let updated = store.get_job(&job.id).expect("get_job").expect("found");
        assert_eq!(updated.status, JobStatus::Completed);
        assert_eq!(updated.output_hash.as_deref(), Some("abc123"));
        assert!(updated.error_message.is_none());
    }

    #[test]
    fn fail_records_error_text() {
        let store = JobStore::open_in_memory().expect("open in-memory db");
        let job = test_job();
        store.insert_job(&job).expect("insert");

        store
            .fail_job(&job.id, "invalid PDF file: missing %PDF- signature")
            .expect("fail");

        let updated = store.get_job(&job.id).expect("get_job").expect("found");
        assert_eq!(updated.status, JobStatus::Failed);
        assert_eq!(
            updated.error_message.as_deref(),
            Some("invalid PDF file: missing %PDF- signature")
        );
    }

    #[test]
    fn terminal_jobs_cannot_transition_again() {
        let store = JobStore::open_in_memory().expect("open in-memory db");
        let job = test_job();
        store.insert_job(&job).expect("insert");
        store.complete_job(&job.id, "abc123").expect("complete");

        assert!(store.fail_job(&job.id, "too late").is_err());
        assert!(store.complete_job(&job.id, "def456").is_err());

        // The record is unchanged.
        let unchanged = store.get_job(&job.id).expect("get_job").expect("found");
        assert_eq!(unchanged.status, JobStatus::Completed);
        assert_eq!(unchanged.output_hash.as_deref(), Some("abc123"));
    }

    #[test]
    fn transition_on_unknown_job_is_an_error() {
        let store = JobStore::open_in_memory().expect("open in-memory db");
        assert!(store.complete_job(&JobId::new(), "abc").is_err());
    }

    #[test]
    fn get_nonexistent_job_returns_none() {
        let store = JobStore::open_in_memory().expect("open in-memory db");
        let result = store.get_job(&JobId::new()).expect("get_job");
        assert!(result.is_none());
    }

    #[test]
    fn history_is_scoped_to_account_and_newest_first() {
        let store = JobStore::open_in_memory().expect("open in-memory db");

        let mine_first = test_job();
        let mut mine_second = test_job();
        // Force a strictly later timestamp so ordering is deterministic.
        mine_second.created_at = mine_first.created_at + chrono::Duration::seconds(1);
        let mut theirs = test_job();
        theirs.account_id = AccountId::new("acct-2");

        store.insert_job(&mine_first).expect("insert 1");
        store.insert_job(&mine_second).expect("insert 2");
        store.insert_job(&theirs).expect("insert 3");

        let history = store
            .jobs_for_account(&AccountId::new("acct-1"))
            .expect("history");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, mine_second.id);
        assert!(history.iter().all(|j| j.account_id.as_str() == "acct-1"));
    }
}
