// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Usage ledger — per-account, per-calendar-month counters of completed jobs.
//
// The increment is a single SQLite upsert so concurrent uploads from the
// same account never lose updates. Incremented only after a job reaches
// `completed`, never on failure.

use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, instrument};

use bookforge_core::error::{BookforgeError, Result};
use bookforge_core::types::{AccountId, MonthKey};

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS usage_counters (
        account_id TEXT NOT NULL,
        month TEXT NOT NULL,
        jobs_completed INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (account_id, month)
    )
"#;

/// Monthly usage counters backed by a SQLite database.
pub struct UsageLedger {
    conn: Connection,
}

impl UsageLedger {
    /// Open (or create) the ledger database at the given path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| BookforgeError::Database(format!("open: {e}")))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| BookforgeError::Database(format!("WAL pragma: {e}")))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| BookforgeError::Database(format!("create table: {e}")))?;

        info!("usage ledger opened");
        Ok(Self { conn })
    }

    /// Open an in-memory ledger (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| BookforgeError::Database(format!("open in-memory: {e}")))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| BookforgeError::Database(format!("create table: {e}")))?;

        debug!("in-memory usage ledger opened");
        Ok(Self { conn })
    }

    /// Atomically add one completed job to the account's counter for `month`.
    #[instrument(skip(self), fields(account = %account_id, month = %month))]
    pub fn increment(&self, account_id: &AccountId, month: &MonthKey) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO usage_counters (account_id, month, jobs_completed)
                 VALUES (?1, ?2, 1)
                 ON CONFLICT(account_id, month)
                 DO UPDATE SET jobs_completed = jobs_completed + 1",
                params![account_id.as_str(), month.as_str()],
            )
            .map_err(|e| BookforgeError::Database(format!("increment usage: {e}")))?;

        debug!("usage incremented");
        Ok(())
    }

    /// The account's counter for `month`; 0 for a month never seen.
    #[instrument(skip(self), fields(account = %account_id, month = %month))]
    pub fn usage_for_month(&self, account_id: &AccountId, month: &MonthKey) -> Result<u32> {
        let count: Option<u32> = self
            .conn
            .query_row(
                "SELECT jobs_completed FROM usage_counters
                 WHERE account_id = ?1 AND month = ?2",
                params![account_id.as_str(), month.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| BookforgeError::Database(format!("read usage: {e}")))?;

        Ok(count.unwrap_or(0))
    }
}
