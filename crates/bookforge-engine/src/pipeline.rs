// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The formatting pipeline: one synchronous unit of work per upload.
//
// Validator → EntitlementGate → (DocxFormatter | PdfFormatter) → job state
// transition → usage increment (success only). Validation and entitlement
// denials never touch the record store; transformation faults are caught at
// the formatter boundary and recorded on the job as `failed`.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use bookforge_core::error::{BookforgeError, Result};
use bookforge_core::rules::FormattingRules;
use bookforge_core::types::{
    AccountId, FormatJob, JobId, JobStatus, ManuscriptKind, MonthKey, Tier,
};
use bookforge_document::{DocxFormatter, PdfFormatter};

use crate::blobs::BlobStore;
use crate::entitlement::EntitlementGate;
use crate::ledger::UsageLedger;
use crate::store::JobStore;
use crate::validator;

/// An already-authenticated caller: identity plus subscription tier.
#[derive(Debug, Clone)]
pub struct AccountProfile {
    pub id: AccountId,
    pub tier: Tier,
}

/// Acknowledgment returned when an upload is accepted and processed.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub job_id: JobId,
    pub status: JobStatus,
}

/// Owner-scoped view of a job's lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatusView {
    pub job_id: JobId,
    pub status: JobStatus,
    pub error: Option<String>,
}

/// The account's standing against its monthly quota.
#[derive(Debug, Clone)]
pub struct UsageReport {
    pub month: MonthKey,
    pub used: u32,
    pub limit: u32,
}

/// A completed job's output, ready to hand to the caller.
#[derive(Debug, Clone)]
pub struct FormattedOutput {
    pub filename: String,
    /// Generic binary declaration; the caller decides transport framing.
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// The formatting job pipeline.
///
/// Owns the rule tables, job store, usage ledger, and output blob store.
/// Each upload runs to a terminal state within the call; there is no
/// background queue and no cancellation.
pub struct Pipeline {
    rules: FormattingRules,
    store: JobStore,
    ledger: UsageLedger,
    blobs: BlobStore,
}

impl Pipeline {
    pub fn new(rules: FormattingRules, store: JobStore, ledger: UsageLedger, blobs: BlobStore) -> Self {
        Self {
            rules,
            store,
            ledger,
            blobs,
        }
    }

    /// Open a pipeline with all persistence rooted in `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = data_dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Ok(Self::new(
            FormattingRules::default(),
            JobStore::open(dir.join("jobs.db"))?,
            UsageLedger::open(dir.join("usage.db"))?,
            BlobStore::new(dir.join("blobs"))?,
        ))
    }

    pub fn rules(&self) -> &FormattingRules {
        &self.rules
    }

    /// Accept and process one manuscript upload.
    ///
    /// Validation and entitlement failures return synchronously with no job
    /// created. A transformation fault marks the job `failed` and surfaces a
    /// processing error that names the job id so the caller can still query
    /// the recorded failure.
    #[instrument(skip(self, bytes), fields(account = %account.id, filename, trim_size_id, genre_id))]
    pub fn upload(
        &self,
        account: &AccountProfile,
        filename: &str,
        bytes: &[u8],
        trim_size_id: &str,
        font_name: &str,
        genre_id: &str,
    ) -> Result<UploadReceipt> {
        let validated = validator::validate(
            filename,
            bytes.len() as u64,
            trim_size_id,
            font_name,
            genre_id,
        )?;

        let month = MonthKey::current();
        let used = self.ledger.usage_for_month(&account.id, &month)?;
        EntitlementGate::new(&self.rules).authorize(account.tier, validated.genre, used)?;

        let job = FormatJob::new(
            account.id.clone(),
            filename.to_string(),
            validated.trim_size,
            validated.font,
            validated.genre,
            validated.kind,
        );
        self.store.insert_job(&job)?;

        let formatted = match validated.kind {
            ManuscriptKind::Docx => DocxFormatter::new(&self.rules).format(
                bytes,
                validated.trim_size,
                validated.font,
                validated.genre,
            ),
            ManuscriptKind::Pdf => PdfFormatter::new(&self.rules).format(
                bytes,
                validated.trim_size,
                validated.font,
                validated.genre,
            ),
        };

        match formatted {
            Ok(output) => match self.record_completion(&job, &account.id, &month, &output) {
                Ok(receipt) => Ok(receipt),
                Err(err) => {
                    // A job that began processing must still end terminal,
                    // even when the fault is in persistence rather than
                    // transformation. Recording the failure is best-effort.
                    let detail = err.to_string();
                    warn!(job_id = %job.id, %detail, "could not persist completed output");
                    if let Err(record_err) = self.store.fail_job(&job.id, &detail) {
                        warn!(job_id = %job.id, %record_err, "failure could not be recorded");
                    }
                    Err(err)
                }
            },
            Err(err) => {
                let detail = err.to_string();
                warn!(job_id = %job.id, %detail, "transformation failed");
                self.store.fail_job(&job.id, &detail)?;
                Err(BookforgeError::Processing {
                    job_id: job.id.to_string(),
                    detail,
                })
            }
        }
    }

    /// Persist a successful transformation: output payload, terminal
    /// `completed` state, usage increment.
    fn record_completion(
        &self,
        job: &FormatJob,
        account_id: &AccountId,
        month: &MonthKey,
        output: &[u8],
    ) -> Result<UploadReceipt> {
        let hash = self.blobs.store(output)?;
        self.store.complete_job(&job.id, &hash)?;
        self.ledger.increment(account_id, month)?;
        info!(job_id = %job.id, output_len = output.len(), "job completed");
        Ok(UploadReceipt {
            job_id: job.id,
            status: JobStatus::Completed,
        })
    }

    /// Lifecycle state of a job, visible only to its owner.
    #[instrument(skip(self), fields(account = %account_id, job_id = %job_id))]
    pub fn status(&self, account_id: &AccountId, job_id: &JobId) -> Result<JobStatusView> {
        let job = self.owned_job(account_id, job_id)?;
        Ok(JobStatusView {
            job_id: job.id,
            status: job.status,
            error: job.error_message,
        })
    }

    /// The formatted output of a completed job, visible only to its owner.
    #[instrument(skip(self), fields(account = %account_id, job_id = %job_id))]
    pub fn fetch_output(&self, account_id: &AccountId, job_id: &JobId) -> Result<FormattedOutput> {
        let job = self.owned_job(account_id, job_id)?;

        if job.status != JobStatus::Completed {
            return Err(BookforgeError::IncompleteJob(job.id.to_string()));
        }

        let hash = job.output_hash.as_deref().ok_or_else(|| {
            BookforgeError::Database(format!("completed job {} has no output reference", job.id))
        })?;
        let bytes = self.blobs.load(hash)?;

        Ok(FormattedOutput {
            filename: job.output_filename(),
            content_type: "application/octet-stream",
            bytes,
        })
    }

    /// All of the account's jobs, newest first.
    pub fn history(&self, account_id: &AccountId) -> Result<Vec<FormatJob>> {
        self.store.jobs_for_account(account_id)
    }

    /// The account's current-month usage against its tier limit.
    pub fn usage(&self, account: &AccountProfile) -> Result<UsageReport> {
        self.usage_at(account, Utc::now())
    }

    /// Usage for the calendar month containing `at` (injectable for tests).
    pub fn usage_at(&self, account: &AccountProfile, at: DateTime<Utc>) -> Result<UsageReport> {
        let month = MonthKey::from_date(&at);
        let used = self.ledger.usage_for_month(&account.id, &month)?;
        let limit = self.rules.tier_policy(account.tier).monthly_limit;
        Ok(UsageReport { month, used, limit })
    }

    /// Fetch a job and enforce ownership. Foreign jobs are indistinguishable
    /// from missing ones.
    fn owned_job(&self, account_id: &AccountId, job_id: &JobId) -> Result<FormatJob> {
        match self.store.get_job(job_id)? {
            Some(job) if job.account_id == *account_id => Ok(job),
            Some(_) => Err(BookforgeError::NotFound),
            None => Err(BookforgeError::NotFound),
        }
    }
}
