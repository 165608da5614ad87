// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end pipeline scenarios: upload through formatting to fetch,
// covering entitlement denials, quota exhaustion, transformation faults,
// and ownership scoping.

use tempfile::TempDir;
use uuid::Uuid;

use bookforge_core::error::BookforgeError;
use bookforge_core::rules::FormattingRules;
use bookforge_core::types::{AccountId, JobId, JobStatus, Tier};
use bookforge_document::docx::archive::DocxArchive;
use bookforge_engine::validator::MAX_UPLOAD_BYTES;
use bookforge_engine::{AccountProfile, BlobStore, JobStore, Pipeline, UsageLedger};

fn pipeline() -> (Pipeline, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let pipeline = Pipeline::new(
        FormattingRules::default(),
        JobStore::open_in_memory().expect("job store"),
        UsageLedger::open_in_memory().expect("ledger"),
        BlobStore::new(dir.path().join("blobs")).expect("blob store"),
    );
    (pipeline, dir)
}

fn free_account() -> AccountProfile {
    AccountProfile {
        id: AccountId("author-1".to_string()),
        tier: Tier::Free,
    }
}

fn creator_account() -> AccountProfile {
    AccountProfile {
        id: AccountId("author-2".to_string()),
        tier: Tier::Creator,
    }
}

/// A structurally valid .docx with one paragraph of body text.
fn sample_docx() -> Vec<u8> {
    let mut archive = DocxArchive::empty();
    archive.set_string(
        "word/document.xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>It was a dark and stormy night.</w:t></w:r></w:p>
    <w:sectPr/>
  </w:body>
</w:document>"#,
    );
    archive.to_bytes().expect("zip")
}

fn job_id_from(err: &BookforgeError) -> JobId {
    match err {
        BookforgeError::Processing { job_id, .. } => {
            JobId(Uuid::parse_str(job_id).expect("job id is a uuid"))
        }
        other => panic!("expected processing error, got {other}"),
    }
}

#[test]
fn docx_upload_completes_and_counts_against_usage() {
    let (pipeline, _dir) = pipeline();
    let account = free_account();

    let receipt = pipeline
        .upload(
            &account,
            "novel.docx",
            &sample_docx(),
            "6x9",
            "Times New Roman",
            "non_fiction",
        )
        .expect("upload");
    assert_eq!(receipt.status, JobStatus::Completed);

    let usage = pipeline.usage(&account).expect("usage");
    assert_eq!(usage.used, 1);
    assert_eq!(usage.limit, 2);

    let output = pipeline
        .fetch_output(&account.id, &receipt.job_id)
        .expect("fetch");
    assert_eq!(output.filename, "formatted_novel.docx");
    // Still a ZIP container.
    assert!(output.bytes.starts_with(b"PK"));
    assert_ne!(output.bytes, sample_docx());
}

#[test]
fn free_tier_genre_denial_creates_no_job() {
    let (pipeline, _dir) = pipeline();
    let account = free_account();

    let result = pipeline.upload(
        &account,
        "novel.docx",
        &sample_docx(),
        "6x9",
        "Times New Roman",
        "mystery_thriller",
    );
    assert!(matches!(
        result,
        Err(BookforgeError::GenreNotAllowed { .. })
    ));

    assert!(pipeline.history(&account.id).expect("history").is_empty());
    assert_eq!(pipeline.usage(&account).expect("usage").used, 0);
}

#[test]
fn quota_exhaustion_rejects_the_next_upload() {
    let (pipeline, _dir) = pipeline();
    let account = free_account();
    let bytes = sample_docx();

    for name in ["one.docx", "two.docx"] {
        pipeline
            .upload(&account, name, &bytes, "6x9", "Georgia", "poetry")
            .expect("within quota");
    }

    let result = pipeline.upload(&account, "three.docx", &bytes, "6x9", "Georgia", "poetry");
    assert!(matches!(
        result,
        Err(BookforgeError::QuotaExceeded { used: 2, limit: 2 })
    ));
    assert_eq!(pipeline.history(&account.id).expect("history").len(), 2);
}

#[test]
fn invalid_pdf_bytes_record_a_failed_job() {
    let (pipeline, _dir) = pipeline();
    let account = creator_account();

    let err = pipeline
        .upload(
            &account,
            "scan.pdf",
            b"this is not a pdf",
            "5x8",
            "Garamond",
            "sci_fi",
        )
        .expect_err("must fail");
    let job_id = job_id_from(&err);

    // The failure is recorded and queryable by the owner.
    let view = pipeline.status(&account.id, &job_id).expect("status");
    assert_eq!(view.status, JobStatus::Failed);
    assert!(view.error.as_deref().unwrap_or("").contains("invalid PDF file"));

    // Failed jobs do not consume quota.
    assert_eq!(pipeline.usage(&account).expect("usage").used, 0);
}

#[test]
fn malformed_docx_degrades_to_a_placeholder_output() {
    let (pipeline, _dir) = pipeline();
    let account = free_account();

    let receipt = pipeline
        .upload(
            &account,
            "broken.docx",
            b"not a zip archive at all",
            "8.5x11",
            "Arial",
            "non_fiction",
        )
        .expect("degraded completion");
    assert_eq!(receipt.status, JobStatus::Completed);

    let output = pipeline
        .fetch_output(&account.id, &receipt.job_id)
        .expect("fetch");
    assert!(output.bytes.starts_with(b"PK"));
}

#[test]
fn failed_job_output_is_not_fetchable() {
    let (pipeline, _dir) = pipeline();
    let account = creator_account();

    let err = pipeline
        .upload(&account, "scan.pdf", b"garbage", "6x9", "Arial", "fantasy")
        .expect_err("must fail");
    let job_id = job_id_from(&err);

    let result = pipeline.fetch_output(&account.id, &job_id);
    assert!(matches!(result, Err(BookforgeError::IncompleteJob(_))));
}

#[test]
fn jobs_are_invisible_to_other_accounts() {
    let (pipeline, _dir) = pipeline();
    let owner = free_account();
    let stranger = creator_account();

    let receipt = pipeline
        .upload(
            &owner,
            "novel.docx",
            &sample_docx(),
            "6x9",
            "Times New Roman",
            "romance",
        )
        .expect("upload");

    assert!(matches!(
        pipeline.status(&stranger.id, &receipt.job_id),
        Err(BookforgeError::NotFound)
    ));
    assert!(matches!(
        pipeline.fetch_output(&stranger.id, &receipt.job_id),
        Err(BookforgeError::NotFound)
    ));
    assert!(pipeline.history(&stranger.id).expect("history").is_empty());
}

#[test]
fn oversized_upload_is_rejected_before_any_job_exists() {
    let (pipeline, _dir) = pipeline();
    let account = creator_account();

    let bytes = vec![0u8; (MAX_UPLOAD_BYTES + 1) as usize];
    let result = pipeline.upload(&account, "huge.docx", &bytes, "6x9", "Arial", "biography");
    assert!(matches!(result, Err(BookforgeError::FileTooLarge { .. })));
    assert!(pipeline.history(&account.id).expect("history").is_empty());
}

#[test]
fn persistence_fault_after_formatting_still_ends_terminal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blob_root = dir.path().join("blobs");
    let blobs = BlobStore::new(&blob_root).expect("blob store");
    // Replace the store root with a regular file so the payload write fails
    // after the transformation has already succeeded.
    std::fs::remove_dir(&blob_root).expect("remove blob dir");
    std::fs::write(&blob_root, b"").expect("occupy blob path");

    let pipeline = Pipeline::new(
        FormattingRules::default(),
        JobStore::open_in_memory().expect("job store"),
        UsageLedger::open_in_memory().expect("ledger"),
        blobs,
    );
    let account = free_account();

    let result = pipeline.upload(
        &account,
        "novel.docx",
        &sample_docx(),
        "6x9",
        "Times New Roman",
        "non_fiction",
    );
    assert!(result.is_err());

    // The job is not stranded in processing: it is recorded failed, and the
    // usage counter never moved.
    let history = pipeline.history(&account.id).expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, JobStatus::Failed);
    assert!(history[0].error_message.is_some());
    assert_eq!(pipeline.usage(&account).expect("usage").used, 0);
}

#[test]
fn status_reads_are_idempotent() {
    let (pipeline, _dir) = pipeline();
    let account = free_account();

    let receipt = pipeline
        .upload(
            &account,
            "novel.docx",
            &sample_docx(),
            "7x10",
            "Georgia",
            "poetry",
        )
        .expect("upload");

    let first = pipeline.status(&account.id, &receipt.job_id).expect("status");
    let second = pipeline.status(&account.id, &receipt.job_id).expect("status");
    assert_eq!(first, second);
    assert_eq!(first.status, JobStatus::Completed);
    assert!(first.error.is_none());
}
