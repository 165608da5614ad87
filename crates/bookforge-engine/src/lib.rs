// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bookforge-engine — The formatting job pipeline.
//
// Control flow for every upload: Validator → EntitlementGate →
// (DocxFormatter | PdfFormatter) → job state transition → usage increment
// (success only). Auth and transport are external collaborators; the engine
// consumes an already-authenticated account identity and exposes a
// transport-agnostic API.

pub mod blobs;
pub mod entitlement;
pub mod ledger;
pub mod pipeline;
pub mod standards;
pub mod store;
pub mod validator;

pub use blobs::BlobStore;
pub use entitlement::EntitlementGate;
pub use ledger::UsageLedger;
pub use pipeline::{AccountProfile, FormattedOutput, JobStatusView, Pipeline, UploadReceipt, UsageReport};
pub use store::JobStore;
