// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bookforge — Core types, rule tables, and error definitions shared across all crates.

pub mod error;
pub mod human_errors;
pub mod rules;
pub mod types;

pub use error::BookforgeError;
pub use rules::FormattingRules;
pub use types::*;
