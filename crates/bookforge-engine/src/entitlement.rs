// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Entitlement gate — tier genre allow-list and monthly quota.
//
// Evaluated strictly before any transformation work begins, and before the
// usage ledger is incremented. A denial here never creates a job.

use tracing::debug;

use bookforge_core::error::{BookforgeError, Result};
use bookforge_core::rules::FormattingRules;
use bookforge_core::types::{Genre, Tier};

/// Decides whether an account's tier permits a requested genre and whether
/// the account has quota left this month.
pub struct EntitlementGate<'a> {
    rules: &'a FormattingRules,
}

impl<'a> EntitlementGate<'a> {
    pub fn new(rules: &'a FormattingRules) -> Self {
        Self { rules }
    }

    /// Authorize a formatting request.
    ///
    /// `used_this_month` is the account's usage counter for the current
    /// month key (0 for an unseen month). Genre access is checked first so a
    /// quota-exhausted account still learns about plan restrictions.
    pub fn authorize(&self, tier: Tier, genre: Genre, used_this_month: u32) -> Result<()> {
        let policy = self.rules.tier_policy(tier);

        if !policy.allows(genre) {
            let required = self.rules.minimum_tier_for(genre);
            debug!(tier = %tier, genre = genre.id(), required = %required, "genre denied");
            return Err(BookforgeError::GenreNotAllowed {
                genre: genre.id().to_string(),
                tier: tier.id().to_string(),
                required: required.id().to_string(),
            });
        }

        if used_this_month >= policy.monthly_limit {
            debug!(tier = %tier, used = used_this_month, limit = policy.monthly_limit, "quota denied");
            return Err(BookforgeError::QuotaExceeded {
                used: used_this_month,
                limit: policy.monthly_limit,
            });
        }

        Ok(())
    }
}
