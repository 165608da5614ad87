// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rule tables: genre formatting conventions, tier policies, and the fixed
// enumerations behind them.
//
// These are process-wide read-only configuration, but deliberately NOT
// ambient globals — components take a `FormattingRules` at construction so
// they stay unit-testable without any bootstrap.

use serde::{Deserialize, Serialize};

use crate::types::{FontFamily, Genre, Tier, TrimSize};

/// Formatting convention for a single genre.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenreRule {
    pub genre: Genre,
    pub display_name: String,
    /// Paragraph line-spacing multiplier. Always > 1.0.
    pub line_spacing: f32,
    /// Body font size in points.
    pub font_size_pt: f32,
    pub description: String,
}

/// Quota and genre entitlements for a subscription tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierPolicy {
    pub tier: Tier,
    pub display_name: String,
    /// Completed formatting jobs allowed per calendar month.
    pub monthly_limit: u32,
    pub monthly_price_cents: u32,
    pub allowed_genres: Vec<Genre>,
}

impl TierPolicy {
    pub fn allows(&self, genre: Genre) -> bool {
        self.allowed_genres.contains(&genre)
    }
}

/// A genre as presented in the catalog, with the querying tier's access flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenreListing {
    pub id: String,
    pub display_name: String,
    pub line_spacing: f32,
    pub font_size_pt: f32,
    pub description: String,
    pub allowed: bool,
}

/// The complete rule table: genre conventions plus tier policies.
///
/// Built once at startup and shared by reference; all lookups are total over
/// the fixed enumerations in `types`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattingRules {
    genre_rules: Vec<GenreRule>,
    tier_policies: Vec<TierPolicy>,
}

impl FormattingRules {
    /// Look up the formatting convention for a genre.
    pub fn genre_rule(&self, genre: Genre) -> &GenreRule {
        self.genre_rules
            .iter()
            .find(|r| r.genre == genre)
            .unwrap_or_else(|| unreachable!("rule table covers every genre"))
    }

    /// Look up the policy for a tier.
    pub fn tier_policy(&self, tier: Tier) -> &TierPolicy {
        self.tier_policies
            .iter()
            .find(|p| p.tier == tier)
            .unwrap_or_else(|| unreachable!("policy table covers every tier"))
    }

    /// The cheapest tier whose allow-list contains `genre`.
    ///
    /// Used to name the remediation in genre-denial errors.
    pub fn minimum_tier_for(&self, genre: Genre) -> Tier {
        self.tier_policies
            .iter()
            .filter(|p| p.allows(genre))
            .min_by_key(|p| p.monthly_price_cents)
            .map(|p| p.tier)
            .unwrap_or(Tier::Business)
    }

    pub fn genre_rules(&self) -> &[GenreRule] {
        &self.genre_rules
    }

    pub fn tier_policies(&self) -> &[TierPolicy] {
        &self.tier_policies
    }

    pub fn trim_sizes(&self) -> &'static [TrimSize] {
        &TrimSize::ALL
    }

    pub fn fonts(&self) -> &'static [FontFamily] {
        &FontFamily::ALL
    }

    /// Genre catalog as seen by an account on `tier`, with access flags.
    pub fn genre_catalog(&self, tier: Tier) -> Vec<GenreListing> {
        let policy = self.tier_policy(tier);
        self.genre_rules
            .iter()
            .map(|rule| GenreListing {
                id: rule.genre.id().to_string(),
                display_name: rule.display_name.clone(),
                line_spacing: rule.line_spacing,
                font_size_pt: rule.font_size_pt,
                description: rule.description.clone(),
                allowed: policy.allows(rule.genre),
            })
            .collect()
    }
}

impl Default for FormattingRules {
    fn default() -> Self {
        let genre_rules = vec![
            rule(
                Genre::NonFiction,
                "Non-Fiction",
                1.2,
                12.0,
                "Factual content such as textbooks, memoirs, or guides. \
                 Tight 1.2 spacing for dense informational text.",
            ),
            rule(
                Genre::Poetry,
                "Poetry",
                1.15,
                11.0,
                "Verse with emphasis on rhythm and form. Blank lines between \
                 stanzas are preserved exactly.",
            ),
            rule(
                Genre::Romance,
                "Romance",
                1.3,
                12.0,
                "Character-driven fiction formatted with comfortable novel spacing.",
            ),
            rule(
                Genre::MysteryThriller,
                "Mystery & Thriller",
                1.3,
                12.0,
                "Plot-driven fiction with standard novel spacing for fast reading.",
            ),
            rule(
                Genre::SciFi,
                "Science Fiction",
                1.3,
                12.0,
                "Speculative fiction formatted with standard novel spacing.",
            ),
            rule(
                Genre::Fantasy,
                "Fantasy",
                1.3,
                12.0,
                "Secondary-world fiction formatted with standard novel spacing.",
            ),
            rule(
                Genre::LiteraryFiction,
                "Literary Fiction",
                1.3,
                12.0,
                "Prose-forward fiction with standard novel spacing.",
            ),
            rule(
                Genre::YoungAdult,
                "Young Adult",
                1.4,
                12.0,
                "Fiction for younger readers; generous 1.4 spacing improves readability.",
            ),
            rule(
                Genre::Biography,
                "Biography & Memoir",
                1.2,
                12.0,
                "Life writing formatted like non-fiction, with 1.2 spacing.",
            ),
            rule(
                Genre::SelfHelp,
                "Self-Help",
                1.25,
                12.0,
                "Practical guidance with slightly open 1.25 spacing.",
            ),
        ];

        let all: Vec<Genre> = Genre::ALL.to_vec();
        let tier_policies = vec![
            TierPolicy {
                tier: Tier::Free,
                display_name: "Free".into(),
                monthly_limit: 2,
                monthly_price_cents: 0,
                allowed_genres: vec![Genre::NonFiction, Genre::Poetry, Genre::Romance],
            },
            TierPolicy {
                tier: Tier::Creator,
                display_name: "Creator".into(),
                monthly_limit: 10,
                monthly_price_cents: 999,
                allowed_genres: all.clone(),
            },
            TierPolicy {
                tier: Tier::Business,
                display_name: "Business".into(),
                monthly_limit: 50,
                monthly_price_cents: 2999,
                allowed_genres: all,
            },
        ];

        Self {
            genre_rules,
            tier_policies,
        }
    }
}

fn rule(
    genre: Genre,
    display_name: &str,
    line_spacing: f32,
    font_size_pt: f32,
    description: &str,
) -> GenreRule {
    GenreRule {
        genre,
        display_name: display_name.into(),
        line_spacing,
        font_size_pt,
        description: description.into(),
    }
}
