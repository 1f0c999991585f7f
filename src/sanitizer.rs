//! Sanitizer -- reduces a raw, untrusted candidate list to a safe,
//! deduplicated, bounded one.
//!
//! The model upstream hallucinates categories, drifts off topic, and
//! repeats itself. Each pass here guards against one of those failure
//! modes. The sanitizer never fails: an empty result is valid and handled
//! downstream by padding.

use std::collections::HashSet;

use crate::schema::wire::RawAppEntry;
use crate::schema::Category;

/// Maximum entries kept per tier after sanitization.
pub const MAX_PER_TIER: usize = 6;

/// Out-of-domain terms. An entry whose text mentions any of these is topic
/// drift, not a credit-building app.
const BLOCKED_TERMS: &[&str] = &[
    "fitness",
    "workout",
    "weight loss",
    "diet plan",
    "meditation",
    "mindfulness",
    "dating",
    "casino",
    "gambling",
    "betting",
    "lottery",
    "horoscope",
    "astrology",
    "recipe",
    "skincare",
    "supplement",
];

/// Sanitize one tier's candidate list.
///
/// Passes, in order:
/// 1. Drop entries whose category is not on the allow-list (exact match).
/// 2. Drop entries whose lowercased name+description+category contains a
///    blocked out-of-domain term.
/// 3. Deduplicate by normalized URL (falling back to name); first
///    occurrence wins, order preserved.
/// 4. Truncate to [`MAX_PER_TIER`].
pub fn sanitize(entries: Vec<RawAppEntry>) -> Vec<RawAppEntry> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept: Vec<RawAppEntry> = Vec::new();

    for entry in entries {
        if Category::parse(&entry.category).is_none() {
            tracing::debug!(name = %entry.name, category = %entry.category, "dropping entry with unknown category");
            continue;
        }
        if let Some(term) = blocked_term(&entry) {
            tracing::debug!(name = %entry.name, term, "dropping off-topic entry");
            continue;
        }
        if !seen.insert(dedup_key(&entry)) {
            continue;
        }

        kept.push(entry);
        if kept.len() == MAX_PER_TIER {
            break;
        }
    }

    kept
}

/// The first blocked term found in the entry's text, if any.
fn blocked_term(entry: &RawAppEntry) -> Option<&'static str> {
    let haystack = format!("{} {} {}", entry.name, entry.description, entry.category)
        .to_lowercase();
    BLOCKED_TERMS
        .iter()
        .copied()
        .find(|term| haystack.contains(term))
}

/// The identity key an entry is deduplicated by: its trimmed, lowercased
/// URL, or its lowercased name when the URL is blank.
fn dedup_key(entry: &RawAppEntry) -> String {
    let url = entry.url.trim();
    if url.is_empty() {
        entry.name.trim().to_lowercase()
    } else {
        url.to_lowercase()
    }
}
