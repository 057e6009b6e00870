//! Internal catalog retrieval and ranking.
//!
//! The store does a broad city-scoped keyword fetch; the scorer here decides
//! the order: a synonym hit as a whole word in the title outranks a partial
//! title hit, which outranks a tag hit, with rating breaking ties.

use tracing::warn;
use triplens_common::{Candidate, CatalogRecord};

use crate::traits::CatalogStore;

/// Rows fetched from the store before in-core ranking truncates.
const FETCH_LIMIT: u32 = 25;

const WHOLE_TITLE_SCORE: i32 = 3;
const PARTIAL_TITLE_SCORE: i32 = 2;
const TAG_SCORE: i32 = 1;

/// Whether `needle` occurs in `haystack` bounded by non-alphanumeric
/// characters (or string edges) on both sides. Callers lower-case both.
pub(crate) fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(idx, matched)| {
        let before_ok = haystack[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[idx + matched.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

/// Best match quality of any synonym against one record.
fn score_record(record: &CatalogRecord, synonyms: &[String]) -> i32 {
    let title = record.title.to_lowercase();
    let mut best = 0;
    for synonym in synonyms {
        let term = synonym.trim().to_lowercase();
        if term.is_empty() {
            continue;
        }
        let score = if contains_word(&title, &term) {
            WHOLE_TITLE_SCORE
        } else if title.contains(&term) {
            PARTIAL_TITLE_SCORE
        } else if record.tags.iter().any(|t| t.to_lowercase().contains(&term)) {
            TAG_SCORE
        } else {
            0
        };
        best = best.max(score);
    }
    best
}

/// Fetch, rank, and cap internal candidates for a city. A store failure is
/// an empty internal side, never a failed request.
pub async fn search_ranked(
    store: &dyn CatalogStore,
    synonyms: &[String],
    city: &str,
    cap: usize,
) -> Vec<Candidate> {
    let records = match store.find_by_activity(synonyms, city, FETCH_LIMIT).await {
        Ok(records) => records,
        Err(e) => {
            warn!(city, error = %e, "Catalog lookup failed, continuing without internal results");
            return Vec::new();
        }
    };

    let mut scored: Vec<(i32, &CatalogRecord)> = records
        .iter()
        .map(|record| (score_record(record, synonyms), record))
        .filter(|(score, _)| *score > 0)
        .collect();
    // stable sort keeps fetch order for full ties
    scored.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| b.1.rating.total_cmp(&a.1.rating))
    });
    scored
        .into_iter()
        .take(cap)
        .map(|(_, record)| Candidate::from(record))
        .collect()
}
