//! Boring-keyword gate over external candidate titles.
//!
//! Freetext inventory search pads thin results with passive sightseeing
//! filler. Titles matching the denylist are dropped before mixing. Internal
//! catalog rows are curated by hand and exempt.

use tracing::debug;
use triplens_common::{Candidate, CandidateSource};

use crate::catalog::contains_word;

/// Passive, low-intent experience descriptors. Matched as whole words so
/// that "spa" never hits "Spanish".
const BORING_TITLE_PHRASES: &[&str] = &[
    "city tour",
    "walking tour",
    "sightseeing",
    "hop-on hop-off",
    "hop on hop off",
    "museum",
    "spa",
    "wellness",
    "airport transfer",
    "private transfer",
    "shuttle",
    "bus tour",
];

pub fn is_boring_title(title: &str) -> bool {
    let title = title.to_lowercase();
    BORING_TITLE_PHRASES
        .iter()
        .any(|phrase| contains_word(&title, phrase))
}

/// Drop external candidates with denylisted titles.
pub fn filter_titles(candidates: Vec<Candidate>) -> (Vec<Candidate>, usize) {
    let before = candidates.len();
    let kept: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| c.source == CandidateSource::Internal || !is_boring_title(&c.title))
        .collect();
    let dropped = before - kept.len();
    if dropped > 0 {
        debug!(dropped, "Dropped denylisted candidate titles");
    }
    (kept, dropped)
}
