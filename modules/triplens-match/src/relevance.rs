//! Conditional relevance filtering.
//!
//! The oracle call costs money and latency, so it only runs when the
//! candidate set is large enough for keyword retrieval alone to be noisy.
//! Every failure mode (error, timeout, nonsense indices) degrades to the
//! unfiltered set; this stage may never lose a request.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, warn};
use triplens_common::Candidate;

use crate::traits::RelevanceOracle;

/// Sets at or below this size skip the oracle entirely.
pub const RELEVANCE_MIN_CANDIDATES: usize = 10;

/// Bound on oracle latency; a slow judgement is skipped, not awaited.
const ORACLE_TIMEOUT: Duration = Duration::from_secs(8);

pub async fn filter_relevant(
    oracle: &dyn RelevanceOracle,
    activity: &str,
    candidates: Vec<Candidate>,
) -> Vec<Candidate> {
    if candidates.len() <= RELEVANCE_MIN_CANDIDATES {
        debug!(
            count = candidates.len(),
            "Below relevance threshold, keeping all"
        );
        return candidates;
    }

    let titles: Vec<String> = candidates.iter().map(|c| c.title.clone()).collect();
    let indices =
        match tokio::time::timeout(ORACLE_TIMEOUT, oracle.relevant_indices(activity, &titles))
            .await
        {
            Ok(Ok(indices)) => indices,
            Ok(Err(e)) => {
                warn!(error = %e, "Relevance oracle failed, keeping unfiltered set");
                return candidates;
            }
            Err(_) => {
                warn!("Relevance oracle timed out, keeping unfiltered set");
                return candidates;
            }
        };

    if indices.iter().any(|&idx| idx >= candidates.len()) {
        warn!(
            ?indices,
            "Relevance oracle returned out-of-range indices, keeping unfiltered set"
        );
        return candidates;
    }

    let keep: HashSet<usize> = indices.into_iter().collect();
    let before = candidates.len();
    let kept: Vec<Candidate> = candidates
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| keep.contains(idx))
        .map(|(_, candidate)| candidate)
        .collect();
    debug!(before, after = kept.len(), "Relevance filter applied");
    kept
}
