//! Final assembly: source mixing, identity dedup, truncation, counts.

use std::collections::HashSet;

use triplens_common::{
    Candidate, CandidateSource, MatchCounts, MatchMode, MatchResult, MAX_INTERNAL_CAP,
    TARGET_COUNT,
};

/// Assemble the final result from ranked internal and filtered external
/// candidates. Order within each source is preserved; internal candidates
/// always come first and only appear in `NearYou` mode.
pub fn mix(internal: Vec<Candidate>, external: Vec<Candidate>, mode: MatchMode) -> MatchResult {
    let internal_cap = match mode {
        MatchMode::NearYou => MAX_INTERNAL_CAP,
        MatchMode::AsSeenOnReel => 0,
    };

    let mut seen: HashSet<(CandidateSource, String)> = HashSet::new();
    let mut candidates: Vec<Candidate> = Vec::with_capacity(TARGET_COUNT);

    for candidate in internal.into_iter().take(internal_cap) {
        if seen.insert((candidate.source, candidate.id.clone())) {
            candidates.push(candidate);
        }
    }
    for candidate in external {
        if candidates.len() >= TARGET_COUNT {
            break;
        }
        if seen.insert((candidate.source, candidate.id.clone())) {
            candidates.push(candidate);
        }
    }

    let counts = MatchCounts {
        internal: candidates
            .iter()
            .filter(|c| c.source == CandidateSource::Internal)
            .count(),
        external: candidates
            .iter()
            .filter(|c| c.source == CandidateSource::External)
            .count(),
    };
    MatchResult {
        candidates,
        counts,
        notice: None,
    }
}
