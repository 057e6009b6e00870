//! Location filter and city alias normalizer.
//!
//! Freetext inventory search leaks neighboring-city results, so external
//! candidates are checked against the target city. The check is permissive:
//! alias spellings count, and a missing location on either side passes. The
//! filter's job is dropping obvious mismatches, not proving a match.

use tracing::debug;
use triplens_common::{Candidate, CandidateSource};

/// Local/English spelling pairs seen in provider location strings.
const CITY_ALIASES: &[(&str, &str)] = &[
    ("lisbon", "lisboa"),
    ("porto", "oporto"),
    ("seville", "sevilla"),
    ("florence", "firenze"),
    ("venice", "venezia"),
    ("rome", "roma"),
    ("naples", "napoli"),
    ("munich", "münchen"),
    ("cologne", "köln"),
    ("prague", "praha"),
    ("vienna", "wien"),
    ("copenhagen", "københavn"),
    ("athens", "athina"),
    ("geneva", "genève"),
    ("marrakech", "marrakesh"),
];

/// The city part of a location string: text before the first comma,
/// lower-cased. `"Lisbon, Portugal"` becomes `"lisbon"`.
pub fn base_city(location: &str) -> String {
    location
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Whether a candidate's location text plausibly refers to the target.
pub fn location_matches(candidate_location: &str, target: &str) -> bool {
    let cand = candidate_location.trim().to_lowercase();
    let target_base = base_city(target);
    if cand.is_empty() || target_base.is_empty() {
        return true;
    }
    if cand.contains(&target_base) {
        return true;
    }
    CITY_ALIASES.iter().any(|(a, b)| {
        (target_base.contains(a) && cand.contains(b))
            || (target_base.contains(b) && cand.contains(a))
    })
}

/// Drop external candidates located somewhere else. Internal rows are
/// city-scoped at query time and pass through untouched.
pub fn filter_by_location(
    candidates: Vec<Candidate>,
    target: Option<&str>,
) -> (Vec<Candidate>, usize) {
    let Some(target) = target.map(str::trim).filter(|t| !t.is_empty()) else {
        return (candidates, 0);
    };
    let before = candidates.len();
    let kept: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| {
            c.source == CandidateSource::Internal || location_matches(&c.location, target)
        })
        .collect();
    let dropped = before - kept.len();
    if dropped > 0 {
        debug!(target, dropped, "Dropped off-target candidates");
    }
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::external;
    use triplens_common::CatalogRecord;
    use uuid::Uuid;

    #[test]
    fn country_suffix_is_stripped_from_the_target() {
        assert!(location_matches("Lisbon Old Town", "Lisbon, Portugal"));
        assert!(!location_matches("Porto Riverside", "Lisbon, Portugal"));
    }

    #[test]
    fn aliases_match_in_both_directions() {
        assert!(location_matches("Lisboa, Portugal", "Lisbon, Portugal"));
        assert!(location_matches("Lisbon, Portugal", "Lisboa"));
        assert!(location_matches("Firenze, Italia", "Florence, Italy"));
    }

    #[test]
    fn empty_sides_never_reject() {
        assert!(location_matches("", "Lisbon, Portugal"));
        assert!(location_matches("Lisbon, Portugal", ""));
        assert!(location_matches("", ""));
    }

    #[test]
    fn filter_keeps_internal_candidates_regardless_of_location() {
        let record = CatalogRecord {
            id: Uuid::new_v4(),
            title: "Surf Lesson".to_string(),
            city: "Cascais".to_string(),
            country: "Portugal".to_string(),
            tags: vec![],
            rating: 4.5,
            booking_url: String::new(),
        };
        let internal = Candidate::from(&record);
        let candidates = vec![internal, external("P-1", "Porto Surf", "Porto, Portugal")];

        let (kept, dropped) = filter_by_location(candidates, Some("Lisbon, Portugal"));
        assert_eq!(dropped, 1);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source, CandidateSource::Internal);
    }

    #[test]
    fn missing_target_is_a_no_op() {
        let candidates = vec![external("P-1", "Porto Surf", "Porto, Portugal")];
        let (kept, dropped) = filter_by_location(candidates.clone(), None);
        assert_eq!(kept, candidates);
        assert_eq!(dropped, 0);

        let (kept, dropped) = filter_by_location(candidates.clone(), Some("   "));
        assert_eq!(kept, candidates);
        assert_eq!(dropped, 0);
    }
}
