//! Hybrid external inventory aggregation.
//!
//! Two retrieval strategies run concurrently and merge: a search scoped to
//! the provider's destination ID for the target city, and a freetext search
//! on the activity-plus-place phrase. Freetext catches sub-region results
//! (surf camps outside the city's destination boundary); the scoped search
//! is more precise when the provider knows the place. Either side may fail
//! without taking the other down.

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};
use triplens_common::Candidate;

use crate::traits::InventoryProvider;

/// Per-search fetch size; the pipeline trims hard later.
const SEARCH_LIMIT: u32 = 30;

/// Merged sets smaller than this trigger strict-term diversification.
const LOW_SIGNAL_THRESHOLD: usize = 3;

/// At most this many extra freetext searches during diversification.
const MAX_EXPANSION_SEARCHES: usize = 2;

/// What a fan-out produced, and whether the provider answered at all.
#[derive(Debug, Default)]
pub struct AggregateOutcome {
    pub candidates: Vec<Candidate>,
    pub searches_ok: u32,
    pub searches_failed: u32,
}

impl AggregateOutcome {
    /// True when every search against the provider failed.
    pub fn provider_down(&self) -> bool {
        self.searches_ok == 0 && self.searches_failed > 0
    }

    fn absorb(&mut self, seen: &mut HashSet<String>, batch: Option<Vec<Candidate>>) {
        match batch {
            Some(candidates) => {
                self.searches_ok += 1;
                for candidate in candidates {
                    // first-seen-wins, so earlier strategies keep their
                    // field values on product-code collisions
                    if seen.insert(candidate.id.clone()) {
                        self.candidates.push(candidate);
                    }
                }
            }
            None => self.searches_failed += 1,
        }
    }
}

async fn run_freetext(
    provider: &dyn InventoryProvider,
    term: &str,
    location: Option<&str>,
) -> Option<Vec<Candidate>> {
    match provider.search_freetext(term, location, SEARCH_LIMIT).await {
        Ok(candidates) => Some(candidates),
        Err(e) => {
            warn!(term, error = %e, "Freetext search failed");
            None
        }
    }
}

/// Both strategies for `NearYou`: destination-scoped and freetext, run
/// concurrently, destination results first in the merge.
pub async fn gather_near_you(
    provider: &dyn InventoryProvider,
    term: &str,
    city: &str,
    strict_terms: &[String],
) -> AggregateOutcome {
    let destination = async {
        let id = match provider.resolve_destination_id(city).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                info!(city, "Provider knows no destination for city, relying on freetext");
                return Some(Vec::new());
            }
            Err(e) => {
                warn!(city, error = %e, "Destination resolution failed, relying on freetext");
                return None;
            }
        };
        match provider.search_by_destination(&id, term, SEARCH_LIMIT).await {
            Ok(candidates) => Some(candidates),
            Err(e) => {
                warn!(city, destination = %id, error = %e, "Destination-scoped search failed");
                None
            }
        }
    };

    let (by_destination, by_freetext) =
        tokio::join!(destination, run_freetext(provider, term, Some(city)));

    let mut outcome = AggregateOutcome::default();
    let mut seen = HashSet::new();
    outcome.absorb(&mut seen, by_destination);
    outcome.absorb(&mut seen, by_freetext);

    expand_if_low_signal(provider, Some(city), strict_terms, &mut outcome, &mut seen).await;

    info!(
        merged = outcome.candidates.len(),
        failed = outcome.searches_failed,
        city,
        "Aggregated external inventory"
    );
    outcome
}

/// Freetext-only aggregation for `AsSeenOnReel` (and for queries with no
/// resolvable destination at all). `location` may be `None` for a global
/// search.
pub async fn gather_freetext(
    provider: &dyn InventoryProvider,
    term: &str,
    location: Option<&str>,
    strict_terms: &[String],
) -> AggregateOutcome {
    let mut outcome = AggregateOutcome::default();
    let mut seen = HashSet::new();
    let batch = run_freetext(provider, term, location).await;
    outcome.absorb(&mut seen, batch);

    expand_if_low_signal(provider, location, strict_terms, &mut outcome, &mut seen).await;

    info!(
        merged = outcome.candidates.len(),
        failed = outcome.searches_failed,
        "Aggregated external inventory (freetext only)"
    );
    outcome
}

/// When the merged set is thin and the taxonomy knows strictly related
/// terms, widen with extra freetext searches. Strict terms stay inside the
/// activity's domain, so this diversifies without drifting.
async fn expand_if_low_signal(
    provider: &dyn InventoryProvider,
    location: Option<&str>,
    strict_terms: &[String],
    outcome: &mut AggregateOutcome,
    seen: &mut HashSet<String>,
) {
    if outcome.candidates.len() >= LOW_SIGNAL_THRESHOLD || strict_terms.is_empty() {
        return;
    }
    info!(
        have = outcome.candidates.len(),
        "Low-signal result, expanding with strictly related terms"
    );

    let batches: Vec<Option<Vec<Candidate>>> = stream::iter(
        strict_terms
            .iter()
            .take(MAX_EXPANSION_SEARCHES)
            .map(|strict| run_freetext(provider, strict, location)),
    )
    .buffer_unordered(MAX_EXPANSION_SEARCHES)
    .collect()
    .await;

    for batch in batches {
        outcome.absorb(seen, batch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{external, MockInventory};

    fn strict(terms: &[&str]) -> Vec<String> {
        terms.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn destination_results_come_first_and_collisions_keep_them() {
        let inventory = MockInventory::new()
            .with_destination("lisbon, portugal", "479")
            .on_destination_search(
                "479",
                vec![
                    external("P-1", "Scoped Surf Lesson", "Lisbon, Portugal"),
                    external("P-2", "Scoped Surf Camp", "Lisbon, Portugal"),
                ],
            )
            .on_freetext(
                "surfing",
                vec![
                    external("P-2", "Freetext duplicate", "Lisbon, Portugal"),
                    external("P-3", "Freetext Surf Safari", "Lisbon, Portugal"),
                ],
            );

        let outcome = gather_near_you(&inventory, "surfing", "Lisbon, Portugal", &[]).await;
        let ids: Vec<&str> = outcome.candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["P-1", "P-2", "P-3"]);
        assert_eq!(outcome.candidates[1].title, "Scoped Surf Camp");
        assert!(!outcome.provider_down());
    }

    #[tokio::test]
    async fn unresolved_destination_still_uses_freetext() {
        let inventory = MockInventory::new().on_freetext(
            "surfing",
            vec![
                external("P-1", "A", "Lisbon"),
                external("P-2", "B", "Lisbon"),
                external("P-3", "C", "Lisbon"),
            ],
        );

        let outcome = gather_near_you(&inventory, "surfing", "Lisbon, Portugal", &[]).await;
        assert_eq!(outcome.candidates.len(), 3);
        assert!(!outcome.provider_down());
    }

    #[tokio::test]
    async fn one_side_down_is_partial_success() {
        let inventory = MockInventory::new()
            .failing_destination()
            .on_freetext("surfing", vec![
                external("P-1", "A", "Lisbon"),
                external("P-2", "B", "Lisbon"),
                external("P-3", "C", "Lisbon"),
            ]);

        let outcome = gather_near_you(&inventory, "surfing", "Lisbon, Portugal", &[]).await;
        assert_eq!(outcome.candidates.len(), 3);
        assert_eq!(outcome.searches_failed, 1);
        assert!(!outcome.provider_down());
    }

    #[tokio::test]
    async fn all_sides_down_reports_the_provider_down() {
        let inventory = MockInventory::new().failing_destination().failing_freetext();
        let outcome = gather_near_you(&inventory, "surfing", "Lisbon, Portugal", &[]).await;
        assert!(outcome.candidates.is_empty());
        assert!(outcome.provider_down());
    }

    #[tokio::test]
    async fn thin_results_expand_with_strict_terms() {
        let inventory = MockInventory::new()
            .on_freetext("surfing", vec![external("P-1", "Surf Lesson", "Lisbon")])
            .on_freetext("bodyboard", vec![external("P-2", "Bodyboard Intro", "Lisbon")]);

        let outcome = gather_freetext(
            &inventory,
            "surfing",
            Some("Lisbon, Portugal"),
            &strict(&["surfing", "bodyboard", "wave"]),
        )
        .await;

        let mut ids: Vec<&str> = outcome.candidates.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["P-1", "P-2"]);
        // primary search plus two expansions, never more
        assert_eq!(inventory.searches(), 3);
    }

    #[tokio::test]
    async fn healthy_results_skip_expansion() {
        let inventory = MockInventory::new().on_freetext(
            "surfing",
            vec![
                external("P-1", "A", "Lisbon"),
                external("P-2", "B", "Lisbon"),
                external("P-3", "C", "Lisbon"),
            ],
        );

        let outcome = gather_freetext(
            &inventory,
            "surfing",
            Some("Lisbon, Portugal"),
            &strict(&["surfing", "bodyboard"]),
        )
        .await;

        assert_eq!(outcome.candidates.len(), 3);
        assert_eq!(inventory.searches(), 1);
    }
}
