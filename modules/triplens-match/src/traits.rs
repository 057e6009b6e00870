//! Seams between the pipeline and the services it calls.
//!
//! Every external collaborator sits behind one of these traits so the
//! pipeline can be exercised end to end against in-process fakes. Production
//! wiring: `ViatorClient` for inventory (adapter below), `PgCatalog` for the
//! catalog, `ActivityOracle` for both AI-backed judgements. Content analysis
//! and geocoding stay trait-only; the request layer owns those services.

use anyhow::{Context, Result};
use async_trait::async_trait;
use triplens_common::{Candidate, CandidateSource, CatalogRecord, ContentAnalysis};
use viator_client::{ProductSummary, ViatorClient};

/// Black-box content understanding for a shared reel or image URL.
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    async fn analyze(&self, source_url: &str) -> Result<ContentAnalysis>;
}

/// Judges whether an activity is a routine travel moment not worth booking.
#[async_trait]
pub trait BoringClassifier: Send + Sync {
    async fn is_boring(&self, activity: &str) -> Result<bool>;
}

/// City-scoped keyword lookup over the internal experience catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_by_activity(
        &self,
        synonyms: &[String],
        city: &str,
        limit: u32,
    ) -> Result<Vec<CatalogRecord>>;
}

/// External tour inventory: destination resolution plus the two search
/// strategies the aggregator fans out over.
#[async_trait]
pub trait InventoryProvider: Send + Sync {
    /// Resolve a city name to the provider's destination identifier.
    /// `Ok(None)` when the provider does not know the place.
    async fn resolve_destination_id(&self, city: &str) -> Result<Option<String>>;

    /// Product search restricted to one resolved destination.
    async fn search_by_destination(
        &self,
        destination_id: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Candidate>>;

    /// Free-text product search, optionally anchored to a location phrase.
    async fn search_freetext(
        &self,
        query: &str,
        location: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Candidate>>;
}

/// Batched semantic relevance judgement over candidate titles.
#[async_trait]
pub trait RelevanceOracle: Send + Sync {
    /// Indices into `titles` judged relevant to `activity`.
    async fn relevant_indices(&self, activity: &str, titles: &[String]) -> Result<Vec<usize>>;
}

/// Reverse geocoding for the caller's raw coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<Option<String>>;
}

// --- Production inventory wiring ---

fn candidate_from_product(product: ProductSummary) -> Candidate {
    let rating = product.rating();
    Candidate {
        id: product.product_code,
        title: product.title,
        // Product summaries carry destination refs, not place names. The
        // location filter treats an empty side as a pass.
        location: String::new(),
        tags: product.flags,
        source: CandidateSource::External,
        provider_ref: product.product_url,
        rating,
    }
}

/// Provider search phrase. An activity anchored to a place searches far
/// better than either alone; a place with no activity still gets a usable
/// generic phrase.
fn compose_search_phrase(query: &str, location: Option<&str>) -> String {
    let query = query.trim();
    match location.map(str::trim) {
        Some(loc) if !loc.is_empty() && query.is_empty() => format!("things to do in {loc}"),
        Some(loc) if !loc.is_empty() => format!("{query} in {loc}"),
        _ => query.to_string(),
    }
}

#[async_trait]
impl InventoryProvider for ViatorClient {
    async fn resolve_destination_id(&self, city: &str) -> Result<Option<String>> {
        let destinations = self.search_destinations(city).await?;
        let best = destinations
            .iter()
            .find(|d| d.destination_type.as_deref() == Some("CITY"))
            .or_else(|| destinations.first());
        Ok(best.map(|d| d.id.to_string()))
    }

    async fn search_by_destination(
        &self,
        destination_id: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Candidate>> {
        let id: u64 = destination_id
            .parse()
            .with_context(|| format!("malformed destination id {destination_id}"))?;
        let products = self.search_products(query, Some(id), limit).await?;
        Ok(products.into_iter().map(candidate_from_product).collect())
    }

    async fn search_freetext(
        &self,
        query: &str,
        location: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Candidate>> {
        let phrase = compose_search_phrase(query, location);
        let products = self.search_products(&phrase, None, limit).await?;
        Ok(products.into_iter().map(candidate_from_product).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viator_client::{DestinationRef, ReviewSummary};

    fn product(code: &str, title: &str) -> ProductSummary {
        ProductSummary {
            product_code: code.to_string(),
            title: title.to_string(),
            description: None,
            product_url: Some(format!("https://tours.example/{code}")),
            reviews: Some(ReviewSummary {
                combined_average_rating: Some(4.7),
                total_reviews: Some(210),
            }),
            pricing: None,
            destinations: vec![DestinationRef {
                dest_ref: "479".to_string(),
                primary: Some(true),
            }],
            flags: vec!["FREE_CANCELLATION".to_string()],
        }
    }

    #[test]
    fn product_maps_to_external_candidate() {
        let candidate = candidate_from_product(product("P-1", "Surf Lesson"));
        assert_eq!(candidate.id, "P-1");
        assert_eq!(candidate.source, CandidateSource::External);
        assert_eq!(candidate.rating, Some(4.7));
        assert_eq!(
            candidate.provider_ref.as_deref(),
            Some("https://tours.example/P-1")
        );
        assert!(candidate.location.is_empty());
        assert_eq!(candidate.tags, vec!["FREE_CANCELLATION".to_string()]);
    }

    #[test]
    fn search_phrase_anchors_to_location() {
        assert_eq!(
            compose_search_phrase("surfing", Some("Lisbon, Portugal")),
            "surfing in Lisbon, Portugal"
        );
        assert_eq!(compose_search_phrase("surfing", None), "surfing");
        assert_eq!(compose_search_phrase("surfing", Some("  ")), "surfing");
    }

    #[test]
    fn search_phrase_without_activity_stays_generic() {
        assert_eq!(
            compose_search_phrase("", Some("Lisbon")),
            "things to do in Lisbon"
        );
        assert_eq!(compose_search_phrase("", None), "");
    }
}
