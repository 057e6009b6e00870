//! The `Recommender` orchestrator: wires the gates, searches, filters, and
//! caches into the two public operations.
//!
//! Pipeline order is deliberate. The ephemeral cache and the gate run before
//! anything that costs money; the cheap location and keyword filters run
//! before the paid relevance filter so the oracle sees the smallest possible
//! set; mixing and truncation happen last so no filter ever operates on an
//! already-truncated list.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};
use triplens_common::{
    taxonomy, ActivityQuery, Config, ContentAnalysis, GeoPoint, MatchMode, MatchResult,
    SourceRecommendation, TriplensError, MAX_INTERNAL_CAP,
};
use viator_client::ViatorClient;

use crate::analysis_cache::{self, AnalysisStore};
use crate::gate::{self, GateVerdict};
use crate::oracle::ActivityOracle;
use crate::pg::{PgAnalysisStore, PgCatalog};
use crate::query_cache::{self, QueryCache};
use crate::traits::{
    BoringClassifier, CatalogStore, ContentAnalyzer, Geocoder, InventoryProvider, RelevanceOracle,
};
use crate::{aggregator, catalog, keyword_gate, location, mixer, relevance};

const NOTICE_BORING: &str =
    "This looks like a routine travel moment rather than a bookable experience.";
const NOTICE_NO_SIGNAL: &str = "We couldn't tell what activity or place to search for.";
const NOTICE_PROVIDER_DOWN: &str =
    "Live experience inventory is unavailable right now; showing what we have.";

/// Everything the pipeline calls out to, behind trait objects so tests can
/// swap in fakes and deployments can swap in stores.
pub struct RecommenderDeps {
    pub analyzer: Arc<dyn ContentAnalyzer>,
    pub classifier: Arc<dyn BoringClassifier>,
    pub catalog: Arc<dyn CatalogStore>,
    pub inventory: Arc<dyn InventoryProvider>,
    pub oracle: Arc<dyn RelevanceOracle>,
    pub geocoder: Arc<dyn Geocoder>,
    pub analysis_store: Arc<dyn AnalysisStore>,
}

impl RecommenderDeps {
    /// Wire the shipped implementations from configuration and a shared
    /// pool. The content analyzer and reverse geocoder are consumed
    /// interfaces with no in-repo implementation, so the host supplies them.
    pub fn live(
        config: &Config,
        pool: PgPool,
        analyzer: Arc<dyn ContentAnalyzer>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        let oracle = Arc::new(ActivityOracle::new(&config.anthropic_api_key));
        Self {
            analyzer,
            classifier: oracle.clone(),
            catalog: Arc::new(PgCatalog::new(pool.clone())),
            inventory: Arc::new(ViatorClient::new(config.viator_api_key.clone())),
            oracle,
            geocoder,
            analysis_store: Arc::new(PgAnalysisStore::new(pool)),
        }
    }
}

pub struct Recommender {
    deps: RecommenderDeps,
    query_cache: QueryCache,
}

/// Per-request pipeline accounting, logged once at the end of a run.
#[derive(Debug, Default)]
struct MatchStats {
    internal_found: usize,
    external_found: usize,
    dropped_by_location: usize,
    dropped_by_keyword: usize,
    dropped_by_relevance: usize,
    final_count: usize,
}

impl std::fmt::Display for MatchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "internal={} external={} dropped[location={} keyword={} relevance={}] final={}",
            self.internal_found,
            self.external_found,
            self.dropped_by_location,
            self.dropped_by_keyword,
            self.dropped_by_relevance,
            self.final_count
        )
    }
}

impl Recommender {
    pub fn new(deps: RecommenderDeps) -> Self {
        Self {
            deps,
            query_cache: QueryCache::new(),
        }
    }

    /// Match a detected activity to bookable experiences.
    ///
    /// Early exits (cache hit, boring or empty query) are soft: they return
    /// an empty result with a notice, never an error. Search degradation is
    /// soft too; the only hard errors live in `recommend_from_source`.
    pub async fn recommend(&self, query: ActivityQuery) -> Result<MatchResult, TriplensError> {
        let key = query_cache::cache_key(&query);
        if let Some(result) = self.query_cache.get(&key).await {
            info!(term = query.key_term(), mode = %query.mode, "Query cache hit");
            return Ok(result);
        }

        if query.search_term().is_empty() && query.target_location.is_none() {
            return Ok(MatchResult::empty_with_notice(NOTICE_NO_SIGNAL));
        }
        if gate::boring_check(self.deps.classifier.as_ref(), query.search_term()).await
            == GateVerdict::Boring
        {
            info!(term = query.search_term(), "Boring activity, skipping search");
            return Ok(MatchResult::empty_with_notice(NOTICE_BORING));
        }

        let (result, provider_down) = self.run_pipeline(&query).await;
        // a transient outage must not pin an empty result for the TTL
        if !provider_down {
            self.query_cache.insert(key, result.clone()).await;
        }
        Ok(result)
    }

    /// Recommend experiences for a shared reel or image URL.
    ///
    /// The durable cache makes repeat shares of the same content free: a hit
    /// returns without calling the content analyzer at all.
    pub async fn recommend_from_source(
        &self,
        source_url: &str,
        user_location: Option<GeoPoint>,
    ) -> Result<SourceRecommendation, TriplensError> {
        let clean_url = analysis_cache::sanitize_source_url(source_url);

        match self.deps.analysis_store.fetch(&clean_url).await {
            Ok(Some(record)) => {
                info!(source_url = %clean_url, hits = record.hit_count, "Analysis cache hit");
                return Ok(SourceRecommendation {
                    cached: true,
                    analysis: record.analysis,
                    result: record.result,
                });
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Analysis cache read failed, treating as miss"),
        }

        let analysis = self
            .deps
            .analyzer
            .analyze(&clean_url)
            .await
            .map_err(|e| TriplensError::ContentAnalysis(e.to_string()))?;

        // an unintelligible source is a hard error and is never cached, so
        // a transient analyzer hiccup cannot poison the URL for 30 days
        if gate::content_check(&analysis) == GateVerdict::Irrelevant {
            return Err(TriplensError::NothingToSearch(clean_url));
        }

        let activity = analysis.activity.clone().unwrap_or_default();
        if gate::boring_check(self.deps.classifier.as_ref(), &activity).await
            == GateVerdict::Boring
        {
            info!(activity = %activity, "Boring source activity, caching the empty result");
            let result = MatchResult::empty_with_notice(NOTICE_BORING);
            self.store_analysis(&clean_url, &analysis, &result).await;
            return Ok(SourceRecommendation {
                cached: false,
                analysis,
                result,
            });
        }

        let target_location = match &analysis.location {
            Some(location) if !location.trim().is_empty() => Some(location.clone()),
            _ => self.fallback_location(user_location).await,
        };
        if activity.trim().is_empty() && target_location.is_none() {
            return Err(TriplensError::NothingToSearch(clean_url));
        }

        let query = ActivityQuery::new(
            activity.clone(),
            activity,
            target_location,
            MatchMode::AsSeenOnReel,
        );
        let (result, provider_down) = self.run_pipeline(&query).await;
        if !provider_down {
            self.store_analysis(&clean_url, &analysis, &result).await;
        }

        Ok(SourceRecommendation {
            cached: false,
            analysis,
            result,
        })
    }

    /// Taxonomy, searches, filters, mixing. Shared by both operations; the
    /// caller decides what to do about caching based on `provider_down`.
    async fn run_pipeline(&self, query: &ActivityQuery) -> (MatchResult, bool) {
        let mut stats = MatchStats::default();
        let term = query.search_term();
        let synonyms = taxonomy::synonyms_for(query.key_term());
        let strict_terms = taxonomy::strict_terms_for(query.key_term());
        let target = query.target_location.as_deref();

        let (internal, outcome) = match (query.mode, target) {
            (MatchMode::NearYou, Some(city)) if !term.is_empty() => {
                let city_base = location::base_city(city);
                tokio::join!(
                    catalog::search_ranked(
                        self.deps.catalog.as_ref(),
                        &synonyms,
                        &city_base,
                        MAX_INTERNAL_CAP,
                    ),
                    aggregator::gather_near_you(
                        self.deps.inventory.as_ref(),
                        term,
                        city,
                        &strict_terms,
                    )
                )
            }
            _ => (
                Vec::new(),
                aggregator::gather_freetext(
                    self.deps.inventory.as_ref(),
                    term,
                    target,
                    &strict_terms,
                )
                .await,
            ),
        };

        let provider_down = outcome.provider_down();
        stats.internal_found = internal.len();
        stats.external_found = outcome.candidates.len();

        let (external, dropped) = location::filter_by_location(outcome.candidates, target);
        stats.dropped_by_location = dropped;

        let (external, dropped) = keyword_gate::filter_titles(external);
        stats.dropped_by_keyword = dropped;

        let before_relevance = external.len();
        let external =
            relevance::filter_relevant(self.deps.oracle.as_ref(), term, external).await;
        stats.dropped_by_relevance = before_relevance - external.len();

        let mut result = mixer::mix(internal, external, query.mode);
        if provider_down {
            result.notice = Some(NOTICE_PROVIDER_DOWN.to_string());
        }
        stats.final_count = result.candidates.len();
        info!(mode = %query.mode, term, "Match pipeline done: {stats}");

        (result, provider_down)
    }

    async fn fallback_location(&self, user_location: Option<GeoPoint>) -> Option<String> {
        let point = user_location?;
        match self.deps.geocoder.reverse_geocode(point.lat, point.lng).await {
            Ok(located) => located,
            Err(e) => {
                warn!(error = %e, "Reverse geocoding failed, searching globally");
                None
            }
        }
    }

    async fn store_analysis(
        &self,
        source_url: &str,
        analysis: &ContentAnalysis,
        result: &MatchResult,
    ) {
        let record = analysis_cache::fresh_record(source_url, analysis.clone(), result.clone());
        if let Err(e) = self.deps.analysis_store.put(&record).await {
            warn!(error = %e, "Analysis cache write failed");
        }
    }
}
