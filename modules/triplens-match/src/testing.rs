//! In-process fakes for every pipeline seam, with call counters so tests
//! can assert what was (and, just as often, was not) called.
//!
//! Builders consume and return `Self` so fixtures read as one chained
//! expression. Unregistered lookups return errors naming the missing key;
//! a test that hits one has a wiring bug, not a product bug.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use triplens_common::{Candidate, CandidateSource, CatalogRecord, ContentAnalysis, ContentKind};
use uuid::Uuid;

use crate::analysis_cache::MemoryAnalysisCache;
use crate::engine::RecommenderDeps;
use crate::traits::{
    BoringClassifier, CatalogStore, ContentAnalyzer, Geocoder, InventoryProvider, RelevanceOracle,
};

// --- Fixture helpers ---

/// External candidate as the inventory adapter would produce it.
pub fn external(id: &str, title: &str, location: &str) -> Candidate {
    Candidate {
        id: id.to_string(),
        title: title.to_string(),
        location: location.to_string(),
        tags: Vec::new(),
        source: CandidateSource::External,
        provider_ref: Some(format!("https://tours.example/{id}")),
        rating: Some(4.5),
    }
}

pub fn catalog_record(title: &str, city: &str, tags: &[&str], rating: f32) -> CatalogRecord {
    CatalogRecord {
        id: Uuid::new_v4(),
        title: title.to_string(),
        city: city.to_string(),
        country: "Portugal".to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        rating,
        booking_url: "https://app.example/book".to_string(),
    }
}

pub fn analysis(activity: Option<&str>, location: Option<&str>, confidence: f32) -> ContentAnalysis {
    ContentAnalysis {
        kind: ContentKind::Video,
        activity: activity.map(str::to_string),
        location: location.map(str::to_string),
        confidence,
        thumbnail_url: None,
    }
}

/// Deps bundle with inert defaults; override fields per test with struct
/// update syntax.
pub fn default_deps() -> RecommenderDeps {
    RecommenderDeps {
        analyzer: Arc::new(MockAnalyzer::new()),
        classifier: Arc::new(MockClassifier::new()),
        catalog: Arc::new(MockCatalog::new()),
        inventory: Arc::new(MockInventory::new()),
        oracle: Arc::new(MockOracle::new()),
        geocoder: Arc::new(MockGeocoder::new()),
        analysis_store: Arc::new(MemoryAnalysisCache::new()),
    }
}

// --- Content analyzer ---

#[derive(Default)]
pub struct MockAnalyzer {
    responses: HashMap<String, ContentAnalysis>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an analysis for a (sanitized) source URL.
    pub fn on_url(mut self, url: &str, result: ContentAnalysis) -> Self {
        self.responses.insert(url.to_string(), result);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentAnalyzer for MockAnalyzer {
    async fn analyze(&self, source_url: &str) -> Result<ContentAnalysis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("MockAnalyzer: configured to fail"));
        }
        self.responses
            .get(source_url)
            .cloned()
            .ok_or_else(|| anyhow!("MockAnalyzer: no analysis registered for {source_url}"))
    }
}

// --- Boring classifier ---

#[derive(Default)]
pub struct MockClassifier {
    boring: Vec<String>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boring_on(mut self, activity: &str) -> Self {
        self.boring.push(activity.to_lowercase());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BoringClassifier for MockClassifier {
    async fn is_boring(&self, activity: &str) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("MockClassifier: configured to fail"));
        }
        Ok(self.boring.contains(&activity.to_lowercase()))
    }
}

// --- Catalog store ---

#[derive(Default)]
pub struct MockCatalog {
    records: Vec<CatalogRecord>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, record: CatalogRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogStore for MockCatalog {
    async fn find_by_activity(
        &self,
        synonyms: &[String],
        city: &str,
        limit: u32,
    ) -> Result<Vec<CatalogRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("MockCatalog: configured to fail"));
        }
        let city = city.to_lowercase();
        Ok(self
            .records
            .iter()
            .filter(|record| record.city.to_lowercase() == city)
            .filter(|record| {
                synonyms.iter().any(|synonym| {
                    let term = synonym.to_lowercase();
                    !term.is_empty()
                        && (record.title.to_lowercase().contains(&term)
                            || record.tags.iter().any(|t| t.to_lowercase().contains(&term)))
                })
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

// --- Inventory provider ---

#[derive(Default)]
pub struct MockInventory {
    destinations: HashMap<String, String>,
    destination_results: HashMap<String, Vec<Candidate>>,
    freetext_results: HashMap<String, Vec<Candidate>>,
    default_freetext: Vec<Candidate>,
    fail_destination: bool,
    fail_freetext: bool,
    searches: AtomicUsize,
    freetext_locations: Mutex<Vec<String>>,
}

impl MockInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_destination(mut self, city: &str, id: &str) -> Self {
        self.destinations.insert(city.to_lowercase(), id.to_string());
        self
    }

    pub fn on_destination_search(mut self, id: &str, candidates: Vec<Candidate>) -> Self {
        self.destination_results.insert(id.to_string(), candidates);
        self
    }

    pub fn on_freetext(mut self, query: &str, candidates: Vec<Candidate>) -> Self {
        self.freetext_results
            .insert(query.to_lowercase(), candidates);
        self
    }

    /// Served for any freetext query without an `on_freetext` registration.
    pub fn with_default_freetext(mut self, candidates: Vec<Candidate>) -> Self {
        self.default_freetext = candidates;
        self
    }

    pub fn failing_destination(mut self) -> Self {
        self.fail_destination = true;
        self
    }

    pub fn failing_freetext(mut self) -> Self {
        self.fail_freetext = true;
        self
    }

    /// Total search calls, destination-scoped plus freetext. Resolution
    /// lookups are not searches and are not counted.
    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    /// Location arguments seen by freetext searches, in call order;
    /// `"global"` for `None`.
    pub fn freetext_locations(&self) -> Vec<String> {
        self.freetext_locations.lock().unwrap().clone()
    }
}

#[async_trait]
impl InventoryProvider for MockInventory {
    async fn resolve_destination_id(&self, city: &str) -> Result<Option<String>> {
        if self.fail_destination {
            return Err(anyhow!("MockInventory: destination resolution down"));
        }
        Ok(self.destinations.get(&city.to_lowercase()).cloned())
    }

    async fn search_by_destination(
        &self,
        destination_id: &str,
        _query: &str,
        _limit: u32,
    ) -> Result<Vec<Candidate>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.fail_destination {
            return Err(anyhow!("MockInventory: destination search down"));
        }
        Ok(self
            .destination_results
            .get(destination_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn search_freetext(
        &self,
        query: &str,
        location: Option<&str>,
        _limit: u32,
    ) -> Result<Vec<Candidate>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.freetext_locations
            .lock()
            .unwrap()
            .push(location.unwrap_or("global").to_string());
        if self.fail_freetext {
            return Err(anyhow!("MockInventory: freetext search down"));
        }
        Ok(self
            .freetext_results
            .get(&query.to_lowercase())
            .cloned()
            .unwrap_or_else(|| self.default_freetext.clone()))
    }
}

// --- Relevance oracle ---

#[derive(Default)]
pub struct MockOracle {
    keep: Option<Vec<usize>>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only these indices; the default keeps everything.
    pub fn keeping(mut self, indices: Vec<usize>) -> Self {
        self.keep = Some(indices);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelevanceOracle for MockOracle {
    async fn relevant_indices(&self, _activity: &str, titles: &[String]) -> Result<Vec<usize>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("MockOracle: configured to fail"));
        }
        Ok(self
            .keep
            .clone()
            .unwrap_or_else(|| (0..titles.len()).collect()))
    }
}

// --- Geocoder ---

#[derive(Default)]
pub struct MockGeocoder {
    location: Option<String>,
    calls: AtomicUsize,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returning(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn reverse_geocode(&self, _lat: f64, _lng: f64) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.location.clone())
    }
}
