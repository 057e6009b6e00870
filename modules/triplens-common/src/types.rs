use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::normalize::normalize_base;

/// Maximum number of candidates in a final result.
pub const TARGET_COUNT: usize = 8;

/// Maximum internal-catalog candidates mixed into a `NearYou` result.
pub const MAX_INTERNAL_CAP: usize = 3;

// --- Modes & sources ---

/// How a recommendation request is scoped.
///
/// `NearYou` searches around the user's own city and may mix in internal
/// catalog results. `AsSeenOnReel` searches around a location detected in
/// shared content; the reel's location is not the user's location, so
/// internal catalog results (scoped to the user's city) are never included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    NearYou,
    AsSeenOnReel,
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMode::NearYou => write!(f, "near_you"),
            MatchMode::AsSeenOnReel => write!(f, "as_seen_on_reel"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Internal,
    External,
}

impl std::fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateSource::Internal => write!(f, "internal"),
            CandidateSource::External => write!(f, "external"),
        }
    }
}

// --- Geo ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

// --- Query ---

/// A single recommendation request. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct ActivityQuery {
    /// The detected activity term, e.g. "Surfing". Used for provider queries.
    pub raw_activity: String,
    /// The full descriptive label, e.g. "person surfing a large wave".
    pub full_label: String,
    /// Lower-cased, suffix-stripped base used for taxonomy and cache keys.
    pub normalized_base: String,
    /// Target city ("Lisbon, Portugal"). `None` only in `AsSeenOnReel` mode
    /// when the reel carried no detectable location.
    pub target_location: Option<String>,
    pub mode: MatchMode,
}

impl ActivityQuery {
    pub fn new(
        raw_activity: impl Into<String>,
        full_label: impl Into<String>,
        target_location: Option<String>,
        mode: MatchMode,
    ) -> Self {
        let raw_activity = raw_activity.into();
        let full_label = full_label.into();
        let normalized_base = if raw_activity.trim().is_empty() {
            normalize_base(&full_label)
        } else {
            normalize_base(&raw_activity)
        };
        Self {
            raw_activity,
            full_label,
            normalized_base,
            target_location,
            mode,
        }
    }

    /// The string used for cache keying: the normalized base when one could
    /// be derived, otherwise the full label.
    pub fn key_term(&self) -> &str {
        if self.normalized_base.is_empty() {
            &self.full_label
        } else {
            &self.normalized_base
        }
    }

    /// The human-readable phrase sent to search providers. The normalized
    /// base is for keying only; providers get the original wording.
    pub fn search_term(&self) -> &str {
        let raw = self.raw_activity.trim();
        if raw.is_empty() {
            self.full_label.trim()
        } else {
            raw
        }
    }
}

// --- Candidates & results ---

/// A single bookable experience considered for inclusion in a result set.
/// Identity is `(source, id)`; for external candidates `id` is the
/// provider's product code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub location: String,
    pub tags: Vec<String>,
    pub source: CandidateSource,
    /// Booking deep-link for external products.
    pub provider_ref: Option<String>,
    pub rating: Option<f32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCounts {
    pub internal: usize,
    pub external: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidates: Vec<Candidate>,
    pub counts: MatchCounts,
    /// User-facing explanation when the pipeline returned early or degraded
    /// (boring activity, provider outage). `None` on the happy path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl MatchResult {
    /// An empty result carrying an explanation for the user.
    pub fn empty_with_notice(notice: impl Into<String>) -> Self {
        Self {
            candidates: Vec::new(),
            counts: MatchCounts::default(),
            notice: Some(notice.into()),
        }
    }
}

/// Internal catalog row as stored. Converted to a `Candidate` after ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: Uuid,
    pub title: String,
    pub city: String,
    pub country: String,
    pub tags: Vec<String>,
    pub rating: f32,
    pub booking_url: String,
}

impl From<&CatalogRecord> for Candidate {
    fn from(rec: &CatalogRecord) -> Self {
        let location = if rec.country.is_empty() {
            rec.city.clone()
        } else {
            format!("{}, {}", rec.city, rec.country)
        };
        Candidate {
            id: rec.id.to_string(),
            title: rec.title.clone(),
            location,
            tags: rec.tags.clone(),
            source: CandidateSource::Internal,
            provider_ref: if rec.booking_url.is_empty() {
                None
            } else {
                Some(rec.booking_url.clone())
            },
            rating: Some(rec.rating),
        }
    }
}

// --- Content analysis ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Video,
    Image,
    Unknown,
}

/// Output of the upstream content-understanding step for a shared reel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub kind: ContentKind,
    pub activity: Option<String>,
    pub location: Option<String>,
    pub confidence: f32,
    pub thumbnail_url: Option<String>,
}

impl ContentAnalysis {
    /// True when neither an activity nor a location was detected.
    pub fn has_no_signal(&self) -> bool {
        self.activity.as_deref().map_or(true, |a| a.trim().is_empty())
            && self.location.as_deref().map_or(true, |l| l.trim().is_empty())
    }
}

// --- Durable analysis cache ---

/// One durable cache row: the analysis of a source URL plus the experiences
/// computed from it. `hit_count` is informational only; eviction is TTL-based.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub source_url: String,
    pub analysis: ContentAnalysis,
    pub result: MatchResult,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub hit_count: u32,
}

/// What `recommend_from_source` returns to the request layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecommendation {
    pub cached: bool,
    pub analysis: ContentAnalysis,
    pub result: MatchResult,
}
