//! Durable analysis cache: sanitized source URL → analysis plus the
//! experiences computed from it.
//!
//! This tier exists because content analysis is the expensive step. A repeat
//! share of the same reel should cost one map lookup, not another model
//! call. The store is a trait so deployments can point it at Postgres
//! (`crate::pg::PgAnalysisStore`) or keep the in-process map below.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use triplens_common::{AnalysisRecord, ContentAnalysis, MatchResult};
use url::Url;

/// Days a cached analysis stays servable.
pub const ANALYSIS_TTL_DAYS: i64 = 30;

/// Query parameters stripped before a URL becomes a cache key. Share links
/// for the same reel differ only by this junk.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "igsh",
    "igshid",
    "si",
    "feature",
    "ref",
    "share_id",
];

/// Canonical cache key for a source URL: tracking parameters and fragment
/// removed, trailing slash trimmed. Unparseable input is keyed as given.
pub fn sanitize_source_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(mut url) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.set_query(None);
    if !kept.is_empty() {
        let query = kept
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        url.set_query(Some(&query));
    }
    url.set_fragment(None);

    url.to_string().trim_end_matches('/').to_string()
}

/// A record ready to store: TTL stamped from now, zero hits.
pub fn fresh_record(
    source_url: impl Into<String>,
    analysis: ContentAnalysis,
    result: MatchResult,
) -> AnalysisRecord {
    let now = Utc::now();
    AnalysisRecord {
        source_url: source_url.into(),
        analysis,
        result,
        created_at: now,
        expires_at: now + chrono::Duration::days(ANALYSIS_TTL_DAYS),
        hit_count: 0,
    }
}

/// Store contract for the durable tier.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Live entry for a sanitized URL, bumping its hit counter as a side
    /// effect. Expired entries behave as misses.
    async fn fetch(&self, source_url: &str) -> Result<Option<AnalysisRecord>>;

    /// Whole-record upsert. A rewrite after expiry replaces every field,
    /// hit count included.
    async fn put(&self, record: &AnalysisRecord) -> Result<()>;

    /// Delete expired rows, returning how many went away.
    async fn sweep_expired(&self) -> Result<u64>;
}

/// In-process implementation. Fine for single-instance deployments; entries
/// are lost on restart and simply recomputed.
#[derive(Default)]
pub struct MemoryAnalysisCache {
    entries: RwLock<HashMap<String, AnalysisRecord>>,
}

impl MemoryAnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detached periodic expiry sweep. The handle is only useful in tests.
    pub fn spawn_sweep_loop(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(every).await;
                match cache.sweep_expired().await {
                    Ok(0) => {}
                    Ok(removed) => info!(removed, "Swept expired analysis cache entries"),
                    Err(e) => warn!(error = %e, "Analysis cache sweep failed"),
                }
            }
        })
    }
}

#[async_trait]
impl AnalysisStore for MemoryAnalysisCache {
    async fn fetch(&self, source_url: &str) -> Result<Option<AnalysisRecord>> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(source_url) {
            Some(record) if record.expires_at > Utc::now() => {
                record.hit_count += 1;
                Ok(Some(record.clone()))
            }
            Some(_) => {
                entries.remove(source_url);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, record: &AnalysisRecord) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(record.source_url.clone(), record.clone());
        Ok(())
    }

    async fn sweep_expired(&self) -> Result<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let now = Utc::now();
        entries.retain(|_, record| record.expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}
