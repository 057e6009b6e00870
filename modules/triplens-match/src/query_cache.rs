//! Ephemeral per-query result cache.
//!
//! Process-local and best-effort: a hit returns the stored result verbatim,
//! entries age out by TTL, and stale entries are evicted opportunistically
//! when the map grows past its bound. Losing the whole map on restart is
//! fine; it only saves repeat work inside a ten-minute window.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;
use triplens_common::{ActivityQuery, MatchMode, MatchResult};

const QUERY_TTL: Duration = Duration::from_secs(10 * 60);
const MAX_ENTRIES: usize = 512;

/// Keying term (normalized base or full label), lower-cased location, mode.
pub type QueryKey = (String, String, MatchMode);

pub fn cache_key(query: &ActivityQuery) -> QueryKey {
    (
        query.key_term().to_lowercase(),
        query
            .target_location
            .as_deref()
            .unwrap_or_default()
            .to_lowercase(),
        query.mode,
    )
}

struct CacheEntry {
    result: MatchResult,
    inserted_at: Instant,
}

#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &QueryKey) -> Option<MatchResult> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.inserted_at.elapsed() < QUERY_TTL)
            .map(|entry| entry.result.clone())
    }

    pub async fn insert(&self, key: QueryKey, result: MatchResult) {
        let mut entries = self.entries.write().await;
        if entries.len() >= MAX_ENTRIES {
            let before = entries.len();
            entries.retain(|_, entry| entry.inserted_at.elapsed() < QUERY_TTL);
            debug!(
                evicted = before - entries.len(),
                "Evicted stale query cache entries"
            );
        }
        entries.insert(
            key,
            CacheEntry {
                result,
                inserted_at: Instant::now(),
            },
        );
    }

    #[cfg(test)]
    async fn insert_aged(&self, key: QueryKey, result: MatchResult, age: Duration) {
        let inserted_at = Instant::now().checked_sub(age).unwrap_or_else(Instant::now);
        self.entries
            .write()
            .await
            .insert(key, CacheEntry { result, inserted_at });
    }
}
