//! Postgres-backed implementations of the catalog store and the durable
//! analysis cache.
//!
//! Plain string queries, no migration framework: `ensure_schema` creates the
//! two tables this crate owns and is safe to run on every startup.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use triplens_common::{AnalysisRecord, CatalogRecord, ContentAnalysis, MatchResult};
use uuid::Uuid;

use crate::analysis_cache::AnalysisStore;
use crate::traits::CatalogStore;

pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS catalog_experiences (
            id UUID PRIMARY KEY,
            title TEXT NOT NULL,
            city TEXT NOT NULL,
            country TEXT NOT NULL DEFAULT '',
            tags TEXT[] NOT NULL DEFAULT '{}',
            rating REAL NOT NULL DEFAULT 0,
            booking_url TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await
    .context("creating catalog_experiences")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analysis_cache (
            source_url TEXT PRIMARY KEY,
            analysis JSONB NOT NULL,
            result JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            expires_at TIMESTAMPTZ NOT NULL,
            hit_count BIGINT NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await
    .context("creating analysis_cache")?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_analysis_cache_expires ON analysis_cache (expires_at)",
    )
    .execute(pool)
    .await
    .context("indexing analysis_cache")?;

    info!("Postgres schema ensured");
    Ok(())
}

pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    async fn find_by_activity(
        &self,
        synonyms: &[String],
        city: &str,
        limit: u32,
    ) -> Result<Vec<CatalogRecord>> {
        let rows = sqlx::query_as::<_, (Uuid, String, String, String, Vec<String>, f32, String)>(
            r#"
            SELECT id, title, city, country, tags, rating, booking_url
            FROM catalog_experiences
            WHERE city ILIKE $1
              AND EXISTS (
                  SELECT 1 FROM unnest($2::text[]) AS term
                  WHERE title ILIKE '%' || term || '%'
                     OR EXISTS (
                         SELECT 1 FROM unnest(tags) AS tag
                         WHERE tag ILIKE '%' || term || '%'
                     )
              )
            ORDER BY rating DESC
            LIMIT $3
            "#,
        )
        .bind(city)
        .bind(synonyms.to_vec())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .context("querying catalog_experiences")?;

        Ok(rows
            .into_iter()
            .map(
                |(id, title, city, country, tags, rating, booking_url)| CatalogRecord {
                    id,
                    title,
                    city,
                    country,
                    tags,
                    rating,
                    booking_url,
                },
            )
            .collect())
    }
}

pub struct PgAnalysisStore {
    pool: PgPool,
}

impl PgAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn fetch(&self, source_url: &str) -> Result<Option<AnalysisRecord>> {
        // read and hit-count bump in one statement; expired rows never match
        let row = sqlx::query_as::<
            _,
            (
                String,
                serde_json::Value,
                serde_json::Value,
                DateTime<Utc>,
                DateTime<Utc>,
                i64,
            ),
        >(
            r#"
            UPDATE analysis_cache
            SET hit_count = hit_count + 1
            WHERE source_url = $1 AND expires_at > NOW()
            RETURNING source_url, analysis, result, created_at, expires_at, hit_count
            "#,
        )
        .bind(source_url)
        .fetch_optional(&self.pool)
        .await
        .context("reading analysis_cache")?;

        row.map(
            |(source_url, analysis, result, created_at, expires_at, hit_count)| {
                let analysis: ContentAnalysis =
                    serde_json::from_value(analysis).context("decoding cached analysis")?;
                let result: MatchResult =
                    serde_json::from_value(result).context("decoding cached result")?;
                Ok(AnalysisRecord {
                    source_url,
                    analysis,
                    result,
                    created_at,
                    expires_at,
                    hit_count: u32::try_from(hit_count).unwrap_or(u32::MAX),
                })
            },
        )
        .transpose()
    }

    async fn put(&self, record: &AnalysisRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO analysis_cache (source_url, analysis, result, created_at, expires_at, hit_count)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_url) DO UPDATE SET
                analysis = EXCLUDED.analysis,
                result = EXCLUDED.result,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at,
                hit_count = EXCLUDED.hit_count
            "#,
        )
        .bind(&record.source_url)
        .bind(serde_json::to_value(&record.analysis).context("encoding analysis")?)
        .bind(serde_json::to_value(&record.result).context("encoding result")?)
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(i64::from(record.hit_count))
        .execute(&self.pool)
        .await
        .context("writing analysis_cache")?;
        Ok(())
    }

    async fn sweep_expired(&self) -> Result<u64> {
        let done = sqlx::query("DELETE FROM analysis_cache WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .context("sweeping analysis_cache")?;
        Ok(done.rows_affected())
    }
}
