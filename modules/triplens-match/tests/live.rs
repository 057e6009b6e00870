//! Smoke tests against live backing services.
//! Run with: cargo test -p triplens-match --test live -- --ignored

use triplens_common::MatchResult;
use triplens_match::analysis_cache::{fresh_record, AnalysisStore};
use triplens_match::pg::{ensure_schema, PgAnalysisStore, PgCatalog};
use triplens_match::testing::analysis;
use triplens_match::traits::CatalogStore;
use viator_client::ViatorClient;

#[tokio::test]
#[ignore] // requires a live Viator API key
async fn viator_freetext_search_returns_products() {
    let api_key = std::env::var("VIATOR_API_KEY").expect("VIATOR_API_KEY required");
    let client = ViatorClient::new(api_key);

    let products = client
        .search_products("surfing", None, 5)
        .await
        .expect("Freetext search failed");
    assert!(!products.is_empty(), "Expected at least one product");
    assert!(products.iter().all(|p| !p.product_code.is_empty()));
}

#[tokio::test]
#[ignore] // requires a live Viator API key
async fn viator_resolves_a_major_city() {
    let api_key = std::env::var("VIATOR_API_KEY").expect("VIATOR_API_KEY required");
    let client = ViatorClient::new(api_key);

    let destinations = client
        .search_destinations("Lisbon")
        .await
        .expect("Destination search failed");
    assert!(
        destinations.iter().any(|d| d.name.contains("Lisbon")),
        "Expected Lisbon among {destinations:?}"
    );
}

#[tokio::test]
#[ignore] // requires live Postgres credentials
async fn analysis_cache_roundtrip_in_postgres() {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = sqlx::PgPool::connect(&url).await.expect("Failed to connect");
    ensure_schema(&pool).await.expect("Schema setup failed");

    let store = PgAnalysisStore::new(pool);
    let record = fresh_record(
        "https://instagram.com/reel/live-smoke",
        analysis(Some("Surfing"), Some("Lisbon, Portugal"), 0.9),
        MatchResult::default(),
    );
    store.put(&record).await.expect("Put failed");

    let fetched = store
        .fetch(&record.source_url)
        .await
        .expect("Fetch failed")
        .expect("Row missing after put");
    assert_eq!(fetched.analysis.activity, record.analysis.activity);
    // the fetch itself bumps the counter
    assert_eq!(fetched.hit_count, record.hit_count + 1);
}

#[tokio::test]
#[ignore] // requires live Postgres credentials
async fn catalog_query_shapes_are_valid() {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = sqlx::PgPool::connect(&url).await.expect("Failed to connect");
    ensure_schema(&pool).await.expect("Schema setup failed");

    let catalog = PgCatalog::new(pool);
    // empty result is fine; this verifies the SQL against a real server
    let records = catalog
        .find_by_activity(&["surf".to_string()], "lisbon", 5)
        .await
        .expect("Catalog query failed");
    assert!(records.len() <= 5);
}
