pub mod error;
pub mod types;

pub use error::{Result, ViatorError};
pub use types::{
    DestinationRef, FreetextDestination, FreetextSearchInput, Pagination, PriceSummary,
    PricingInfo, ProductFiltering, ProductSummary, ReviewSummary, SearchTypeSpec,
};

use std::time::Duration;
use types::FreetextSearchResponse;

const BASE_URL: &str = "https://api.viator.com/partner";

/// Versioned media type the partner API requires on every call.
const ACCEPT_VERSION: &str = "application/json;version=2.0";

/// Per-request ceiling; search calls that hang would otherwise stall the
/// whole aggregation fan-out.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// How many destination hits to pull when resolving a location name.
const DESTINATION_PAGE: u32 = 5;

pub struct ViatorClient {
    client: reqwest::Client,
    api_key: String,
}

impl ViatorClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{}", BASE_URL, path))
            .header("exp-api-key", &self.api_key)
            .header("Accept", ACCEPT_VERSION)
            .header("Accept-Language", "en-US")
            .timeout(REQUEST_TIMEOUT)
    }

    /// Search bookable products by freetext term, optionally scoped to a
    /// destination ID. Returns at most `max_results` product summaries.
    pub async fn search_products(
        &self,
        term: &str,
        destination_id: Option<u64>,
        max_results: u32,
    ) -> Result<Vec<ProductSummary>> {
        tracing::info!(term, ?destination_id, "Searching Viator products");

        let input = FreetextSearchInput {
            search_term: term.to_string(),
            search_types: vec![SearchTypeSpec {
                search_type: "PRODUCTS".to_string(),
                pagination: Pagination {
                    start: 1,
                    count: max_results,
                },
            }],
            product_filtering: destination_id.map(|id| ProductFiltering {
                destination: id.to_string(),
            }),
            currency: "USD".to_string(),
        };

        let resp = self.post("/search/freetext").json(&input).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ViatorError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let api_resp: FreetextSearchResponse = resp.json().await?;
        let products = api_resp.products.map(|p| p.results).unwrap_or_default();
        tracing::info!(count = products.len(), "Fetched Viator products");

        Ok(products)
    }

    /// Resolve a location name to destination candidates. The first hit is
    /// the best match by the provider's own relevance ordering.
    pub async fn search_destinations(&self, query: &str) -> Result<Vec<FreetextDestination>> {
        tracing::info!(query, "Resolving Viator destination");

        let input = FreetextSearchInput {
            search_term: query.to_string(),
            search_types: vec![SearchTypeSpec {
                search_type: "DESTINATIONS".to_string(),
                pagination: Pagination {
                    start: 1,
                    count: DESTINATION_PAGE,
                },
            }],
            product_filtering: None,
            currency: "USD".to_string(),
        };

        let resp = self.post("/search/freetext").json(&input).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ViatorError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let api_resp: FreetextSearchResponse = resp.json().await?;
        let destinations = api_resp.destinations.map(|d| d.results).unwrap_or_default();
        tracing::info!(count = destinations.len(), "Resolved Viator destinations");

        Ok(destinations)
    }
}
