use serde::{Deserialize, Serialize};

// --- Freetext search request types ---

/// Request body for the /search/freetext endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct FreetextSearchInput {
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    #[serde(rename = "searchTypes")]
    pub search_types: Vec<SearchTypeSpec>,
    #[serde(rename = "productFiltering", skip_serializing_if = "Option::is_none")]
    pub product_filtering: Option<ProductFiltering>,
    pub currency: String,
}

/// Which result domain to search and how much of it to page in.
#[derive(Debug, Clone, Serialize)]
pub struct SearchTypeSpec {
    #[serde(rename = "searchType")]
    pub search_type: String,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub start: u32,
    pub count: u32,
}

/// Narrows product results to a single destination.
#[derive(Debug, Clone, Serialize)]
pub struct ProductFiltering {
    pub destination: String,
}

// --- Freetext search response types ---

/// Response envelope for /search/freetext. Only the sections named in
/// `searchTypes` come back populated.
#[derive(Debug, Clone, Deserialize)]
pub struct FreetextSearchResponse {
    pub products: Option<SearchResults<ProductSummary>>,
    pub destinations: Option<SearchResults<FreetextDestination>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults<T> {
    #[serde(rename = "totalCount")]
    pub total_count: Option<u64>,
    // path-form default: the bare attribute would put a `T: Default` bound
    // on the derived impl, and the result types don't implement it
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// A bookable product as returned by search.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSummary {
    #[serde(rename = "productCode")]
    pub product_code: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "productUrl")]
    pub product_url: Option<String>,
    pub reviews: Option<ReviewSummary>,
    pub pricing: Option<PricingInfo>,
    #[serde(default)]
    pub destinations: Vec<DestinationRef>,
    /// Marketing flags like FREE_CANCELLATION or LIKELY_TO_SELL_OUT.
    #[serde(default)]
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewSummary {
    #[serde(rename = "combinedAverageRating")]
    pub combined_average_rating: Option<f32>,
    #[serde(rename = "totalReviews")]
    pub total_reviews: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricingInfo {
    pub summary: Option<PriceSummary>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceSummary {
    #[serde(rename = "fromPrice")]
    pub from_price: Option<f64>,
}

/// Destination linkage on a product.
#[derive(Debug, Clone, Deserialize)]
pub struct DestinationRef {
    #[serde(rename = "ref")]
    pub dest_ref: String,
    pub primary: Option<bool>,
}

/// A destination hit from freetext search, used to resolve a location name
/// to a numeric destination ID.
#[derive(Debug, Clone, Deserialize)]
pub struct FreetextDestination {
    pub id: u64,
    pub name: String,
    #[serde(rename = "parentDestinationId")]
    pub parent_destination_id: Option<u64>,
    #[serde(rename = "destinationType")]
    pub destination_type: Option<String>,
}

impl ProductSummary {
    /// Traveler rating when the product has any reviews.
    pub fn rating(&self) -> Option<f32> {
        self.reviews.as_ref().and_then(|r| r.combined_average_rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freetext_response_sections_parse() {
        let raw = serde_json::json!({
            "products": {
                "totalCount": 128,
                "results": [{
                    "productCode": "5010SYJ",
                    "title": "Surf Lesson at Carcavelos",
                    "reviews": { "combinedAverageRating": 4.8, "totalReviews": 211 },
                    "pricing": { "summary": { "fromPrice": 45.0 }, "currency": "EUR" },
                    "flags": ["FREE_CANCELLATION"]
                }]
            },
            "destinations": {
                "totalCount": 1,
                "results": [{ "id": 538, "name": "Lisbon", "destinationType": "CITY" }]
            }
        });

        let response: FreetextSearchResponse = serde_json::from_value(raw).unwrap();
        let products = response.products.unwrap();
        assert_eq!(products.total_count, Some(128));
        assert_eq!(products.results[0].product_code, "5010SYJ");
        assert_eq!(products.results[0].rating(), Some(4.8));
        let destinations = response.destinations.unwrap();
        assert_eq!(destinations.results[0].id, 538);
    }

    #[test]
    fn missing_results_key_reads_as_empty() {
        let raw = serde_json::json!({ "totalCount": 0 });

        let products: SearchResults<ProductSummary> = serde_json::from_value(raw.clone()).unwrap();
        assert!(products.results.is_empty());
        let destinations: SearchResults<FreetextDestination> = serde_json::from_value(raw).unwrap();
        assert!(destinations.results.is_empty());
    }
}
