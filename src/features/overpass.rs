//! Overpass API feature source (OpenStreetMap)
//!
//! Each category becomes one union query over nodes, ways and relations that
//! asks only for the element count.

use crate::constants::api::OVERPASS_QUERY_TIMEOUT_SECS;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::features::{Category, FeatureSource, TagFilter, TagValues};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Overpass feature source
#[derive(Debug, Clone)]
pub struct OverpassBackend {
    client: reqwest::Client,
    url: String,
}

/// Overpass JSON response
#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
    /// Set when the server aborted the query (timeout, memory)
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    tags: HashMap<String, String>,
}

impl OverpassBackend {
    /// Create a backend against the given interpreter endpoint
    pub fn new(url: &str, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Build the count query for one category
    pub fn build_query(center: Coordinates, radius: u32, category: Category) -> String {
        let around = format!("(around:{},{},{})", radius, center.lat, center.lng);

        let mut query = format!("[out:json][timeout:{}];\n(\n", OVERPASS_QUERY_TIMEOUT_SECS);
        for filter in category.tags() {
            query.push_str(&format!("  nwr{}{};\n", tag_selector(filter), around));
        }
        query.push_str(");\nout count;");
        query
    }

    /// Pull the total out of an `out count;` response
    fn parse_count(body: &str) -> Result<u32> {
        let response: OverpassResponse = serde_json::from_str(body)?;

        if let Some(remark) = response.remark {
            return Err(Error::FeatureQuery(format!("Overpass remark: {}", remark)));
        }

        let element = response
            .elements
            .into_iter()
            .find(|e| e.kind == "count")
            .ok_or_else(|| {
                Error::FeatureQuery("Overpass response has no count element".to_string())
            })?;

        let total = element
            .tags
            .get("total")
            .ok_or_else(|| Error::FeatureQuery("Overpass count has no total".to_string()))?;

        total
            .parse()
            .map_err(|_| Error::FeatureQuery(format!("Invalid Overpass total: {}", total)))
    }
}

/// Overpass QL tag selector, e.g. `["amenity"~"^(cafe|bar)$"]`
fn tag_selector(filter: &TagFilter) -> String {
    match filter.values {
        TagValues::Any => format!("[\"{}\"]", filter.key),
        TagValues::OneOf(values) => format!("[\"{}\"~\"^({})$\"]", filter.key, values.join("|")),
    }
}

impl FeatureSource for OverpassBackend {
    async fn count(&self, center: Coordinates, radius: u32, category: Category) -> Result<u32> {
        let query = Self::build_query(center, radius, category);
        let url = format!("{}?data={}", self.url, urlencoding::encode(&query));
        debug!("Overpass {} query around {} (r={}m)", category, center, radius);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::FeatureQuery(format!("Overpass request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::FeatureQuery(format!(
                "Overpass returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::FeatureQuery(format!("Failed to read Overpass response: {}", e)))?;

        Self::parse_count(&body)
    }
}
