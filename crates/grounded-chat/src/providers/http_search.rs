//! HTTP search service client
//!
//! Speaks a small JSON API: `GET /indexes` for the catalog and
//! `POST /indexes/{name}/query` for ranked queries.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::providers::search::{SearchHit, SearchProvider};
use crate::types::{GroundingContent, IndexDescriptor};

/// Client for a JSON search service
pub struct HttpSearchClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct CatalogResponse {
    /// Total catalog size as reported by the backend
    count: usize,
    indexes: Vec<CatalogEntry>,
}

#[derive(Deserialize)]
struct CatalogEntry {
    name: String,
    #[serde(default)]
    display_label: Option<String>,
}

#[derive(serde::Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    top: usize,
}

#[derive(Deserialize)]
struct QueryResponse {
    results: Vec<QueryHit>,
}

#[derive(Deserialize)]
struct QueryHit {
    #[serde(default)]
    ref_id: Option<String>,
    document: String,
    score: f32,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    image_ref: Option<String>,
}

impl HttpSearchClient {
    /// Create a new search client
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.api_key)
        }
    }
}

#[async_trait]
impl SearchProvider for HttpSearchClient {
    async fn list_indexes(&self) -> Result<Vec<IndexDescriptor>> {
        let url = format!("{}/indexes", self.base_url);

        let response = self
            .request(self.client.get(&url))
            .send()
            .await
            .map_err(|e| Error::unavailable(format!("Catalog request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::backend(format!(
                "Catalog call returned HTTP {}",
                response.status()
            )));
        }

        let catalog: CatalogResponse = response
            .json()
            .await
            .map_err(|e| Error::backend(format!("Malformed catalog response: {}", e)))?;

        // A count that disagrees with the entries means the backend truncated
        // the listing; clients validate queries against it, so reject it.
        if catalog.count != catalog.indexes.len() {
            return Err(Error::backend(format!(
                "Partial catalog response: {} of {} entries",
                catalog.indexes.len(),
                catalog.count
            )));
        }

        Ok(catalog
            .indexes
            .into_iter()
            .map(|e| match e.display_label {
                Some(label) => IndexDescriptor::with_label(e.name, label),
                None => IndexDescriptor::new(e.name),
            })
            .collect())
    }

    async fn query(&self, index_name: &str, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        let url = format!("{}/indexes/{}/query", self.base_url, index_name);

        let response = self
            .request(self.client.post(&url))
            .json(&QueryRequest { query, top: top_k })
            .send()
            .await
            .map_err(|e| Error::unavailable(format!("Query request failed: {}", e)))?;

        match response.status() {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::QueryError(format!(
                    "Search backend rejected query: {}",
                    body
                )));
            }
            status if !status.is_success() => {
                return Err(Error::backend(format!("Query returned HTTP {}", status)));
            }
            _ => {}
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::backend(format!("Malformed query response: {}", e)))?;

        let mut hits = Vec::with_capacity(parsed.results.len());
        for hit in parsed.results {
            let content = match (hit.text, hit.image_ref) {
                (Some(text), _) => GroundingContent::Text(text),
                (None, Some(image)) => GroundingContent::ImageReference(image),
                (None, None) => {
                    return Err(Error::backend(format!(
                        "Hit for '{}' carries neither text nor image content",
                        hit.document
                    )));
                }
            };
            hits.push(SearchHit {
                ref_id: hit.ref_id,
                source_document: hit.document,
                content,
                score: hit.score,
            });
        }

        Ok(hits)
    }

    fn name(&self) -> &str {
        "http-search"
    }
}
