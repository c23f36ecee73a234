//! Search backend provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{GroundingContent, IndexDescriptor};

/// One raw hit from the search backend, before rank assignment
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Backend-assigned reference id, if any
    pub ref_id: Option<String>,
    /// Filename of the source document (provenance for citations)
    pub source_document: String,
    /// Passage text or image reference
    pub content: GroundingContent,
    /// Relevance score, higher is better
    pub score: f32,
}

/// Trait for index enumeration and ranked query execution
///
/// Implementations:
/// - `HttpSearchClient`: JSON search service over HTTP
/// - test doubles in the retriever/orchestrator test modules
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Enumerate the index catalog
    ///
    /// A partial catalog response must surface as `BackendError`, never as
    /// a truncated success; clients validate query requests against it.
    async fn list_indexes(&self) -> Result<Vec<IndexDescriptor>>;

    /// Execute a ranked query against one index
    async fn query(&self, index_name: &str, query: &str, top_k: usize) -> Result<Vec<SearchHit>>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
