//! Collaborator abstractions for search, answer generation, and blob access
//!
//! The orchestration core only talks to external systems through these
//! traits, so backends can be swapped without touching the pipeline.

pub mod blob;
pub mod blob_gateway;
pub mod generation;
pub mod http_search;
pub mod ollama;
pub mod search;

pub use blob::BlobLinkProvider;
pub use blob_gateway::BlobGateway;
pub use generation::GenerationProvider;
pub use http_search::HttpSearchClient;
pub use ollama::OllamaGenerator;
pub use search::{SearchHit, SearchProvider};
