//! Application state for the chat server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::ChatConfig;
use crate::error::Result;
use crate::orchestrator::ChatOrchestrator;
use crate::providers::{
    BlobGateway, BlobLinkProvider, GenerationProvider, HttpSearchClient, OllamaGenerator,
    SearchProvider,
};
use crate::registry::IndexRegistry;
use crate::resolver::CitationResolver;
use crate::retrieval::GroundingRetriever;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: ChatConfig,
    /// Index catalog with its single-flight listing cache
    registry: Arc<IndexRegistry>,
    /// Chat pipeline
    orchestrator: ChatOrchestrator,
    /// Citation filename to signed-link resolver
    resolver: CitationResolver,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create new application state with HTTP-backed providers
    pub fn new(config: ChatConfig) -> Result<Self> {
        tracing::info!("Initializing chat application state...");

        let search: Arc<dyn SearchProvider> = Arc::new(HttpSearchClient::new(&config.search)?);
        tracing::info!("Search client initialized ({})", config.search.base_url);

        let generator: Arc<dyn GenerationProvider> =
            Arc::new(OllamaGenerator::new(&config.generation)?);
        tracing::info!(
            "Generation client initialized (model: {})",
            config.generation.model
        );

        let blobs: Arc<dyn BlobLinkProvider> = Arc::new(BlobGateway::new(&config.storage)?);
        tracing::info!(
            "Blob gateway initialized (container: {})",
            config.storage.container
        );

        Self::with_providers(config, search, generator, blobs)
    }

    /// Create state over explicit providers. Used by tests and embedders
    /// that bring their own backends.
    pub fn with_providers(
        config: ChatConfig,
        search: Arc<dyn SearchProvider>,
        generator: Arc<dyn GenerationProvider>,
        blobs: Arc<dyn BlobLinkProvider>,
    ) -> Result<Self> {
        let registry = Arc::new(IndexRegistry::new(Arc::clone(&search), &config.registry));
        let retriever = Arc::new(GroundingRetriever::new(search, &config.search));
        let orchestrator =
            ChatOrchestrator::new(Arc::clone(&registry), retriever, generator, &config);
        let resolver = CitationResolver::new(blobs, &config.storage);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                registry,
                orchestrator,
                resolver,
                ready: RwLock::new(true),
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &ChatConfig {
        &self.inner.config
    }

    /// Get the index registry
    pub fn registry(&self) -> &Arc<IndexRegistry> {
        &self.inner.registry
    }

    /// Get the chat orchestrator
    pub fn orchestrator(&self) -> &ChatOrchestrator {
        &self.inner.orchestrator
    }

    /// Get the citation resolver
    pub fn resolver(&self) -> &CitationResolver {
        &self.inner.resolver
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
