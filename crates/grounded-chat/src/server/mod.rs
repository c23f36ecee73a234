//! HTTP server for the grounded chat service

pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ChatConfig;
use crate::error::Result;
use state::AppState;

/// Grounded chat HTTP server
pub struct ChatServer {
    config: ChatConfig,
    state: AppState,
}

impl ChatServer {
    /// Create a new chat server
    pub fn new(config: ChatConfig) -> Result<Self> {
        let state = AppState::new(config.clone())?;
        Ok(Self { config, state })
    }

    /// Create a server over pre-built state. Used by tests.
    pub fn with_state(config: ChatConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            // Health check
            .route("/health", get(health_check))
            .route("/ready", get(readiness))
            .merge(routes::api_routes(self.config.server.max_body_size))
            .with_state(self.state.clone())
            // Middleware layers (order matters - applied bottom to top)
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new());

        if self.config.server.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router = router.layer(cors);
        }

        router
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.server.host, self.config.server.port)
            .parse()
            .map_err(|e| crate::error::Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.build_router();

        tracing::info!("Starting grounded chat server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| crate::error::Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| crate::error::Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint
async fn readiness(state: axum::extract::State<AppState>) -> axum::http::StatusCode {
    if state.is_ready() {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::providers::search::{SearchHit, SearchProvider};
    use crate::providers::{BlobLinkProvider, GenerationProvider};
    use crate::types::{IndexDescriptor, SignedDownloadLink};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use futures_util::stream::BoxStream;
    use futures_util::StreamExt;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    struct StubSearch {
        catalog_up: bool,
    }

    #[async_trait]
    impl SearchProvider for StubSearch {
        async fn list_indexes(&self) -> Result<Vec<IndexDescriptor>> {
            if self.catalog_up {
                Ok(vec![IndexDescriptor::new("docs-2024")])
            } else {
                Err(Error::unavailable("catalog down"))
            }
        }

        async fn query(&self, _: &str, _: &str, _: usize) -> Result<Vec<SearchHit>> {
            Ok(vec![])
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    struct StubGenerator;

    #[async_trait]
    impl GenerationProvider for StubGenerator {
        async fn generate_stream(
            &self,
            _prompt: &str,
        ) -> Result<BoxStream<'static, Result<String>>> {
            Ok(futures_util::stream::iter(vec![Ok("Answer.".to_string())]).boxed())
        }

        fn name(&self) -> &str {
            "stub"
        }

        fn model(&self) -> &str {
            "stub-model"
        }
    }

    struct StubBlobs;

    #[async_trait]
    impl BlobLinkProvider for StubBlobs {
        async fn exists(&self, object_name: &str) -> Result<bool> {
            Ok(object_name == "report.pdf")
        }

        async fn sign_download(
            &self,
            object_name: &str,
            ttl: Duration,
        ) -> Result<SignedDownloadLink> {
            Ok(SignedDownloadLink {
                url: format!("https://blobs.test/{}?sig=abc", object_name),
                expires_at: Utc::now()
                    + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero()),
            })
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn server(catalog_up: bool) -> ChatServer {
        let config = ChatConfig::default();
        let state = AppState::with_providers(
            config.clone(),
            Arc::new(StubSearch { catalog_up }),
            Arc::new(StubGenerator),
            Arc::new(StubBlobs),
        )
        .unwrap();
        ChatServer::with_state(config, state)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn list_indexes_responds_ok() {
        let response = server(true)
            .build_router()
            .oneshot(get("/list_indexes"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn catalog_outage_maps_to_service_unavailable() {
        let response = server(false)
            .build_router()
            .oneshot(get("/list_indexes"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn missing_citation_doc_maps_to_not_found() {
        let response = server(true)
            .build_router()
            .oneshot(post_json("/get_citation_doc", r#"{"fileName":"absent.pdf"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn traversal_citation_name_maps_to_bad_request() {
        let response = server(true)
            .build_router()
            .oneshot(post_json(
                "/get_citation_doc",
                r#"{"fileName":"../secret"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn existing_citation_doc_responds_ok() {
        let response = server(true)
            .build_router()
            .oneshot(post_json("/get_citation_doc", r#"{"fileName":"report.pdf"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_follows_state() {
        let server = server(true);
        server.state.set_ready(false);
        let response = server
            .build_router()
            .oneshot(get("/ready"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        server.state.set_ready(true);
        let response = server.build_router().oneshot(get("/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn chat_with_unknown_index_maps_to_bad_request() {
        let response = server(true)
            .build_router()
            .oneshot(post_json(
                "/chat",
                r#"{"indexName":"missing-index","query":"q"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn multiindex_chat_route_is_wired() {
        let response = server(true)
            .build_router()
            .oneshot(post_json(
                "/multiindex_chat",
                r#"{"indexNames":["docs-2024"],"query":"q"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
