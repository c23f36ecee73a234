//! API routes for the chat server

pub mod chat;
pub mod citation;
pub mod indexes;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_body_size: usize) -> Router<AppState> {
    Router::new()
        // Index discovery
        .route("/list_indexes", get(indexes::list_indexes))
        // Citation document links
        .route("/get_citation_doc", post(citation::get_citation_doc))
        // Grounded chat (SSE)
        .route("/chat", post(chat::chat))
        .route("/multiindex_chat", post(chat::multiindex_chat))
        // Request bodies are JSON only, keep them small
        .layer(DefaultBodyLimit::max(max_body_size))
}
