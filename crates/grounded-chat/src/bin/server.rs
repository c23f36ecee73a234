//! Grounded chat server binary
//!
//! Run with: cargo run -p grounded-chat --bin grounded-chat-server

use grounded_chat::{config::ChatConfig, server::ChatServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grounded_chat=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration: explicit path via GROUNDED_CHAT_CONFIG, else defaults
    let config = match std::env::var("GROUNDED_CHAT_CONFIG") {
        Ok(path) => {
            tracing::info!("Loading configuration from {}", path);
            ChatConfig::from_file(&path)?
        }
        Err(_) => ChatConfig::default(),
    };

    tracing::info!("Configuration loaded");
    tracing::info!("  - Search backend: {}", config.search.base_url);
    tracing::info!("  - Generation model: {}", config.generation.model);
    tracing::info!("  - Blob container: {}", config.storage.container);
    tracing::info!("  - Context budget: {} bytes", config.context.budget_bytes);

    let server = ChatServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  GET  /list_indexes     - List search indexes");
    println!("  POST /chat             - Ask a grounded question (SSE)");
    println!("  POST /multiindex_chat  - Ask across several indexes (SSE)");
    println!("  POST /get_citation_doc - Resolve a citation into a download link");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
