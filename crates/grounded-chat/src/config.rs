//! Configuration for the chat orchestration service

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Search backend configuration
    #[serde(default)]
    pub search: SearchConfig,
    /// Answer-generation backend configuration
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Blob gateway / signed link configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Grounding context configuration
    #[serde(default)]
    pub context: ContextConfig,
    /// Index listing cache configuration
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl ChatConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_body_size: 1024 * 1024, // 1MB, requests are JSON only
        }
    }
}

/// Search backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search service base URL
    pub base_url: String,
    /// API key sent as a bearer token (empty = anonymous)
    #[serde(default)]
    pub api_key: String,
    /// Maximum results a single retrieval may request
    pub max_top_k: usize,
    /// Default results per retrieval
    pub default_top_k: usize,
    /// Per-call timeout in seconds (catalog and query)
    pub timeout_secs: u64,
    /// Backoff before the single transport retry, in milliseconds
    pub retry_backoff_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9200".to_string(),
            api_key: String::new(),
            max_top_k: 50,
            default_top_k: 10,
            timeout_secs: 15,
            retry_backoff_ms: 250,
        }
    }
}

/// Answer-generation backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Generation service base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Per-call timeout in seconds (covers the whole stream)
    pub timeout_secs: u64,
    /// Bound on buffered, unconsumed answer fragments
    pub stream_buffer: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            temperature: 0.2, // low, answers must stay close to the grounding
            timeout_secs: 120,
            stream_buffer: 32,
        }
    }
}

/// Blob gateway and signed download link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Blob gateway base URL (object existence checks and downloads)
    pub base_url: String,
    /// Container holding the grounding corpus documents
    pub container: String,
    /// HMAC signing key, base64url (demo default, override in production)
    pub signing_key: String,
    /// Link validity window in seconds (default: 10 minutes)
    pub link_ttl_secs: u64,
    /// Hard upper bound on the validity window in seconds (default: 15 minutes)
    pub max_link_ttl_secs: u64,
    /// Per-call timeout in seconds for existence checks
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000".to_string(),
            container: "grounding-docs".to_string(),
            signing_key: "ZGV2LW9ubHktc2lnbmluZy1rZXk".to_string(),
            link_ttl_secs: 600,
            max_link_ttl_secs: 900,
            timeout_secs: 10,
        }
    }
}

/// Grounding context configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Context budget in bytes of grounding content per request
    pub budget_bytes: usize,
    /// Size charged for an image reference when packing the budget
    pub image_charge_bytes: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            budget_bytes: 24 * 1024, // fits comfortably in a 4k-token window
            image_charge_bytes: 4096,
        }
    }
}

/// Index listing cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Cached catalog listing lifetime in seconds
    pub refresh_interval_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ChatConfig::default();
        assert!(config.storage.link_ttl_secs <= config.storage.max_link_ttl_secs);
        assert!(config.search.default_top_k <= config.search.max_top_k);
        assert!(config.context.budget_bytes > 0);
    }

    #[test]
    fn parses_partial_toml() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 3000
            enable_cors = false
            max_body_size = 65536

            [registry]
            refresh_interval_secs = 5
        "#;
        let config: ChatConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.registry.refresh_interval_secs, 5);
        // untouched sections fall back to defaults
        assert_eq!(config.search.max_top_k, 50);
    }
}
