//! Ollama-compatible streaming generation client
//!
//! Consumes the NDJSON `/api/generate` stream and yields raw text chunks.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use crate::providers::generation::GenerationProvider;

/// Ollama API client for streamed answer generation
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

impl OllamaGenerator {
    /// Create a new generation client
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(2)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl GenerationProvider for OllamaGenerator {
    async fn generate_stream(&self, prompt: &str) -> Result<BoxStream<'static, Result<String>>> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: true,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::unavailable(format!("Generation request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::backend(format!(
                "Generation failed: HTTP {} - {}",
                status, body
            )));
        }

        // NDJSON lines can split across transport chunks; carry the tail over.
        let stream = response.bytes_stream().scan(String::new(), |buffer, chunk| {
            let item = match chunk {
                Ok(bytes) => {
                    buffer.push_str(&String::from_utf8_lossy(&bytes));
                    let mut output = String::new();
                    while let Some(newline) = buffer.find('\n') {
                        let line: String = buffer.drain(..=newline).collect();
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<StreamChunk>(line) {
                            Ok(parsed) => {
                                output.push_str(&parsed.response);
                                if parsed.done {
                                    buffer.clear();
                                }
                            }
                            Err(e) => {
                                return futures_util::future::ready(Some(Err(Error::backend(
                                    format!("Malformed stream line: {}", e),
                                ))));
                            }
                        }
                    }
                    Ok(output)
                }
                Err(e) => Err(Error::unavailable(format!("Stream error: {}", e))),
            };
            futures_util::future::ready(Some(item))
        });

        // Skip chunks that completed no full line yet.
        let stream = stream.filter(|item| {
            futures_util::future::ready(!matches!(item, Ok(text) if text.is_empty()))
        });

        Ok(stream.boxed())
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
