//! Answer-generation provider trait

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::Result;

/// Trait for streamed, grounded answer generation
///
/// Implementations receive a fully assembled prompt (grounding context,
/// conversation history, and the question) and stream raw answer text that
/// may contain inline citation markers. Marker rewriting happens in the
/// orchestrator, not here.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Start a generation and stream raw text chunks as they are produced
    ///
    /// The stream ends when the backend signals completion; a mid-stream
    /// failure is surfaced as an `Err` item and terminates the stream.
    async fn generate_stream(&self, prompt: &str) -> Result<BoxStream<'static, Result<String>>>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model in use
    fn model(&self) -> &str;
}
