//! Chat orchestrator: the per-request pipeline from question to
//! citation-carrying answer stream
//!
//! Each request runs as an independent, cancellable unit of work. States:
//! Validating -> Retrieving -> Assembling -> Generating -> Completed/Failed.
//! Validation, retrieval, and assembly run before the stream is handed to
//! the caller, so their failures surface as plain errors; only generation
//! is long-running and fails mid-stream via a terminal error fragment.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use futures_util::StreamExt;

use crate::config::ChatConfig;
use crate::context::ContextAssembler;
use crate::error::{Error, Result};
use crate::generation::{CitationScanner, PromptBuilder};
use crate::providers::GenerationProvider;
use crate::registry::IndexRegistry;
use crate::retrieval::GroundingRetriever;
use crate::types::{AnswerFragment, ChatRequest, ChatTurn, MultiChatRequest};

/// Top-level request handler for grounded chat
pub struct ChatOrchestrator {
    registry: Arc<IndexRegistry>,
    retriever: Arc<GroundingRetriever>,
    assembler: ContextAssembler,
    generator: Arc<dyn GenerationProvider>,
    context_budget: usize,
    default_top_k: usize,
    stream_buffer: usize,
}

impl ChatOrchestrator {
    /// Wire up the pipeline from its components
    pub fn new(
        registry: Arc<IndexRegistry>,
        retriever: Arc<GroundingRetriever>,
        generator: Arc<dyn GenerationProvider>,
        config: &ChatConfig,
    ) -> Self {
        Self {
            registry,
            retriever,
            assembler: ContextAssembler::new(&config.context),
            generator,
            context_budget: config.context.budget_bytes,
            default_top_k: config.search.default_top_k,
            stream_buffer: config.generation.stream_buffer.max(1),
        }
    }

    /// Answer a grounded chat request as a stream of fragments
    ///
    /// Returns an error for validation failures and for retrieval failures
    /// (with the originating kind); once a receiver is returned, failures
    /// append a terminal error fragment without retracting emitted output.
    /// Cancelling the token tears down generation and stops emission.
    pub async fn answer(
        &self,
        request: ChatRequest,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<AnswerFragment>> {
        self.run(
            vec![request.index_name],
            request.query,
            request.history,
            request.top_k,
            cancel,
        )
        .await
    }

    /// Answer a question grounded across several indexes
    ///
    /// Retrieval fans out to every named index; the merged ranking flows
    /// through the same assembly and generation pipeline as single-index
    /// chat.
    pub async fn answer_multi(
        &self,
        request: MultiChatRequest,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<AnswerFragment>> {
        if request.index_names.is_empty() {
            return Err(Error::invalid_argument("At least one index is required"));
        }
        self.run(
            request.index_names,
            request.query,
            request.history,
            request.top_k,
            cancel,
        )
        .await
    }

    async fn run(
        &self,
        index_names: Vec<String>,
        query: String,
        history: Vec<ChatTurn>,
        top_k: Option<usize>,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<AnswerFragment>> {
        // Validating
        let query = query.trim().to_string();
        if query.is_empty() {
            return Err(Error::invalid_argument("Query must not be empty"));
        }
        if cancel.is_cancelled() {
            return Err(Error::cancelled("Request torn down before retrieval"));
        }
        for index_name in &index_names {
            if !self.registry.contains(index_name).await? {
                return Err(Error::invalid_argument(format!(
                    "Unknown index '{}'",
                    index_name
                )));
            }
        }

        // Retrieving (cancellable; the retriever owns the one transport retry)
        let top_k = top_k.unwrap_or(self.default_top_k);
        let items = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(Error::cancelled("Request torn down during retrieval"))
            }
            items = self.retriever.retrieve_multi(&index_names, &query, top_k) => items?,
        };
        tracing::info!(
            "Retrieved {} grounding items from {} index(es) for request",
            items.len(),
            index_names.len()
        );

        // Assembling
        let bundle = self.assembler.assemble(items, self.context_budget);
        if bundle.is_empty() {
            // Ungrounded answer path: generation still runs, the prompt just
            // carries no context and every citation marker will be dropped.
            tracing::info!("No grounding selected; answering ungrounded");
        }

        // Generating, handed off to a task so the caller can consume at its
        // own pace; the bounded channel is the backpressure boundary.
        let prompt = PromptBuilder::build_chat_prompt(&query, &history, &bundle);
        let scanner = CitationScanner::new(&bundle);
        let generator = Arc::clone(&self.generator);
        let (tx, rx) = mpsc::channel(self.stream_buffer);

        tokio::spawn(async move {
            run_generation(generator, prompt, scanner, tx, cancel).await;
        });

        Ok(rx)
    }
}

async fn run_generation(
    generator: Arc<dyn GenerationProvider>,
    prompt: String,
    mut scanner: CitationScanner,
    tx: mpsc::Sender<AnswerFragment>,
    cancel: CancellationToken,
) {
    let stream = tokio::select! {
        _ = cancel.cancelled() => return,
        started = generator.generate_stream(&prompt) => started,
    };

    let mut stream = match stream {
        Ok(stream) => stream,
        Err(e) => {
            let _ = tx
                .send(AnswerFragment::Error {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                })
                .await;
            return;
        }
    };

    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => return,
            chunk = stream.next() => chunk,
        };

        match chunk {
            Some(Ok(text)) => {
                for fragment in scanner.push(&text) {
                    if !send_fragment(&tx, &cancel, fragment).await {
                        return;
                    }
                }
            }
            Some(Err(e)) => {
                // Already-emitted fragments stay with the client; append the
                // terminal error and stop.
                tracing::warn!("Generation failed mid-stream: {}", e);
                let _ = tx
                    .send(AnswerFragment::Error {
                        kind: e.kind().to_string(),
                        message: e.to_string(),
                    })
                    .await;
                return;
            }
            None => {
                if let Some(tail) = scanner.finish() {
                    if !send_fragment(&tx, &cancel, tail).await {
                        return;
                    }
                }
                let _ = tx.send(AnswerFragment::Done).await;
                return;
            }
        }
    }
}

/// Send one fragment, pausing when the caller is slow; false = stop emitting
async fn send_fragment(
    tx: &mpsc::Sender<AnswerFragment>,
    cancel: &CancellationToken,
    fragment: AnswerFragment,
) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        sent = tx.send(fragment) => sent.is_ok(),
    }
}
