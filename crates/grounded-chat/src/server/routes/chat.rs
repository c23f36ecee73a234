//! Grounded chat endpoints (SSE)

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{AnswerFragment, ChatRequest, MultiChatRequest};

type FragmentSse = Sse<BoxStream<'static, std::result::Result<Event, axum::Error>>>;

/// POST /chat - answer a grounded question as a stream of SSE events
///
/// Validation and retrieval failures surface as plain HTTP errors before
/// any event is sent; once the stream starts, failures arrive as terminal
/// `error` events. Client disconnects cancel the generation task.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<FragmentSse> {
    let request_id = uuid::Uuid::new_v4();
    tracing::info!(
        "Chat {}: \"{}\" against index '{}'",
        request_id,
        request.query,
        request.index_name
    );

    let cancel = CancellationToken::new();
    let rx = state.orchestrator().answer(request, cancel.clone()).await?;
    Ok(into_sse(rx, cancel))
}

/// POST /multiindex_chat - one question grounded across several indexes
pub async fn multiindex_chat(
    State(state): State<AppState>,
    Json(request): Json<MultiChatRequest>,
) -> Result<FragmentSse> {
    let request_id = uuid::Uuid::new_v4();
    tracing::info!(
        "Multi-index chat {}: \"{}\" against {} index(es)",
        request_id,
        request.query,
        request.index_names.len()
    );

    let cancel = CancellationToken::new();
    let rx = state
        .orchestrator()
        .answer_multi(request, cancel.clone())
        .await?;
    Ok(into_sse(rx, cancel))
}

fn into_sse(
    rx: mpsc::Receiver<AnswerFragment>,
    cancel: CancellationToken,
) -> FragmentSse {
    // Dropping the response body (client gone) drops the guard, which
    // cancels generation instead of letting it run to completion unread.
    let guard = cancel.drop_guard();
    let stream = ReceiverStream::new(rx)
        .map(move |fragment| {
            let _keep_alive = &guard;
            Event::default().json_data(&fragment)
        })
        .boxed();

    Sse::new(stream).keep_alive(KeepAlive::default())
}
