//! Citation document link endpoint

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::SignedDownloadLink;

/// POST /get_citation_doc request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationDocRequest {
    pub file_name: String,
}

/// POST /get_citation_doc - resolve a cited filename into a signed link
pub async fn get_citation_doc(
    State(state): State<AppState>,
    Json(request): Json<CitationDocRequest>,
) -> Result<Json<SignedDownloadLink>> {
    tracing::info!("Citation doc requested: \"{}\"", request.file_name);
    let link = state.resolver().resolve(&request.file_name).await?;
    Ok(Json(link))
}
