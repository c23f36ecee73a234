//! Index discovery endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;

/// GET /list_indexes - list the names of the available search indexes
pub async fn list_indexes(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let indexes = state.registry().list_indexes().await?;
    tracing::debug!("Listing {} indexes", indexes.len());
    Ok(Json(indexes.into_iter().map(|i| i.name).collect()))
}
