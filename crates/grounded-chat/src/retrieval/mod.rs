//! Grounding retriever: ranked queries mapped to provenance-carrying items

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::providers::search::{SearchHit, SearchProvider};
use crate::types::GroundingItem;

/// Executes grounded queries against a chosen index
pub struct GroundingRetriever {
    provider: Arc<dyn SearchProvider>,
    max_top_k: usize,
    retry_backoff: Duration,
}

impl GroundingRetriever {
    /// Create a retriever over the given search provider
    pub fn new(provider: Arc<dyn SearchProvider>, config: &SearchConfig) -> Self {
        Self {
            provider,
            max_top_k: config.max_top_k,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Retrieve up to `top_k` ranked grounding items from one index
    ///
    /// `top_k` is clamped to the configured maximum. Transient transport
    /// failures are retried exactly once after a bounded backoff; all other
    /// errors surface immediately with their originating kind.
    pub async fn retrieve(
        &self,
        index_name: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<GroundingItem>> {
        let top_k = self.bound_top_k(top_k);
        let hits = self.query_with_retry(index_name, query, top_k).await?;
        Ok(rank_hits(hits))
    }

    /// Retrieve across several indexes and merge into one ranking
    ///
    /// Each index is queried with the same clamped `top_k`; the combined
    /// hits are ranked by score as one batch and truncated back to `top_k`,
    /// so the overall best hits survive regardless of which index they came
    /// from. A failure against any index fails the whole retrieval.
    pub async fn retrieve_multi(
        &self,
        index_names: &[String],
        query: &str,
        top_k: usize,
    ) -> Result<Vec<GroundingItem>> {
        let top_k = self.bound_top_k(top_k);

        let mut combined = Vec::new();
        for index_name in index_names {
            combined.extend(self.query_with_retry(index_name, query, top_k).await?);
        }

        let mut items = rank_hits(combined);
        items.truncate(top_k);
        Ok(items)
    }

    // A configured maximum of zero still permits single-item retrievals.
    fn bound_top_k(&self, top_k: usize) -> usize {
        top_k.min(self.max_top_k).max(1)
    }

    async fn query_with_retry(
        &self,
        index_name: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        let hits = match self.provider.query(index_name, query, top_k).await {
            Ok(hits) => hits,
            Err(e) if e.is_transient() => {
                tracing::warn!(
                    "Transient retrieval failure on '{}', retrying once: {}",
                    index_name,
                    e
                );
                sleep(self.retry_backoff).await;
                self.provider.query(index_name, query, top_k).await?
            }
            Err(e) => return Err(e),
        };

        tracing::debug!(
            "Retrieved {} hits from '{}' via {}",
            hits.len(),
            index_name,
            self.provider.name()
        );

        Ok(hits)
    }
}

/// Assign ranks by descending score, ties broken by input order
///
/// A stable sort keeps first-seen hits ahead of equal-scored later ones, so
/// identical inputs always produce identical rankings. Item ids reuse the
/// backend's reference ids where present and unique, with positional
/// fallbacks otherwise.
fn rank_hits(hits: Vec<SearchHit>) -> Vec<GroundingItem> {
    let mut indexed: Vec<(usize, SearchHit)> = hits.into_iter().enumerate().collect();
    indexed.sort_by(|(_, a), (_, b)| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut seen = std::collections::HashSet::new();
    indexed
        .into_iter()
        .enumerate()
        .map(|(i, (position, hit))| {
            let rank = i + 1;
            let id = match hit.ref_id {
                Some(ref_id) if seen.insert(ref_id.clone()) => ref_id,
                _ => format!("g{}", position + 1),
            };
            GroundingItem {
                id,
                source_document: hit.source_document,
                content: hit.content,
                score: hit.score,
                rank,
            }
        })
        .collect()
}
