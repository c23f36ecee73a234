//! Retrieved grounding items and the size-bounded context bundle

use serde::{Deserialize, Serialize};

/// Content of a single retrieved item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum GroundingContent {
    /// A text passage from the source document
    Text(String),
    /// A reference to an extracted image associated with the document
    ImageReference(String),
}

/// One ranked retrieval result
///
/// Produced by the grounding retriever per query and discarded after one
/// orchestration cycle. `rank` is strictly increasing in descending `score`
/// order; `id` is unique within a single retrieval batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundingItem {
    /// Stable identifier within one retrieval batch
    pub id: String,
    /// Citation filename this item came from
    pub source_document: String,
    /// Passage text or image reference
    pub content: GroundingContent,
    /// Relevance score from the search backend
    pub score: f32,
    /// 1-based rank by descending score, ties first-seen
    pub rank: usize,
}

impl GroundingItem {
    /// Budget charge of this item when packing a context
    ///
    /// Text is charged by UTF-8 length; image references carry a fixed
    /// charge supplied by the caller since the bytes never enter the prompt.
    pub fn size_estimate(&self, image_charge: usize) -> usize {
        match &self.content {
            GroundingContent::Text(text) => text.len(),
            GroundingContent::ImageReference(_) => image_charge,
        }
    }
}

/// Rank-ordered, size-bounded selection of grounding items
///
/// `total_size_estimate` never exceeds the budget it was assembled under.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextBundle {
    /// Selected items in rank order
    pub items: Vec<GroundingItem>,
    /// Accumulated size estimate of the selected items
    pub total_size_estimate: usize,
    /// True iff at least one retrieved item was excluded
    pub truncated: bool,
}

impl ContextBundle {
    /// True when retrieval produced nothing usable
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a source document is represented in this bundle
    pub fn contains_document(&self, source_document: &str) -> bool {
        self.items.iter().any(|i| i.source_document == source_document)
    }
}
