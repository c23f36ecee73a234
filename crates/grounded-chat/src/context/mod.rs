//! Context assembler: greedy, rank-ordered packing into a size budget

use crate::config::ContextConfig;
use crate::types::{ContextBundle, GroundingItem};

/// Selects retrieved items into a size-bounded prompt context
///
/// Greedy in rank order: the first item that would exceed the budget stops
/// selection, items are included whole or not at all, and order is never
/// changed. This keeps the relationship between retrieval rank and inclusion
/// auditable, which citation traceability depends on.
pub struct ContextAssembler {
    image_charge: usize,
}

impl ContextAssembler {
    /// Create an assembler with the configured image charge
    pub fn new(config: &ContextConfig) -> Self {
        Self {
            image_charge: config.image_charge_bytes,
        }
    }

    /// Pack `items` into a bundle whose size estimate stays within `budget`
    ///
    /// Deterministic for a given input sequence and budget. Empty input
    /// yields an empty, non-truncated bundle.
    pub fn assemble(&self, items: Vec<GroundingItem>, budget: usize) -> ContextBundle {
        let mut selected = Vec::new();
        let mut total = 0usize;
        let mut truncated = false;

        for item in items {
            let size = item.size_estimate(self.image_charge);
            if total + size > budget {
                truncated = true;
                break;
            }
            total += size;
            selected.push(item);
        }

        if truncated {
            tracing::debug!(
                "Context truncated: kept {} items ({} bytes) within budget {}",
                selected.len(),
                total,
                budget
            );
        }

        ContextBundle {
            items: selected,
            total_size_estimate: total,
            truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GroundingContent;

    fn assembler() -> ContextAssembler {
        ContextAssembler::new(&ContextConfig {
            budget_bytes: 0, // unused, budget is passed per call
            image_charge_bytes: 100,
        })
    }

    fn item(doc: &str, rank: usize, len: usize) -> GroundingItem {
        GroundingItem {
            id: format!("g{}", rank),
            source_document: doc.to_string(),
            content: GroundingContent::Text("x".repeat(len)),
            score: 1.0 / rank as f32,
            rank,
        }
    }

    #[test]
    fn empty_input_yields_empty_untruncated_bundle() {
        let bundle = assembler().assemble(vec![], 1000);
        assert!(bundle.is_empty());
        assert_eq!(bundle.total_size_estimate, 0);
        assert!(!bundle.truncated);
    }

    #[test]
    fn estimate_never_exceeds_budget() {
        let items = vec![item("a", 1, 400), item("b", 2, 400), item("c", 3, 400)];
        let bundle = assembler().assemble(items, 1000);
        assert!(bundle.total_size_estimate <= 1000);
        assert_eq!(bundle.items.len(), 2);
        assert!(bundle.truncated);
    }

    #[test]
    fn truncated_iff_an_item_was_excluded() {
        let fits = assembler().assemble(vec![item("a", 1, 400), item("b", 2, 400)], 1000);
        assert!(!fits.truncated);

        let exact = assembler().assemble(vec![item("a", 1, 500), item("b", 2, 500)], 1000);
        assert!(!exact.truncated);
        assert_eq!(exact.total_size_estimate, 1000);
    }

    #[test]
    fn selection_stops_at_first_overflow_and_keeps_order() {
        // the third item would fit in the remaining budget, but selection
        // already stopped at the second: no best-fit repacking
        let items = vec![item("a", 1, 600), item("b", 2, 500), item("c", 3, 100)];
        let bundle = assembler().assemble(items, 1000);
        let kept: Vec<&str> = bundle
            .items
            .iter()
            .map(|i| i.source_document.as_str())
            .collect();
        assert_eq!(kept, vec!["a"]);
        assert!(bundle.truncated);
    }

    #[test]
    fn image_references_use_fixed_charge() {
        let image = GroundingItem {
            id: "g1".to_string(),
            source_document: "deck.pdf".to_string(),
            content: GroundingContent::ImageReference("deck.pdf/fig.png".to_string()),
            score: 0.9,
            rank: 1,
        };
        let bundle = assembler().assemble(vec![image], 1000);
        assert_eq!(bundle.total_size_estimate, 100);
    }
}
