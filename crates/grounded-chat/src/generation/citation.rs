//! Incremental citation-marker scanner
//!
//! Rewrites `[doc:<filename>]` markers in the generation stream into
//! numbered citation references without buffering the whole answer. Only a
//! potential marker prefix is ever held back, so text reaches the client as
//! soon as it cannot be part of a marker.

use std::collections::{HashMap, HashSet};

use crate::types::{AnswerFragment, CitationReference, ContextBundle};

const MARKER_PREFIX: &str = "[doc:";
// A marker longer than this is not a filename; stop withholding output.
const MAX_MARKER_LEN: usize = 512;

enum Viability {
    /// A full marker terminates at this byte offset of `]`
    Complete(usize),
    /// Could still become a marker with more input
    Partial,
    /// Cannot be a marker
    Not,
}

/// Streaming scanner that assigns display indexes in first-seen order
///
/// Markers naming documents absent from the grounding bundle are removed
/// from the output entirely; they cannot be resolved to a real link.
pub struct CitationScanner {
    known: HashSet<String>,
    display_order: Vec<String>,
    display_index: HashMap<String, usize>,
    pending: String,
}

impl CitationScanner {
    /// Create a scanner over the documents present in the bundle
    pub fn new(bundle: &ContextBundle) -> Self {
        Self {
            known: bundle
                .items
                .iter()
                .map(|i| i.source_document.clone())
                .collect(),
            display_order: Vec::new(),
            display_index: HashMap::new(),
            pending: String::new(),
        }
    }

    /// Feed a chunk of generated text, producing zero or more fragments
    pub fn push(&mut self, chunk: &str) -> Vec<AnswerFragment> {
        let mut buffer = std::mem::take(&mut self.pending);
        buffer.push_str(chunk);

        let mut fragments = Vec::new();
        let mut text = String::new();
        let mut rest = buffer.as_str();

        while !rest.is_empty() {
            let Some(pos) = rest.find('[') else {
                text.push_str(rest);
                break;
            };
            text.push_str(&rest[..pos]);
            let candidate = &rest[pos..];

            match Self::viability(candidate) {
                Viability::Complete(end) => {
                    let filename = &candidate[MARKER_PREFIX.len()..end];
                    if self.known.contains(filename) {
                        let reference = self.reference_for(filename);
                        text.push_str(&format!("[{}]", reference.display_index));
                        fragments.push(AnswerFragment::cited(
                            std::mem::take(&mut text),
                            reference,
                        ));
                    } else {
                        tracing::debug!("Dropping citation of ungrounded document '{}'", filename);
                    }
                    rest = &candidate[end + 1..];
                }
                Viability::Partial => {
                    self.pending = candidate.to_string();
                    rest = "";
                }
                Viability::Not => {
                    text.push('[');
                    rest = &candidate[1..];
                }
            }
        }

        if !text.is_empty() {
            fragments.push(AnswerFragment::text(text));
        }
        fragments
    }

    /// Flush a trailing incomplete marker as literal text at stream end
    pub fn finish(&mut self) -> Option<AnswerFragment> {
        let tail = std::mem::take(&mut self.pending);
        if tail.is_empty() {
            None
        } else {
            Some(AnswerFragment::text(tail))
        }
    }

    /// Citations assigned so far, in display order
    pub fn citations(&self) -> Vec<CitationReference> {
        self.display_order
            .iter()
            .enumerate()
            .map(|(i, doc)| CitationReference {
                source_document: doc.clone(),
                display_index: i + 1,
            })
            .collect()
    }

    fn reference_for(&mut self, filename: &str) -> CitationReference {
        let index = match self.display_index.get(filename) {
            Some(&index) => index,
            None => {
                let index = self.display_order.len() + 1;
                self.display_order.push(filename.to_string());
                self.display_index.insert(filename.to_string(), index);
                index
            }
        };
        CitationReference {
            source_document: filename.to_string(),
            display_index: index,
        }
    }

    fn viability(candidate: &str) -> Viability {
        if candidate.len() < MARKER_PREFIX.len() {
            return if MARKER_PREFIX.starts_with(candidate) {
                Viability::Partial
            } else {
                Viability::Not
            };
        }
        if !candidate.starts_with(MARKER_PREFIX) {
            return Viability::Not;
        }

        for (offset, ch) in candidate[MARKER_PREFIX.len()..].char_indices() {
            match ch {
                ']' => return Viability::Complete(MARKER_PREFIX.len() + offset),
                '[' | '\n' => return Viability::Not,
                _ => {}
            }
        }

        if candidate.len() > MAX_MARKER_LEN {
            Viability::Not
        } else {
            Viability::Partial
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GroundingContent, GroundingItem};

    fn bundle(docs: &[&str]) -> ContextBundle {
        ContextBundle {
            items: docs
                .iter()
                .enumerate()
                .map(|(i, doc)| GroundingItem {
                    id: format!("g{}", i + 1),
                    source_document: doc.to_string(),
                    content: GroundingContent::Text("passage".to_string()),
                    score: 1.0,
                    rank: i + 1,
                })
                .collect(),
            total_size_estimate: 0,
            truncated: false,
        }
    }

    fn render(fragments: &[AnswerFragment]) -> String {
        fragments
            .iter()
            .filter_map(|f| match f {
                AnswerFragment::Delta { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn known_marker_rewritten_with_display_index() {
        let mut scanner = CitationScanner::new(&bundle(&["policy.pdf"]));
        let fragments = scanner.push("Refunds take 30 days [doc:policy.pdf].");
        assert_eq!(render(&fragments), "Refunds take 30 days [1].");

        let cited = fragments
            .iter()
            .find_map(|f| match f {
                AnswerFragment::Delta {
                    citation: Some(c), ..
                } => Some(c.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(cited.source_document, "policy.pdf");
        assert_eq!(cited.display_index, 1);
    }

    #[test]
    fn repeated_citation_reuses_display_index() {
        let mut scanner = CitationScanner::new(&bundle(&["policy.pdf", "faq.md"]));
        let text = "A [doc:policy.pdf]. B [doc:faq.md]. C [doc:policy.pdf].";
        let fragments = scanner.push(text);
        assert_eq!(render(&fragments), "A [1]. B [2]. C [1].");
        assert_eq!(scanner.citations().len(), 2);
    }

    #[test]
    fn unknown_document_marker_is_dropped() {
        let mut scanner = CitationScanner::new(&bundle(&["policy.pdf"]));
        let fragments = scanner.push("Claim [doc:made-up.pdf]. Real [doc:policy.pdf].");
        assert_eq!(render(&fragments), "Claim . Real [1].");
        assert_eq!(scanner.citations().len(), 1);
    }

    #[test]
    fn marker_split_across_chunks_is_rewritten() {
        let mut scanner = CitationScanner::new(&bundle(&["policy.pdf"]));
        let mut out = String::new();
        for chunk in ["Refunds [do", "c:poli", "cy.pdf] apply."] {
            out.push_str(&render(&scanner.push(chunk)));
        }
        assert!(scanner.finish().is_none());
        assert_eq!(out, "Refunds [1] apply.");
    }

    #[test]
    fn literal_brackets_pass_through() {
        let mut scanner = CitationScanner::new(&bundle(&["policy.pdf"]));
        let fragments = scanner.push("See [1] and [note] and [doc:policy.pdf].");
        assert_eq!(render(&fragments), "See [1] and [note] and [1].");
    }

    #[test]
    fn trailing_incomplete_marker_flushed_at_finish() {
        let mut scanner = CitationScanner::new(&bundle(&["policy.pdf"]));
        let fragments = scanner.push("Truncated [doc:poli");
        assert_eq!(render(&fragments), "Truncated ");

        let tail = scanner.finish().unwrap();
        match tail {
            AnswerFragment::Delta { text, citation } => {
                assert_eq!(text, "[doc:poli");
                assert!(citation.is_none());
            }
            _ => panic!("expected delta"),
        }
    }

    #[test]
    fn newline_aborts_a_marker_attempt() {
        let mut scanner = CitationScanner::new(&bundle(&["policy.pdf"]));
        let mut out = String::new();
        out.push_str(&render(&scanner.push("odd [doc:first\nline] end")));
        if let Some(f) = scanner.finish() {
            out.push_str(&render(&[f]));
        }
        assert_eq!(out, "odd [doc:first\nline] end");
    }
}
