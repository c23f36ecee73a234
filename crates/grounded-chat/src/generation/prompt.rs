//! Prompt templates for grounded answer generation
//!
//! Wire convention: the model is instructed to cite a source by emitting
//! `[doc:<filename>]` directly after the claim it supports. The orchestrator
//! rewrites these markers into numbered citation references; markers naming
//! documents outside the grounding context are dropped.

use crate::types::{ChatTurn, ContextBundle, GroundingContent, TurnRole};

/// Prompt builder for grounded chat
pub struct PromptBuilder;

impl PromptBuilder {
    /// Render the grounding context section from an assembled bundle
    pub fn build_context(bundle: &ContextBundle) -> String {
        let mut context = String::new();

        for item in &bundle.items {
            match &item.content {
                GroundingContent::Text(text) => {
                    context.push_str(&format!(
                        "[{}] {}\n\n{}\n\n---\n\n",
                        item.rank, item.source_document, text
                    ));
                }
                GroundingContent::ImageReference(image) => {
                    context.push_str(&format!(
                        "[{}] {} (image: {})\n\n---\n\n",
                        item.rank, item.source_document, image
                    ));
                }
            }
        }

        context
    }

    /// Build the full chat prompt: grounding rules, context, history, question
    pub fn build_chat_prompt(
        query: &str,
        history: &[ChatTurn],
        bundle: &ContextBundle,
    ) -> String {
        let context = if bundle.is_empty() {
            "(no grounding documents were retrieved for this question)".to_string()
        } else {
            Self::build_context(bundle)
        };

        format!(
            r#"You are a document-grounded assistant that ONLY uses information from provided documents.

GROUNDING RULES:
1. ONLY use information that is EXPLICITLY stated in the CONTEXT below
2. If the answer is not in the context, say so plainly instead of guessing
3. NEVER use external knowledge, general knowledge, or training data
4. Cite the supporting document after each claim with exactly this token: [doc:filename]
   Example: The refund window is 30 days [doc:policy.pdf].
5. Only cite filenames that appear in the CONTEXT section

CONTEXT FROM DOCUMENTS:
{context}
CONVERSATION SO FAR:
{history}
QUESTION: {query}

Provide a grounded answer using ONLY the document content above:"#,
            context = context,
            history = Self::format_history(history),
            query = query,
        )
    }

    fn format_history(history: &[ChatTurn]) -> String {
        if history.is_empty() {
            return "(none)\n".to_string();
        }
        let mut out = String::new();
        for turn in history {
            let role = match turn.role {
                TurnRole::User => "User",
                TurnRole::Assistant => "Assistant",
            };
            out.push_str(&format!("{}: {}\n", role, turn.content));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GroundingItem, TurnRole};

    #[test]
    fn context_lists_rank_and_provenance() {
        let bundle = ContextBundle {
            items: vec![GroundingItem {
                id: "g1".to_string(),
                source_document: "policy.pdf".to_string(),
                content: GroundingContent::Text("Refunds within 30 days.".to_string()),
                score: 0.9,
                rank: 1,
            }],
            total_size_estimate: 23,
            truncated: false,
        };
        let context = PromptBuilder::build_context(&bundle);
        assert!(context.contains("[1] policy.pdf"));
        assert!(context.contains("Refunds within 30 days."));
    }

    #[test]
    fn empty_bundle_still_produces_a_prompt() {
        let prompt = PromptBuilder::build_chat_prompt("What is the policy?", &[], &ContextBundle::default());
        assert!(prompt.contains("no grounding documents"));
        assert!(prompt.contains("What is the policy?"));
    }

    #[test]
    fn history_is_rendered_in_order() {
        let history = vec![
            ChatTurn {
                role: TurnRole::User,
                content: "Hi".to_string(),
            },
            ChatTurn {
                role: TurnRole::Assistant,
                content: "Hello".to_string(),
            },
        ];
        let prompt = PromptBuilder::build_chat_prompt("q", &history, &ContextBundle::default());
        let user_pos = prompt.find("User: Hi").unwrap();
        let assistant_pos = prompt.find("Assistant: Hello").unwrap();
        assert!(user_pos < assistant_pos);
    }
}
