//! Chat request/response types and streamed answer fragments

use serde::{Deserialize, Serialize};

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One prior conversation turn, owned by the caller and passed in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

/// POST /chat request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Index to ground the answer in; must be currently listed
    pub index_name: String,
    /// The user's question
    pub query: String,
    /// Prior turns, oldest first
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    /// Number of grounding items to retrieve (clamped to the configured max)
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// POST /multiindex_chat request body
///
/// Grounds one question across several indexes; retrieval results are
/// merged into a single ranking before context assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiChatRequest {
    /// Indexes to ground the answer in; each must be currently listed
    pub index_names: Vec<String>,
    /// The user's question
    pub query: String,
    /// Prior turns, oldest first
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    /// Number of grounding items to retrieve overall (clamped to the
    /// configured max)
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Inline pointer from answer text back to a grounded source document
///
/// `display_index` is assigned in first-seen order within one answer;
/// repeated citations of the same document reuse the same index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationReference {
    pub source_document: String,
    pub display_index: usize,
}

/// One streamed unit of the answer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum AnswerFragment {
    /// A piece of answer text, optionally carrying the citation it introduces
    Delta {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        citation: Option<CitationReference>,
    },
    /// Terminal failure; already-emitted deltas are not retracted
    Error { kind: String, message: String },
    /// Generation finished normally
    Done,
}

impl AnswerFragment {
    /// Plain text delta with no citation
    pub fn text(text: impl Into<String>) -> Self {
        Self::Delta {
            text: text.into(),
            citation: None,
        }
    }

    /// Delta that introduces (or repeats) a citation
    pub fn cited(text: impl Into<String>, citation: CitationReference) -> Self {
        Self::Delta {
            text: text.into(),
            citation: Some(citation),
        }
    }
}
