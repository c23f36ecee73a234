//! Request-scoped value objects shared across the orchestration pipeline

pub mod chat;
pub mod grounding;
pub mod index;
pub mod link;

pub use chat::{AnswerFragment, ChatRequest, ChatTurn, CitationReference, MultiChatRequest, TurnRole};
pub use grounding::{ContextBundle, GroundingContent, GroundingItem};
pub use index::IndexDescriptor;
pub use link::SignedDownloadLink;
