//! grounded-chat: Retrieval-augmented chat orchestration with verifiable citations
//!
//! This crate sits between a client, a search backend, an answer-generation
//! backend, and a blob gateway. It discovers search indexes, grounds each
//! question in retrieved passages, streams the generated answer with inline
//! numbered citations, and resolves cited filenames into short-lived signed
//! download links.

pub mod config;
pub mod context;
pub mod error;
pub mod generation;
pub mod orchestrator;
pub mod providers;
pub mod registry;
pub mod resolver;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::ChatConfig;
pub use error::{Error, Result};
pub use orchestrator::ChatOrchestrator;
pub use types::{
    chat::{AnswerFragment, ChatRequest, ChatTurn, CitationReference, MultiChatRequest},
    grounding::{ContextBundle, GroundingContent, GroundingItem},
    index::IndexDescriptor,
    link::SignedDownloadLink,
};
