//! Prompt assembly and citation-marker handling for answer generation

pub mod citation;
pub mod prompt;

pub use citation::CitationScanner;
pub use prompt::PromptBuilder;
