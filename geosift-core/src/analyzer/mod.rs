//! Text analysis stages.
//!
//! - **Normalizer**: collapses whitespace and checks the printable-ASCII gate
//! - **Cleanup**: strips URLs, mentions, entities and punctuation, in a fixed order
//! - **Tokenizer**: the analyzer capability and the default standard analyzer

pub mod cleanup;
pub mod normalizer;
pub mod tokenizer;

pub use cleanup::{Cleaner, CleanupStep};
pub use normalizer::{collapse_whitespace, is_printable_ascii};
pub use tokenizer::{Analyzer, StandardAnalyzer};
