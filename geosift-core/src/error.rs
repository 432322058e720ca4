//! Error types.
//!
//! Per-message problems never show up here: a message either becomes a
//! record or a [`geosift_types::Rejection`]. These errors cover pipeline
//! construction, analyzer internals and the storage seam.

use std::path::PathBuf;

use geosift_types::ConfigError;

/// Failure to build a pipeline. Nothing can be processed after one of these.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid pipeline configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to compile {name} pattern: {source}")]
    Pattern {
        name: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("failed to load stopword list from {path}: {source}")]
    Stopwords {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read stopword list: {0}")]
    StopwordsRead(#[source] std::io::Error),
}

/// Failure raised by an analyzer while producing terms.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("analyzer failed: {0}")]
    Other(String),

    #[error("analyzer panicked: {0}")]
    Panicked(String),
}

/// Failure to hand a record to storage.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write record: {0}")]
    Io(#[from] std::io::Error),

    /// For sinks backed by a store that can refuse a record on its own terms.
    #[error("storage rejected record: {0}")]
    Rejected(String),
}
