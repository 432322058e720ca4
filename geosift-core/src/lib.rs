//! Inclusion filtering and text normalization for geotagged messages.
//!
//! A message is kept only if it is geotagged, declares the configured
//! author language, is printable US-ASCII after whitespace collapse, and
//! still has at least one long-enough term once URLs, mentions, entities
//! and punctuation are stripped.
//!
//! - [`analyzer`]: whitespace collapse, cleanup steps, the analyzer capability
//! - [`pipeline`]: [`NormalizationPipeline`], the accept/reject decision
//! - [`listener`]: feed callback glue and counters
//! - [`sink`]: where accepted records go

pub mod analyzer;
pub mod error;
pub mod listener;
pub mod pipeline;
pub mod sink;

pub use analyzer::{Analyzer, StandardAnalyzer};
pub use error::{AnalyzerError, PipelineError, SinkError};
pub use listener::{IngestStats, Ingestor, StatusListener};
pub use pipeline::NormalizationPipeline;
pub use sink::{JsonLinesSink, MemorySink, RecordSink};
