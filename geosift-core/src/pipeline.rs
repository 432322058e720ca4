//! The normalization pipeline.
//!
//! ```text
//! RawMessage
//!   │ geolocation present?          ── no ─► MissingGeolocation
//!   │ author language == config?    ── no ─► UnsupportedLanguage
//!   │ collapse whitespace
//!   │ printable ASCII only?         ── no ─► NonPrintableAscii
//!   │ urls ► mentions ► entities ► non-alphanumeric
//!   │ analyzer terms, keep len >= min
//!   │ analyzer error or panic?      ── yes ► TokenizationFailed
//!   │ any term kept?                ── no ─► NoQualifyingTokens
//!   ▼
//! NormalizedRecord
//! ```

use std::panic::{self, AssertUnwindSafe};

use geosift_types::{NormalizedRecord, PipelineConfig, RawMessage, Rejection};
use tracing::{debug, warn};

use crate::analyzer::cleanup::Cleaner;
use crate::analyzer::normalizer::{collapse_whitespace, is_printable_ascii};
use crate::analyzer::tokenizer::{Analyzer, StandardAnalyzer};
use crate::error::{AnalyzerError, PipelineError};

/// Decides whether a message is kept and, if so, builds its record.
///
/// Holds only read-only state built at construction, so `process` takes
/// `&self` and separate calls never affect each other.
///
/// # Examples
///
/// ```
/// use geosift_core::NormalizationPipeline;
/// use geosift_types::RawMessage;
///
/// let pipeline = NormalizationPipeline::standard().unwrap();
///
/// let msg = RawMessage::new("Sunny morning walking downtown", "en").with_geolocation(40.44, -79.99);
/// let record = pipeline.process(&msg).unwrap();
/// assert_eq!(record.tokens, ["sunny", "morning", "walking", "downtown"]);
///
/// let untagged = RawMessage::new("Sunny morning walking downtown", "en");
/// assert!(pipeline.process(&untagged).is_none());
/// ```
#[derive(Debug)]
pub struct NormalizationPipeline<A = StandardAnalyzer> {
    config: PipelineConfig,
    cleaner: Cleaner,
    analyzer: A,
}

impl NormalizationPipeline<StandardAnalyzer> {
    /// Default configuration with the default English analyzer.
    ///
    /// # Errors
    /// Returns [`PipelineError`] if the cleanup patterns fail to compile.
    pub fn standard() -> Result<Self, PipelineError> {
        Self::new(PipelineConfig::default(), StandardAnalyzer::default())
    }
}

impl<A: Analyzer> NormalizationPipeline<A> {
    /// Validates `config` and compiles the cleanup patterns.
    ///
    /// # Errors
    /// Returns [`PipelineError::Config`] for an invalid configuration and
    /// [`PipelineError::Pattern`] if a pattern fails to compile.
    pub fn new(config: PipelineConfig, analyzer: A) -> Result<Self, PipelineError> {
        config.validate()?;
        let cleaner = Cleaner::new()?;
        Ok(Self {
            config,
            cleaner,
            analyzer,
        })
    }

    /// The active configuration.
    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The analyzer terms come from.
    #[inline]
    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Returns a record for an accepted message, `None` otherwise.
    #[inline]
    pub fn process(&self, message: &RawMessage) -> Option<NormalizedRecord> {
        self.evaluate(message).ok()
    }

    /// Like [`process`](Self::process), but reports why a message was rejected.
    ///
    /// # Errors
    /// Returns the first [`Rejection`] the message hits.
    pub fn evaluate(&self, message: &RawMessage) -> Result<NormalizedRecord, Rejection> {
        let outcome = self.run(message);
        if let Err(reason) = outcome {
            debug!(reason = reason.as_str(), "message rejected");
        }
        outcome
    }

    fn run(&self, message: &RawMessage) -> Result<NormalizedRecord, Rejection> {
        let location = message.geolocation.ok_or(Rejection::MissingGeolocation)?;

        if message.author_language_code != self.config.language {
            return Err(Rejection::UnsupportedLanguage);
        }

        let collapsed = collapse_whitespace(&message.text);
        if !is_printable_ascii(&collapsed) {
            return Err(Rejection::NonPrintableAscii);
        }

        let cleaned = self.cleaner.clean(&collapsed);
        let tokens = self.tokens(&cleaned)?;
        if tokens.is_empty() {
            return Err(Rejection::NoQualifyingTokens);
        }

        Ok(NormalizedRecord {
            original_text: message.text.clone(),
            cleaned_text: cleaned,
            tokens,
            latitude: location.latitude,
            longitude: location.longitude,
        })
    }

    /// Terms of `cleaned` that reach the minimum length, in order.
    ///
    /// A panicking analyzer is treated like one that returned an error.
    fn tokens(&self, cleaned: &str) -> Result<Vec<String>, Rejection> {
        let min = self.config.min_token_chars;
        let mut tokens = Vec::new();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.analyzer.tokenize(cleaned, |term| {
                if term.chars().count() >= min {
                    tokens.push(term.to_owned());
                }
            })
        }))
        .unwrap_or_else(|payload| Err(AnalyzerError::Panicked(panic_message(&*payload))));

        match result {
            Ok(()) => Ok(tokens),
            Err(err) => {
                warn!(error = %err, "analyzer failed, dropping message");
                Err(Rejection::TokenizationFailed)
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
