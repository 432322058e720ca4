//! Core types for the geosift filtering pipeline.
//!
//! This crate holds the data that crosses crate boundaries:
//!
//! - **Inputs**: [`RawMessage`] and its optional [`GeoLocation`]
//! - **Outputs**: [`NormalizedRecord`] for accepted messages, [`Rejection`] otherwise
//! - **Configuration**: [`PipelineConfig`]
//!
//! Keeping these separate lets listener and storage glue depend on the
//! shapes without pulling in the regex and analyzer machinery.

#![warn(missing_docs)]

use core::fmt;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair attached to a geotagged message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl GeoLocation {
    /// Creates a new location.
    #[inline(always)]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

/// A message as delivered by the feed, before any filtering.
///
/// The language code is whatever the author declared on their account,
/// not something inferred from the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMessage {
    /// Author-supplied text, untouched.
    pub text: String,
    /// Present only when the message is geotagged.
    #[serde(default, alias = "geo")]
    pub geolocation: Option<GeoLocation>,
    /// Author-declared language tag, e.g. `"en"`.
    #[serde(alias = "lang")]
    pub author_language_code: String,
}

impl RawMessage {
    /// Creates a message without a location.
    pub fn new(text: impl Into<String>, author_language_code: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            geolocation: None,
            author_language_code: author_language_code.into(),
        }
    }

    /// Attaches a location.
    #[must_use]
    pub fn with_geolocation(mut self, latitude: f64, longitude: f64) -> Self {
        self.geolocation = Some(GeoLocation::new(latitude, longitude));
        self
    }
}

/// An accepted message, ready to be stored.
///
/// `tokens` is never empty for a record produced by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// The input text exactly as received.
    pub original_text: String,
    /// Text after every cleanup step, before tokenization.
    pub cleaned_text: String,
    /// Terms that survived the minimum-length filter, in order of appearance.
    pub tokens: Vec<String>,
    /// Copied from the message location.
    pub latitude: f64,
    /// Copied from the message location.
    pub longitude: f64,
}

impl NormalizedRecord {
    /// Returns the record's location.
    #[inline(always)]
    pub const fn geolocation(&self) -> GeoLocation {
        GeoLocation::new(self.latitude, self.longitude)
    }
}

/// Why a message was not turned into a record.
///
/// Rejections are ordinary outcomes, not failures of the system. The
/// variants are listed in the order the checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The message carries no location.
    MissingGeolocation,
    /// The author's declared language is not the configured one.
    UnsupportedLanguage,
    /// After whitespace collapse, the text contains a character outside 0x20..=0x7E.
    NonPrintableAscii,
    /// Cleanup and tokenization left no term of the minimum length.
    NoQualifyingTokens,
    /// The analyzer reported an error while producing terms.
    TokenizationFailed,
}

impl Rejection {
    /// Every variant, in check order.
    pub const ALL: [Rejection; 5] = [
        Rejection::MissingGeolocation,
        Rejection::UnsupportedLanguage,
        Rejection::NonPrintableAscii,
        Rejection::NoQualifyingTokens,
        Rejection::TokenizationFailed,
    ];

    /// Stable snake_case label, used for log fields and counters.
    pub const fn as_str(self) -> &'static str {
        match self {
            Rejection::MissingGeolocation => "missing_geolocation",
            Rejection::UnsupportedLanguage => "unsupported_language",
            Rejection::NonPrintableAscii => "non_printable_ascii",
            Rejection::NoQualifyingTokens => "no_qualifying_tokens",
            Rejection::TokenizationFailed => "tokenization_failed",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingGeolocation => write!(f, "message is not geotagged"),
            Rejection::UnsupportedLanguage => write!(f, "author language is not accepted"),
            Rejection::NonPrintableAscii => {
                write!(f, "text contains characters outside printable US-ASCII")
            }
            Rejection::NoQualifyingTokens => write!(f, "no token reached the minimum length"),
            Rejection::TokenizationFailed => write!(f, "analyzer failed while tokenizing"),
        }
    }
}

impl core::error::Error for Rejection {}

/// Default minimum number of characters a token must have to be kept.
pub const DEFAULT_MIN_TOKEN_CHARS: usize = 4;

/// Default accepted author language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Tokens shorter than this (in characters) are dropped.
    /// Default: 4
    pub min_token_chars: usize,
    /// Author language code a message must declare, compared literally.
    /// Default: `"en"`
    pub language: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_token_chars: DEFAULT_MIN_TOKEN_CHARS,
            language: DEFAULT_LANGUAGE.to_owned(),
        }
    }
}

impl PipelineConfig {
    /// Default configuration with a different minimum token length.
    pub fn with_min_token_chars(min_token_chars: usize) -> Self {
        Self {
            min_token_chars,
            ..Self::default()
        }
    }

    /// Checks the configuration can drive a pipeline.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the minimum length is zero or the language is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_token_chars == 0 {
            return Err(ConfigError::ZeroMinTokenChars);
        }
        if self.language.is_empty() {
            return Err(ConfigError::EmptyLanguage);
        }
        Ok(())
    }
}

/// Invalid [`PipelineConfig`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `min_token_chars` was zero, which would let empty terms through.
    ZeroMinTokenChars,
    /// `language` was empty, so no message could ever match.
    EmptyLanguage,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroMinTokenChars => write!(f, "min_token_chars must be at least 1"),
            ConfigError::EmptyLanguage => write!(f, "language must not be empty"),
        }
    }
}

impl core::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.min_token_chars, 4);
        assert_eq!(config.language, "en");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_min_length_is_invalid() {
        let config = PipelineConfig::with_min_token_chars(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroMinTokenChars));
    }

    #[test]
    fn empty_language_is_invalid() {
        let config = PipelineConfig {
            language: String::new(),
            ..PipelineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyLanguage));
    }

    #[test]
    fn rejection_labels_are_unique() {
        let mut labels: Vec<_> = Rejection::ALL.iter().map(|r| r.as_str()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), Rejection::ALL.len());
    }

    #[test]
    fn message_builder() {
        let msg = RawMessage::new("hello", "en").with_geolocation(40.44, -79.99);
        assert_eq!(msg.geolocation, Some(GeoLocation::new(40.44, -79.99)));
        assert_eq!(msg.author_language_code, "en");
    }

    #[test]
    fn message_accepts_short_aliases() {
        let json = r#"{"text":"hi","geo":{"latitude":1.5,"longitude":2.5},"lang":"en"}"#;
        let msg: RawMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.geolocation, Some(GeoLocation::new(1.5, 2.5)));
        assert_eq!(msg.author_language_code, "en");
    }

    #[test]
    fn message_without_geolocation_field() {
        let json = r#"{"text":"hi","author_language_code":"fr"}"#;
        let msg: RawMessage = serde_json::from_str(json).unwrap();
        assert!(msg.geolocation.is_none());
    }

    #[test]
    fn record_reports_its_location() {
        let record = NormalizedRecord {
            original_text: "x".into(),
            cleaned_text: "x".into(),
            tokens: vec!["word".into()],
            latitude: 10.0,
            longitude: 20.0,
        };
        assert_eq!(record.geolocation(), GeoLocation::new(10.0, 20.0));
        assert_eq!(record.geolocation().to_string(), "(10.00000, 20.00000)");
    }
}
