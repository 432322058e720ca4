//! Analyzer capability and the default standard analyzer.
//!
//! The pipeline does not split text itself. It hands cleaned text to an
//! [`Analyzer`] and receives terms one at a time through a callback, in the
//! order they appear. Casing and stopwords are entirely the analyzer's
//! business.
//!
//! ## StandardAnalyzer
//!
//! Given cleaned input like `"Loving the sunrise in Paris"`, it emits:
//!
//! ```text
//! "loving"
//! "sunrise"
//! "paris"
//! ```
//!
//! - splits on ASCII space (0x20), skipping empty runs
//! - lower-cases ASCII letters
//! - skips terms longer than [`DEFAULT_MAX_TOKEN_CHARS`]
//! - drops stopwords, compared after lower-casing
//!
//! Cleaned text only ever contains single-byte spaces as separators (the
//! whitespace collapse runs first and later steps only delete), but removals
//! leave runs of spaces behind, so empty runs are expected.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use memchr::memchr_iter;
use rustc_hash::FxHashSet;

use crate::error::{AnalyzerError, PipelineError};

/// Terms longer than this many characters are skipped.
pub const DEFAULT_MAX_TOKEN_CHARS: usize = 255;

/// Classic English stop set.
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Turns cleaned text into terms.
///
/// Implementations must emit terms left to right, at most once each per
/// occurrence. An error may be returned after some terms were already
/// emitted; the caller discards the partial result.
///
/// `Send + Sync` lets one analyzer be shared by every thread running a
/// pipeline. Implementations with per-call state must keep it on the stack
/// of `tokenize`.
pub trait Analyzer: Send + Sync {
    /// Emits each term of `text` in order.
    fn tokenize<F>(&self, text: &str, emit: F) -> Result<(), AnalyzerError>
    where
        F: FnMut(&str);
}

/// Whitespace-splitting, lower-casing, stopword-filtering analyzer.
///
/// Immutable after construction.
///
/// ## Example
///
/// ```
/// use geosift_core::analyzer::tokenizer::{Analyzer, StandardAnalyzer};
///
/// let analyzer = StandardAnalyzer::default();
/// let mut terms = Vec::new();
/// analyzer.tokenize("The QUICK  fox", |t| terms.push(t.to_owned())).unwrap();
///
/// assert_eq!(terms, ["quick", "fox"]);
/// ```
#[derive(Debug, Clone)]
pub struct StandardAnalyzer {
    stopwords: FxHashSet<String>,
    max_token_chars: usize,
}

impl Default for StandardAnalyzer {
    fn default() -> Self {
        Self::with_stopwords(ENGLISH_STOPWORDS.iter().copied())
    }
}

impl StandardAnalyzer {
    /// Creates an analyzer with the given stopwords, lower-cased on entry.
    pub fn with_stopwords<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stopwords = words
            .into_iter()
            .map(|w| w.as_ref().to_ascii_lowercase())
            .collect();
        Self {
            stopwords,
            max_token_chars: DEFAULT_MAX_TOKEN_CHARS,
        }
    }

    /// Creates an analyzer that keeps every term.
    pub fn without_stopwords() -> Self {
        Self::with_stopwords(std::iter::empty::<&str>())
    }

    /// Loads stopwords from a word list: one word per line.
    ///
    /// Lines are trimmed and lower-cased. Blank lines and lines starting
    /// with `#` are ignored.
    ///
    /// # Errors
    /// Returns [`PipelineError::StopwordsRead`] if the reader fails.
    pub fn from_word_list<R: Read>(reader: R) -> Result<Self, PipelineError> {
        let mut words = Vec::new();
        for line in BufReader::new(reader).lines() {
            let line = line.map_err(PipelineError::StopwordsRead)?;
            let word = line.trim();
            if word.is_empty() || word.starts_with('#') {
                continue;
            }
            words.push(word.to_owned());
        }
        Ok(Self::with_stopwords(words))
    }

    /// Loads stopwords from a word list file.
    ///
    /// # Errors
    /// Returns [`PipelineError::Stopwords`] if the file cannot be opened or read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let wrap = |source| PipelineError::Stopwords {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(wrap)?;
        Self::from_word_list(file).map_err(|err| match err {
            PipelineError::StopwordsRead(source) => wrap(source),
            other => other,
        })
    }

    /// Sets the longest term, in characters, that is still emitted.
    #[must_use]
    pub fn max_token_chars(mut self, max: usize) -> Self {
        self.max_token_chars = max;
        self
    }

    /// Returns `true` if `term` (already lower-case) is a stopword.
    #[inline]
    pub fn is_stopword(&self, term: &str) -> bool {
        self.stopwords.contains(term)
    }

    /// Number of loaded stopwords.
    pub fn stopword_count(&self) -> usize {
        self.stopwords.len()
    }

    #[inline(always)]
    fn emit_term<F>(&self, raw: &str, lowered: &mut String, emit: &mut F)
    where
        F: FnMut(&str),
    {
        lowered.clear();
        lowered.push_str(raw);
        lowered.make_ascii_lowercase();

        if lowered.chars().count() > self.max_token_chars || self.is_stopword(lowered) {
            return;
        }

        emit(lowered);
    }
}

impl Analyzer for StandardAnalyzer {
    fn tokenize<F>(&self, text: &str, mut emit: F) -> Result<(), AnalyzerError>
    where
        F: FnMut(&str),
    {
        let bytes = text.as_bytes();
        if bytes.is_empty() {
            return Ok(());
        }

        let mut lowered = String::with_capacity(32);
        let mut start = 0usize;

        // Splitting on an ASCII byte keeps every slice on a char boundary.
        for i in memchr_iter(b' ', bytes) {
            if start < i {
                self.emit_term(&text[start..i], &mut lowered, &mut emit);
            }
            start = i + 1;
        }

        if start < bytes.len() {
            self.emit_term(&text[start..], &mut lowered, &mut emit);
        }

        Ok(())
    }
}
