//! Pattern-based noise removal.
//!
//! Cleanup is a fixed sequence of [`CleanupStep`]s. Each step deletes every
//! match of one pattern and nothing else: no space is inserted where a
//! match was. Later steps rely on earlier ones having run:
//!
//! ```text
//! collapsed text ─► urls ─► mentions ─► entities ─► non-alphanumeric ─► cleaned text
//! ```
//!
//! URLs go first because query strings carry `&`. If entity removal ran
//! before them, `&.*;` would start inside a URL and could swallow ordinary
//! words up to the next `;`.
//!
//! The entity pattern is greedy on purpose. `"&amp; and &lt;"` loses
//! everything from the first `&` to the last `;`.

use std::borrow::Cow;

use regex::Regex;

use crate::error::PipelineError;

// Whitespace in these classes is spelled out as the ASCII set so the
// patterns agree with the whitespace collapse step.
const URL_PATTERN: &str = r"(?:https?://)?(?:[a-zA-Z0-9\-_]+\.)+[a-zA-Z0-9\-_]+(?:/[A-Za-z0-9\-_%&?/.=]*)*";
const MENTION_PATTERN: &str = r"@[^ \t\n\x0B\x0C\r]*";
const ENTITY_PATTERN: &str = r"&.*;";
const NON_ALPHANUMERIC_PATTERN: &str = r"[^a-zA-Z0-9 \t\n\x0B\x0C\r]+";

/// One cleanup step. [`CleanupStep::ORDER`] is the only order they run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupStep {
    /// Optional `http://`/`https://`, dotted domain labels, then path segments.
    StripUrls,
    /// `@` and every non-whitespace character after it.
    StripMentions,
    /// `&` through the last `;` on the line.
    StripEntities,
    /// Anything that is not an ASCII letter, digit or whitespace.
    StripNonAlphanumeric,
}

impl CleanupStep {
    /// Execution order.
    pub const ORDER: [CleanupStep; 4] = [
        CleanupStep::StripUrls,
        CleanupStep::StripMentions,
        CleanupStep::StripEntities,
        CleanupStep::StripNonAlphanumeric,
    ];

    /// Short name used in logs and errors.
    pub const fn name(self) -> &'static str {
        match self {
            CleanupStep::StripUrls => "url",
            CleanupStep::StripMentions => "mention",
            CleanupStep::StripEntities => "entity",
            CleanupStep::StripNonAlphanumeric => "non-alphanumeric",
        }
    }

    /// Source of the step's pattern.
    pub const fn pattern(self) -> &'static str {
        match self {
            CleanupStep::StripUrls => URL_PATTERN,
            CleanupStep::StripMentions => MENTION_PATTERN,
            CleanupStep::StripEntities => ENTITY_PATTERN,
            CleanupStep::StripNonAlphanumeric => NON_ALPHANUMERIC_PATTERN,
        }
    }
}

#[derive(Debug)]
struct CompiledStep {
    step: CleanupStep,
    regex: Regex,
}

impl CompiledStep {
    fn compile(step: CleanupStep) -> Result<Self, PipelineError> {
        let regex = Regex::new(step.pattern()).map_err(|source| PipelineError::Pattern {
            name: step.name(),
            source,
        })?;
        Ok(Self { step, regex })
    }
}

/// Compiled cleanup patterns, in execution order.
///
/// Immutable after construction; `Regex` is `Send + Sync`, so one cleaner
/// can serve every thread.
#[derive(Debug)]
pub struct Cleaner {
    steps: Vec<CompiledStep>,
}

impl Cleaner {
    /// Compiles every step's pattern.
    ///
    /// # Errors
    /// Returns [`PipelineError::Pattern`] if a pattern fails to compile.
    pub fn new() -> Result<Self, PipelineError> {
        let steps = CleanupStep::ORDER
            .iter()
            .map(|&step| CompiledStep::compile(step))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps })
    }

    /// Steps in the order [`Cleaner::clean`] runs them.
    pub fn steps(&self) -> impl Iterator<Item = CleanupStep> + '_ {
        self.steps.iter().map(|s| s.step)
    }

    /// Runs a single step on `text`.
    ///
    /// Borrows the input when nothing matched.
    pub fn apply<'t>(&self, step: CleanupStep, text: &'t str) -> Cow<'t, str> {
        match self.steps.iter().find(|s| s.step == step) {
            Some(compiled) => compiled.regex.replace_all(text, ""),
            None => Cow::Borrowed(text),
        }
    }

    /// Runs every step in order.
    pub fn clean(&self, text: &str) -> String {
        let mut current = text.to_owned();
        for compiled in &self.steps {
            let replaced = match compiled.regex.replace_all(&current, "") {
                Cow::Owned(next) => Some(next),
                Cow::Borrowed(_) => None,
            };
            if let Some(next) = replaced {
                current = next;
            }
        }
        current
    }
}
