//! Feed listener glue.
//!
//! A feed delivers several kinds of notifications, but only content
//! messages matter here. [`StatusListener`] has one required method for
//! those; every other hook defaults to doing nothing.
//!
//! [`Ingestor`] is the standard listener: it runs each message through a
//! [`NormalizationPipeline`] and hands accepted records to a [`RecordSink`].

use std::io::{self, BufRead};

use geosift_types::{RawMessage, Rejection};
use tracing::{debug, error, warn};

use crate::analyzer::tokenizer::Analyzer;
use crate::pipeline::NormalizationPipeline;
use crate::sink::RecordSink;

/// Receives feed notifications.
pub trait StatusListener {
    /// A content message arrived.
    fn on_status(&mut self, message: RawMessage);

    /// A previously delivered message was deleted.
    fn on_deletion_notice(&mut self, _status_id: u64, _user_id: u64) {}

    /// Location data for a user's messages up to `_up_to_status_id` must be removed.
    fn on_scrub_geo(&mut self, _user_id: u64, _up_to_status_id: u64) {}

    /// The feed is falling behind.
    fn on_stall_warning(&mut self, _code: &str, _message: &str, _percent_full: u8) {}

    /// Messages matching the subscription were withheld.
    fn on_track_limitation_notice(&mut self, _undelivered: u64) {}

    /// The feed itself hit an error.
    fn on_exception(&mut self, _error: &dyn std::error::Error) {}
}

/// Counters for an [`Ingestor`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Content messages seen.
    pub received: u64,
    /// Messages the pipeline accepted.
    pub accepted: u64,
    /// Accepted records the sink stored.
    pub stored: u64,
    /// Accepted records the sink refused.
    pub store_failures: u64,
    /// Feed errors reported through `on_exception`.
    pub feed_errors: u64,
    rejected: [u64; Rejection::ALL.len()],
}

impl IngestStats {
    /// Messages rejected for `reason`.
    pub fn rejected(&self, reason: Rejection) -> u64 {
        self.rejected[Self::slot(reason)]
    }

    /// Messages rejected for any reason.
    pub fn rejected_total(&self) -> u64 {
        self.rejected.iter().sum()
    }

    fn record_rejection(&mut self, reason: Rejection) {
        self.rejected[Self::slot(reason)] += 1;
    }

    #[inline(always)]
    const fn slot(reason: Rejection) -> usize {
        match reason {
            Rejection::MissingGeolocation => 0,
            Rejection::UnsupportedLanguage => 1,
            Rejection::NonPrintableAscii => 2,
            Rejection::NoQualifyingTokens => 3,
            Rejection::TokenizationFailed => 4,
        }
    }
}

impl core::fmt::Display for IngestStats {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} received, {} accepted, {} stored, {} rejected",
            self.received,
            self.accepted,
            self.stored,
            self.rejected_total()
        )?;

        if self.rejected_total() > 0 {
            write!(f, " (")?;
            let mut first = true;
            for reason in Rejection::ALL {
                let n = self.rejected(reason);
                if n == 0 {
                    continue;
                }
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", reason.as_str(), n)?;
                first = false;
            }
            write!(f, ")")?;
        }

        if self.store_failures > 0 {
            write!(f, ", {} store failures", self.store_failures)?;
        }
        if self.feed_errors > 0 {
            write!(f, ", {} feed errors", self.feed_errors)?;
        }

        Ok(())
    }
}

/// Runs content messages through a pipeline and stores what it accepts.
///
/// Nothing that goes wrong with one message carries over to the next:
/// rejections and sink failures are counted and logged, never raised.
pub struct Ingestor<A: Analyzer, S: RecordSink> {
    pipeline: NormalizationPipeline<A>,
    sink: S,
    stats: IngestStats,
}

impl<A: Analyzer, S: RecordSink> Ingestor<A, S> {
    /// Creates an ingestor that stores into `sink`.
    pub fn new(pipeline: NormalizationPipeline<A>, sink: S) -> Self {
        Self {
            pipeline,
            sink,
            stats: IngestStats::default(),
        }
    }

    /// Counters so far.
    #[inline]
    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// The wrapped pipeline.
    pub fn pipeline(&self) -> &NormalizationPipeline<A> {
        &self.pipeline
    }

    /// The wrapped sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Flushes the sink.
    ///
    /// # Errors
    /// Returns the sink's error.
    pub fn flush(&mut self) -> Result<(), crate::error::SinkError> {
        self.sink.flush()
    }

    /// Feeds every line of a JSON-lines dump to [`StatusListener::on_status`].
    ///
    /// Blank lines are skipped. A line that is not a valid message is logged,
    /// reported through [`StatusListener::on_exception`], and skipped.
    ///
    /// # Errors
    /// Returns the reader's I/O error; lines already read stay processed.
    pub fn ingest_json_lines<R: BufRead>(&mut self, reader: R) -> io::Result<()> {
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<RawMessage>(&line) {
                Ok(message) => self.on_status(message),
                Err(err) => {
                    warn!(line = idx + 1, error = %err, "skipping malformed message");
                    self.on_exception(&err);
                }
            }
        }
        Ok(())
    }

    /// Consumes the ingestor, returning its sink and final counters.
    pub fn into_parts(self) -> (S, IngestStats) {
        (self.sink, self.stats)
    }
}

impl<A: Analyzer, S: RecordSink> StatusListener for Ingestor<A, S> {
    fn on_status(&mut self, message: RawMessage) {
        self.stats.received += 1;

        let record = match self.pipeline.evaluate(&message) {
            Ok(record) => record,
            Err(reason) => {
                self.stats.record_rejection(reason);
                return;
            }
        };
        self.stats.accepted += 1;

        match self.sink.store(record) {
            Ok(()) => self.stats.stored += 1,
            Err(err) => {
                self.stats.store_failures += 1;
                error!(error = %err, "failed to store record");
            }
        }
    }

    fn on_deletion_notice(&mut self, status_id: u64, user_id: u64) {
        debug!(status_id, user_id, "deletion notice ignored");
    }

    fn on_scrub_geo(&mut self, user_id: u64, up_to_status_id: u64) {
        debug!(user_id, up_to_status_id, "scrub geo notice ignored");
    }

    fn on_stall_warning(&mut self, code: &str, message: &str, percent_full: u8) {
        warn!(code, percent_full, "stall warning: {message}");
    }

    fn on_track_limitation_notice(&mut self, undelivered: u64) {
        warn!(undelivered, "track limitation notice");
    }

    fn on_exception(&mut self, error: &dyn std::error::Error) {
        self.stats.feed_errors += 1;
        warn!(error = %error, "feed error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::sink::MemorySink;
    use geosift_types::NormalizedRecord;

    /// Refuses every record.
    struct BrokenSink;

    impl RecordSink for BrokenSink {
        fn store(&mut self, _record: NormalizedRecord) -> Result<(), SinkError> {
            Err(SinkError::Rejected("read-only".into()))
        }
    }

    fn ingestor() -> Ingestor<crate::StandardAnalyzer, MemorySink> {
        Ingestor::new(NormalizationPipeline::standard().unwrap(), MemorySink::new())
    }

    fn tagged(text: &str) -> RawMessage {
        RawMessage::new(text, "en").with_geolocation(40.4406, -79.9959)
    }

    #[test]
    fn accepted_messages_reach_the_sink() {
        let mut ing = ingestor();
        ing.on_status(tagged("Three rivers shining bright"));
        ing.on_status(RawMessage::new("no location here at all", "en"));
        ing.on_status(tagged("ok go"));

        let stats = ing.stats();
        assert_eq!(stats.received, 3);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.stored, 1);
        assert_eq!(stats.rejected(Rejection::MissingGeolocation), 1);
        assert_eq!(stats.rejected(Rejection::NoQualifyingTokens), 1);
        assert_eq!(stats.rejected_total(), 2);

        let (sink, _) = ing.into_parts();
        let records = sink.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tokens, ["three", "rivers", "shining", "bright"]);
    }

    #[test]
    fn sink_failure_is_contained() {
        let mut ing = Ingestor::new(NormalizationPipeline::standard().unwrap(), BrokenSink);
        ing.on_status(tagged("first useful message"));
        ing.on_status(tagged("second useful message"));

        let stats = ing.stats();
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.stored, 0);
        assert_eq!(stats.store_failures, 2);
    }

    #[test]
    fn notification_hooks_do_not_touch_content_counters() {
        let mut ing = ingestor();
        ing.on_deletion_notice(1, 2);
        ing.on_scrub_geo(2, 10);
        ing.on_stall_warning("FALLING_BEHIND", "queue filling", 80);
        ing.on_track_limitation_notice(12);

        let stats = ing.stats();
        assert_eq!(stats.received, 0);
        assert_eq!(stats.feed_errors, 0);
        assert!(ing.sink().records().is_empty());
    }

    #[test]
    fn exceptions_are_counted() {
        let mut ing = ingestor();
        let err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        ing.on_exception(&err);
        assert_eq!(ing.stats().feed_errors, 1);
    }

    #[test]
    fn default_hooks_are_no_ops() {
        struct CountOnly(u32);

        impl StatusListener for CountOnly {
            fn on_status(&mut self, _message: RawMessage) {
                self.0 += 1;
            }
        }

        let mut listener = CountOnly(0);
        listener.on_deletion_notice(1, 1);
        listener.on_track_limitation_notice(5);
        listener.on_status(tagged("anything"));
        assert_eq!(listener.0, 1);
    }

    #[test]
    fn stats_display() {
        let mut ing = ingestor();
        ing.on_status(tagged("Three rivers shining bright"));
        ing.on_status(RawMessage::new("untagged", "en"));
        ing.on_status(tagged("Café"));

        assert_eq!(
            ing.stats().to_string(),
            "3 received, 1 accepted, 1 stored, 2 rejected \
             (missing_geolocation: 1, non_printable_ascii: 1)"
        );
    }

    #[test]
    fn json_lines_skip_blank_and_malformed() {
        let input = concat!(
            r#"{"text":"Three rivers shining bright","geolocation":{"latitude":40.44,"longitude":-79.99},"author_language_code":"en"}"#,
            "\n",
            "\n",
            "   \n",
            "{not json at all\n",
            r#"{"text":"no location attached","lang":"en"}"#,
            "\n",
            r#"{"text":"Evening fog over bridges","geo":{"latitude":1.0,"longitude":2.0},"lang":"en"}"#,
        );

        let mut ing = ingestor();
        ing.ingest_json_lines(input.as_bytes()).unwrap();

        let stats = ing.stats();
        assert_eq!(stats.received, 3);
        assert_eq!(stats.feed_errors, 1);
        assert_eq!(stats.stored, 2);
        assert_eq!(stats.rejected(Rejection::MissingGeolocation), 1);

        let tokens: Vec<_> = ing.sink().records().iter().map(|r| r.tokens.clone()).collect();
        assert_eq!(
            tokens,
            [
                vec!["three", "rivers", "shining", "bright"],
                vec!["evening", "over", "bridges"],
            ]
        );
    }

    #[test]
    fn json_lines_empty_input() {
        let mut ing = ingestor();
        ing.ingest_json_lines(&b""[..]).unwrap();
        assert_eq!(ing.stats(), IngestStats::default());
    }

    #[test]
    fn json_lines_read_error_is_returned() {
        struct FailingReader;

        impl std::io::Read for FailingReader {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
            }
        }

        let mut ing = ingestor();
        let err = ing
            .ingest_json_lines(std::io::BufReader::new(FailingReader))
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
        assert_eq!(ing.stats().received, 0);
    }

    #[test]
    fn empty_stats_display() {
        assert_eq!(
            IngestStats::default().to_string(),
            "0 received, 0 accepted, 0 stored, 0 rejected"
        );
    }
}
