//! Record storage seam.
//!
//! The pipeline never stores anything. Whoever drives it hands accepted
//! records to a [`RecordSink`].

use std::io::Write;

use geosift_types::NormalizedRecord;

use crate::error::SinkError;

/// Destination for accepted records.
pub trait RecordSink {
    /// Stores one record.
    fn store(&mut self, record: NormalizedRecord) -> Result<(), SinkError>;

    /// Pushes out anything buffered.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn store(&mut self, record: NormalizedRecord) -> Result<(), SinkError> {
        (**self).store(record)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<NormalizedRecord>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records stored so far, oldest first.
    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    /// Consumes the sink and returns its records.
    pub fn into_records(self) -> Vec<NormalizedRecord> {
        self.records
    }
}

impl RecordSink for MemorySink {
    fn store(&mut self, record: NormalizedRecord) -> Result<(), SinkError> {
        self.records.push(record);
        Ok(())
    }
}

/// Writes each record as one line of JSON.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wraps a writer. Buffering, if any, is the caller's choice.
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of records written.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn store(&mut self, record: NormalizedRecord) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
