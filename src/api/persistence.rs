//! Persistence collaborator interface

use crate::api::formatting::PositionRecord;
use parking_lot::Mutex;
use std::io::Write;
use thiserror::Error;

/// Errors reported by a persistence sink
#[derive(Debug, Error)]
pub enum SinkError {
    /// The store refused the record
    #[error("Record rejected: {reason}")]
    Rejected { reason: String },
    /// The record could not be encoded
    #[error("Failed to serialize record: {message}")]
    Serialization { message: String },
    /// The encoded record could not be written
    #[error("Failed to write record: {message}")]
    Write { message: String },
}

/// Receives solved positions for storage
pub trait PositionSink: Send + Sync {
    fn submit(&self, record: &PositionRecord) -> Result<(), SinkError>;
}

/// In-memory sink for tests and demos
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<PositionRecord>>,
    reject_with: Mutex<Option<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every subsequent record with the given reason
    pub fn reject_with(&self, reason: impl Into<String>) {
        *self.reject_with.lock() = Some(reason.into());
    }

    pub fn records(&self) -> Vec<PositionRecord> {
        self.records.lock().clone()
    }
}

impl PositionSink for MemorySink {
    fn submit(&self, record: &PositionRecord) -> Result<(), SinkError> {
        if let Some(reason) = self.reject_with.lock().clone() {
            return Err(SinkError::Rejected { reason });
        }
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Writes each record as one JSON line
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: Mutex::new(writer) }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> PositionSink for JsonLinesSink<W> {
    fn submit(&self, record: &PositionRecord) -> Result<(), SinkError> {
        let line = record
            .to_json()
            .map_err(|e| SinkError::Serialization { message: e.to_string() })?;
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)
            .and_then(|_| writer.flush())
            .map_err(|e| SinkError::Write { message: e.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record() -> PositionRecord {
        PositionRecord { timestamp: Utc::now(), latitude: 1.5, longitude: 2.5 }
    }

    #[test]
    fn test_memory_sink_stores_and_rejects() {
        let sink = MemorySink::new();
        sink.submit(&record()).unwrap();
        assert_eq!(sink.records().len(), 1);

        sink.reject_with("quota exceeded");
        let error = sink.submit(&record()).unwrap_err();
        assert_eq!(error.to_string(), "Record rejected: quota exceeded");
        assert_eq!(sink.records().len(), 1);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_json_lines_write_failure() {
        let sink = JsonLinesSink::new(BrokenPipe);
        assert!(matches!(sink.submit(&record()), Err(SinkError::Write { .. })));
    }

    #[test]
    fn test_json_lines_sink() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.submit(&record()).unwrap();
        sink.submit(&record()).unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: PositionRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.latitude, 1.5);
    }
}
