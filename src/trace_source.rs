//! Trace source: JSON-lines event decoding
//!
//! Reads a decoded trace file (one JSON object per line) and produces a
//! lazy, finite, consume-once sequence of [`TraceEvent`]. Any I/O or
//! decode fault is fatal for the run: the correlator has no
//! partial-recovery story, so the first error ends iteration.

use crate::event::TraceEvent;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Errors for trace source operations
#[derive(Error, Debug)]
pub enum TraceSourceError {
    #[error("failed to read trace file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed trace event at line {line}: {source}")]
    Decode {
        line: usize,
        source: serde_json::Error,
    },
}

/// Lazy iterator over the events of one trace file.
///
/// Blank lines are skipped; after the first `Err` the iterator is fused
/// and yields nothing further.
#[derive(Debug)]
pub struct TraceSource<R> {
    reader: R,
    line: usize,
    failed: bool,
}

impl TraceSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, TraceSourceError> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> TraceSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            failed: false,
        }
    }
}

impl<R: BufRead> Iterator for TraceSource<R> {
    type Item = Result<TraceEvent, TraceSourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            self.line += 1;
            let mut buf = String::new();
            match self.reader.read_line(&mut buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    self.failed = true;
                    return Some(Err(TraceSourceError::Io(e)));
                }
            }
            let trimmed = buf.trim();
            if trimmed.is_empty() {
                continue;
            }
            return match serde_json::from_str::<TraceEvent>(trimmed) {
                Ok(event) => Some(Ok(event)),
                Err(source) => {
                    self.failed = true;
                    Some(Err(TraceSourceError::Decode {
                        line: self.line,
                        source,
                    }))
                }
            };
        }
    }
}
