//! Registry of open sessions keyed by process id
//!
//! The table owns every open session exclusively; ownership leaves the
//! table only through `close_session` (finalized into a sample) or
//! `discard_open` (end of stream, no sample). Pids are reused by the OS,
//! so a ProcessStart for an already-open key shadows the stale session
//! rather than merging two process lifetimes.

use crate::event::CheckpointId;
use crate::session::{CloseReason, Sample, Session};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct SessionTable {
    open: HashMap<u32, Session>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh session for `process_key`. A still-open session under
    /// the same key is evicted and returned, never finalized: a session
    /// that never saw its own close signal has no reliable end boundary,
    /// so its partial data is discarded by the caller (counted, not an
    /// error).
    pub fn open_session(&mut self, process_key: u32, timestamp_ms: f64) -> Option<Session> {
        self.open
            .insert(process_key, Session::new(process_key, timestamp_ms))
    }

    /// Close and finalize the open session for `process_key`. A close with
    /// no matching open session is expected noise (unrelated process
    /// exits) and yields `None`.
    pub fn close_session(
        &mut self,
        process_key: u32,
        timestamp_ms: f64,
        reason: CloseReason,
    ) -> Option<Sample> {
        let session = self.open.remove(&process_key)?;
        Some(session.close(timestamp_ms, reason))
    }

    /// Apply a checkpoint to the open session for `process_key`.
    /// Returns false when the event is unroutable (no open session).
    pub fn route_checkpoint(
        &mut self,
        process_key: u32,
        id: CheckpointId,
        timestamp_ms: f64,
    ) -> bool {
        match self.open.get_mut(&process_key) {
            Some(session) => {
                session.apply_checkpoint(id, timestamp_ms);
                true
            }
            None => false,
        }
    }

    /// Feed an interval start to the open session for `process_key`.
    /// Returns false when unroutable.
    pub fn route_interval_start(
        &mut self,
        process_key: u32,
        interval_key: u64,
        timestamp_ms: f64,
    ) -> bool {
        match self.open.get_mut(&process_key) {
            Some(session) => {
                session.feed_interval_start(interval_key, timestamp_ms);
                true
            }
            None => false,
        }
    }

    /// Feed an interval end to the open session for `process_key`.
    /// Returns false when unroutable.
    pub fn route_interval_end(
        &mut self,
        process_key: u32,
        interval_key: u64,
        timestamp_ms: f64,
    ) -> bool {
        match self.open.get_mut(&process_key) {
            Some(session) => {
                session.feed_interval_end(interval_key, timestamp_ms);
                true
            }
            None => false,
        }
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Drop every remaining open session at end of stream. An incomplete
    /// session is not a valid sample; returns how many were discarded.
    pub fn discard_open(&mut self) -> usize {
        let discarded = self.open.len();
        self.open.clear();
        discarded
    }
}
