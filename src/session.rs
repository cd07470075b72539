//! Per-process session state machine
//!
//! One `Session` tracks one process lifetime from its ProcessStart until a
//! close signal arrives. Checkpoints are first-wins; interval events feed
//! the embedded matcher. `close` consumes the session, so a finalized
//! [`Sample`] can never be mutated and a closed session can never regress
//! to open.

use crate::event::CheckpointId;
use crate::interval::IntervalMatcher;
use std::collections::HashMap;

/// Why a session was finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The monitored process exited
    ProcessStop,
    /// A configured checkpoint acts as the close signal (for traces where
    /// process-stop does not reliably fire)
    Checkpoint(CheckpointId),
}

/// An open session for one process instance.
#[derive(Debug, Clone)]
pub struct Session {
    process_key: u32,
    opened_at_ms: f64,
    checkpoints: HashMap<CheckpointId, f64>,
    intervals: IntervalMatcher,
}

impl Session {
    pub fn new(process_key: u32, opened_at_ms: f64) -> Self {
        Self {
            process_key,
            opened_at_ms,
            checkpoints: HashMap::new(),
            intervals: IntervalMatcher::new(),
        }
    }

    pub fn process_key(&self) -> u32 {
        self.process_key
    }

    pub fn opened_at_ms(&self) -> f64 {
        self.opened_at_ms
    }

    /// Record a milestone timestamp. First-wins: the upstream source is
    /// not fully trusted, so a duplicate checkpoint is a no-op rather
    /// than an overwrite. Returns whether the checkpoint was recorded.
    pub fn apply_checkpoint(&mut self, id: CheckpointId, timestamp_ms: f64) -> bool {
        if self.checkpoints.contains_key(&id) {
            return false;
        }
        self.checkpoints.insert(id, timestamp_ms);
        true
    }

    pub fn checkpoint(&self, id: CheckpointId) -> Option<f64> {
        self.checkpoints.get(&id).copied()
    }

    /// Register an open sub-interval. Returns the replaced stale start
    /// timestamp when the key was already open.
    pub fn feed_interval_start(&mut self, interval_key: u64, timestamp_ms: f64) -> Option<f64> {
        self.intervals.on_start(interval_key, timestamp_ms)
    }

    /// Close a sub-interval; unmatched ends are ignored.
    pub fn feed_interval_end(&mut self, interval_key: u64, timestamp_ms: f64) -> Option<f64> {
        self.intervals.on_end(interval_key, timestamp_ms)
    }

    pub fn jit_total_ms(&self) -> f64 {
        self.intervals.total_ms()
    }

    pub fn open_interval_count(&self) -> usize {
        self.intervals.open_count()
    }

    /// Finalize into an immutable [`Sample`]. Consuming `self` is the
    /// closed state: no further mutation is possible.
    pub fn close(self, closed_at_ms: f64, reason: CloseReason) -> Sample {
        let at = |id: CheckpointId| self.checkpoints.get(&id).copied();
        let diff = |from: Option<f64>, to: Option<f64>| Some(to? - from?);

        let runtime_start = at(CheckpointId::RuntimeStart);
        let entering_main = at(CheckpointId::EnteringMain);
        let host_started = at(CheckpointId::HostStarted);
        let request_start = at(CheckpointId::RequestStart);
        let request_stop = at(CheckpointId::RequestStop);

        Sample {
            process_key: self.process_key,
            opened_at_ms: self.opened_at_ms,
            closed_at_ms,
            close_reason: reason,
            runtime_init_ms: diff(Some(self.opened_at_ms), runtime_start),
            entry_point_ms: diff(runtime_start, entering_main),
            host_ready_ms: diff(entering_main, host_started),
            request_ms: diff(request_start, request_stop),
            jit_total_ms: self.intervals.total_ms(),
        }
    }
}

/// A finalized session: named phase durations in milliseconds.
///
/// A phase is `None` when either endpoint checkpoint never fired. Negative
/// durations are passed through unclamped; they signal cross-category
/// clock jitter in the trace and must stay visible to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub process_key: u32,
    pub opened_at_ms: f64,
    pub closed_at_ms: f64,
    pub close_reason: CloseReason,
    /// ProcessStart → RuntimeStart
    pub runtime_init_ms: Option<f64>,
    /// RuntimeStart → EnteringMain
    pub entry_point_ms: Option<f64>,
    /// EnteringMain → HostStarted
    pub host_ready_ms: Option<f64>,
    /// RequestStart → RequestStop
    pub request_ms: Option<f64>,
    /// Sum of matched sub-interval durations (cumulative JIT time)
    pub jit_total_ms: f64,
}
