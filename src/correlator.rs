//! Event dispatch and sample emission
//!
//! The correlator is the single entry point for the decoded event stream:
//! one synchronous `dispatch` per event, routing through the session table
//! and handing finalized samples to the sink in close order. It holds no
//! state beyond the table, the sink, its config, and diagnostic counters.
//!
//! All recoverable anomalies (unroutable events, unrecognized names,
//! stale-session eviction) are absorbed here and counted; nothing in the
//! dispatch path ever fails.

use crate::event::{CheckpointId, EventCategory, TraceEvent};
use crate::session::{CloseReason, Sample};
use crate::session_table::SessionTable;
use tracing::debug;

/// Which event finalizes a session.
///
/// The upstream sources disagree on an authoritative termination signal
/// (process exit vs. a host-level milestone), so the close predicate is
/// configuration, not a hard-coded category. If the configured signal
/// never arrives the session simply stays open and is discarded at end of
/// stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseSignal {
    /// Close on the OS-level ProcessStop event (default)
    ProcessStop,
    /// Close once the named checkpoint fires (the checkpoint timestamp is
    /// recorded first, then the session closes at that same timestamp)
    Checkpoint(CheckpointId),
}

impl Default for CloseSignal {
    fn default() -> Self {
        Self::ProcessStop
    }
}

/// Correlator configuration.
#[derive(Debug, Clone, Default)]
pub struct CorrelatorConfig {
    /// When set, only ProcessStart/ProcessStop events whose `source_tag`
    /// matches this image name open or close sessions. Checkpoint and
    /// interval events always route by pid alone.
    pub monitored_image: Option<String>,
    /// The close predicate (see [`CloseSignal`]).
    pub close_on: CloseSignal,
}

/// Diagnostic counters for one correlation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Events received by `dispatch`
    pub events_seen: u64,
    /// Samples handed to the sink
    pub samples_emitted: u64,
    /// Checkpoint/interval events with no open session for their pid
    pub unroutable_dropped: u64,
    /// Events outside the recognized tag/name set (filtered images,
    /// unknown checkpoint names, interval events missing their key)
    pub unrecognized_dropped: u64,
    /// Open sessions shadowed by a ProcessStart on a reused pid
    pub stale_evictions: u64,
    /// Sessions still open when the stream ended
    pub discarded_open: u64,
}

/// Receives finalized samples in close order.
pub trait SampleSink {
    fn emit(&mut self, sample: Sample);
}

impl SampleSink for Vec<Sample> {
    fn emit(&mut self, sample: Sample) {
        self.push(sample);
    }
}

/// Routes decoded events into per-process sessions and emits samples.
#[derive(Debug)]
pub struct Correlator<S: SampleSink> {
    table: SessionTable,
    sink: S,
    config: CorrelatorConfig,
    stats: DispatchStats,
}

impl<S: SampleSink> Correlator<S> {
    pub fn new(config: CorrelatorConfig, sink: S) -> Self {
        Self {
            table: SessionTable::new(),
            sink,
            config,
            stats: DispatchStats::default(),
        }
    }

    /// Process one event. Never fails: anomalies are counted and absorbed.
    pub fn dispatch(&mut self, event: TraceEvent) {
        self.stats.events_seen += 1;

        match event.category {
            EventCategory::ProcessStart => self.on_process_start(&event),
            EventCategory::ProcessStop => self.on_process_stop(&event),
            EventCategory::RuntimeStart => {
                self.route_checkpoint(&event, CheckpointId::RuntimeStart);
            }
            EventCategory::Checkpoint => self.on_checkpoint(&event),
            EventCategory::IntervalStart | EventCategory::IntervalEnd => {
                self.on_interval(&event);
            }
        }
    }

    /// End of stream: discard sessions that never saw a close signal and
    /// log the run counters. Returns the final stats.
    pub fn finish(&mut self) -> DispatchStats {
        let discarded = self.table.discard_open();
        self.stats.discarded_open += discarded as u64;
        if discarded > 0 {
            debug!(discarded, "discarded open sessions at end of stream");
        }
        debug!(
            events = self.stats.events_seen,
            samples = self.stats.samples_emitted,
            unroutable = self.stats.unroutable_dropped,
            unrecognized = self.stats.unrecognized_dropped,
            evicted = self.stats.stale_evictions,
            "correlation finished"
        );
        self.stats
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn open_sessions(&self) -> usize {
        self.table.open_count()
    }

    /// Hand back the sink (e.g., the collected `Vec<Sample>`).
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn image_matches(&self, event: &TraceEvent) -> bool {
        match &self.config.monitored_image {
            Some(image) => event.source_tag == *image,
            None => true,
        }
    }

    fn on_process_start(&mut self, event: &TraceEvent) {
        if !self.image_matches(event) {
            self.stats.unrecognized_dropped += 1;
            return;
        }
        if let Some(stale) = self.table.open_session(event.process_key, event.timestamp_ms) {
            // pid reused before the prior instance closed: the stale
            // session has no trustworthy end boundary, so it is dropped,
            // not emitted
            self.stats.stale_evictions += 1;
            debug!(
                process_key = event.process_key,
                opened_at_ms = stale.opened_at_ms(),
                "evicted stale session on reused process key"
            );
        }
    }

    fn on_process_stop(&mut self, event: &TraceEvent) {
        if !self.image_matches(event) {
            self.stats.unrecognized_dropped += 1;
            return;
        }
        if self.config.close_on != CloseSignal::ProcessStop {
            // a different close signal is authoritative for this trace;
            // the session stays open until it fires (or end of stream)
            return;
        }
        self.close(event.process_key, event.timestamp_ms, CloseReason::ProcessStop);
    }

    fn on_checkpoint(&mut self, event: &TraceEvent) {
        let id = match event.checkpoint.as_deref().and_then(CheckpointId::parse) {
            Some(id) => id,
            None => {
                self.stats.unrecognized_dropped += 1;
                return;
            }
        };
        let routed = self.route_checkpoint(event, id);
        if routed && self.config.close_on == CloseSignal::Checkpoint(id) {
            self.close(
                event.process_key,
                event.timestamp_ms,
                CloseReason::Checkpoint(id),
            );
        }
    }

    fn route_checkpoint(&mut self, event: &TraceEvent, id: CheckpointId) -> bool {
        let routed = self
            .table
            .route_checkpoint(event.process_key, id, event.timestamp_ms);
        if !routed {
            self.stats.unroutable_dropped += 1;
        }
        routed
    }

    fn on_interval(&mut self, event: &TraceEvent) {
        let key = match event.interval_key {
            Some(key) => key,
            None => {
                self.stats.unrecognized_dropped += 1;
                return;
            }
        };
        let routed = match event.category {
            EventCategory::IntervalStart => {
                self.table
                    .route_interval_start(event.process_key, key, event.timestamp_ms)
            }
            _ => self
                .table
                .route_interval_end(event.process_key, key, event.timestamp_ms),
        };
        if !routed {
            self.stats.unroutable_dropped += 1;
        }
    }

    fn close(&mut self, process_key: u32, timestamp_ms: f64, reason: CloseReason) {
        if let Some(sample) = self.table.close_session(process_key, timestamp_ms, reason) {
            self.stats.samples_emitted += 1;
            self.sink.emit(sample);
        }
        // close with no open session: expected noise, not even counted as
        // unroutable since stop events arrive for every process on the box
    }
}
