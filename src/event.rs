//! Trace event model
//!
//! Canonical shape of a decoded trace event plus the closed set of
//! checkpoint identifiers the correlation engine understands. Events are
//! decoded from JSON-lines by the trace source; anything outside the
//! recognized categories/names is noise and is dropped by the correlator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Event category emitted by the tracing facility or the instrumented host.
///
/// Closed set: the engine never subtypes events. `Checkpoint` carries a
/// milestone name that is parsed separately (see [`CheckpointId`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// OS-level process creation
    ProcessStart,
    /// OS-level process exit
    ProcessStop,
    /// Managed runtime finished initializing inside the process
    RuntimeStart,
    /// Start of one keyed sub-operation (e.g., one method being jitted)
    IntervalStart,
    /// End of one keyed sub-operation
    IntervalEnd,
    /// Named application/host milestone
    Checkpoint,
}

/// A single decoded trace event.
///
/// Timestamps are relative milliseconds since trace start. Ordering is
/// guaranteed only within one category from one source; cross-category
/// jitter is expected and must not be assumed away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Relative timestamp in milliseconds (never negative)
    pub timestamp_ms: f64,
    /// Event category
    pub category: EventCategory,
    /// Process id; stable for one process lifetime, reusable by the OS
    pub process_key: u32,
    /// Sub-operation correlation id; only on IntervalStart/IntervalEnd
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_key: Option<u64>,
    /// Milestone name; only on Checkpoint events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<String>,
    /// Emitting component (image or provider name)
    #[serde(default)]
    pub source_tag: String,
}

/// Milestones a session records, in rough firing order.
///
/// `RuntimeStart` is applied from its own event category and has no wire
/// name; the other four are parsed from `Checkpoint` event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckpointId {
    RuntimeStart,
    EnteringMain,
    HostStarted,
    RequestStart,
    RequestStop,
}

impl CheckpointId {
    /// Parse a checkpoint event name. Unknown names are expected noise
    /// from unrelated providers and yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "EnteringMain" => Some(Self::EnteringMain),
            "HostStarted" => Some(Self::HostStarted),
            "RequestStart" => Some(Self::RequestStart),
            "RequestStop" => Some(Self::RequestStop),
            _ => None,
        }
    }

    /// Wire name used in checkpoint events and diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::RuntimeStart => "RuntimeStart",
            Self::EnteringMain => "EnteringMain",
            Self::HostStarted => "HostStarted",
            Self::RequestStart => "RequestStart",
            Self::RequestStop => "RequestStop",
        }
    }
}

impl fmt::Display for CheckpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TraceEvent {
    /// Convenience constructor for events that carry no interval key or
    /// checkpoint name (process/runtime lifecycle events).
    pub fn lifecycle(
        category: EventCategory,
        process_key: u32,
        timestamp_ms: f64,
        source_tag: &str,
    ) -> Self {
        Self {
            timestamp_ms,
            category,
            process_key,
            interval_key: None,
            checkpoint: None,
            source_tag: source_tag.to_string(),
        }
    }

    /// Convenience constructor for a named checkpoint event.
    pub fn checkpoint(process_key: u32, name: &str, timestamp_ms: f64, source_tag: &str) -> Self {
        Self {
            timestamp_ms,
            category: EventCategory::Checkpoint,
            process_key,
            interval_key: None,
            checkpoint: Some(name.to_string()),
            source_tag: source_tag.to_string(),
        }
    }

    /// Convenience constructor for an interval start/end event.
    pub fn interval(
        category: EventCategory,
        process_key: u32,
        interval_key: u64,
        timestamp_ms: f64,
        source_tag: &str,
    ) -> Self {
        Self {
            timestamp_ms,
            category,
            process_key,
            interval_key: Some(interval_key),
            checkpoint: None,
            source_tag: source_tag.to_string(),
        }
    }
}
