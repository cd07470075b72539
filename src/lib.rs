//! Despegue - startup latency profiler over decoded trace events
//!
//! This library provides the core functionality for correlating an
//! interleaved stream of process/runtime/host trace events into
//! per-process sessions and finalizing each into one startup-latency
//! sample suitable for CSV export.

pub mod cli;
pub mod correlator;
pub mod csv_output;
pub mod event;
pub mod interval;
pub mod session;
pub mod session_table;
pub mod trace_source;
