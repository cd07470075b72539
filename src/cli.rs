//! CLI argument parsing for Despegue

use crate::correlator::CloseSignal;
use crate::event::CheckpointId;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Which event finalizes a session (CLI surface for [`CloseSignal`])
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CloseOn {
    /// OS-level process exit (default)
    ProcessStop,
    /// The RequestStop checkpoint, for traces where process exit is not
    /// recorded reliably
    RequestStop,
    /// The HostStarted checkpoint, for startup-only traces with no
    /// request phase
    HostStarted,
}

impl From<CloseOn> for CloseSignal {
    fn from(value: CloseOn) -> Self {
        match value {
            CloseOn::ProcessStop => CloseSignal::ProcessStop,
            CloseOn::RequestStop => CloseSignal::Checkpoint(CheckpointId::RequestStop),
            CloseOn::HostStarted => CloseSignal::Checkpoint(CheckpointId::HostStarted),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "despegue")]
#[command(version)]
#[command(about = "Correlates decoded trace events into per-process startup latency samples", long_about = None)]
pub struct Cli {
    /// Path to the decoded trace file (JSON lines, one event per line)
    pub trace_file: PathBuf,

    /// Path of the CSV report to create
    pub report_file: PathBuf,

    /// Only open/close sessions for process events from this image name
    /// (e.g., -i w3wp); checkpoint and interval events route by pid
    #[arg(short = 'i', long = "image", value_name = "NAME")]
    pub image: Option<String>,

    /// Event that finalizes a session
    #[arg(long = "close-on", value_enum, default_value = "process-stop")]
    pub close_on: CloseOn,

    /// Print a per-run summary of dispatch counters to stderr
    #[arg(short = 'c', long = "summary")]
    pub summary: bool,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
