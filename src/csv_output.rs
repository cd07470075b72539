//! CSV report rendering for finalized samples
//!
//! One row per sample, millisecond values, with an explicit `n/a` marker
//! for phases whose checkpoints never fired (an empty field would be
//! indistinguishable from a rendering bug in downstream spreadsheets).
//! The header row and field order are presentation, not an engine
//! invariant.

use crate::session::Sample;

/// Marker rendered for a phase with a missing endpoint.
pub const UNAVAILABLE: &str = "n/a";

/// CSV report builder over a run's samples.
#[derive(Debug, Default)]
pub struct CsvReport {
    samples: Vec<Sample>,
}

impl CsvReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Add a sample row to the report
    pub fn add_sample(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn header() -> &'static str {
        "process_key,runtime_init_ms,entry_point_ms,host_ready_ms,request_ms,jit_total_ms"
    }

    /// Render a millisecond value, or the unavailable marker.
    fn format_phase(value: Option<f64>) -> String {
        match value {
            Some(ms) => format!("{}", ms),
            None => UNAVAILABLE.to_string(),
        }
    }

    /// Format one sample as a CSV row
    fn format_sample(sample: &Sample) -> String {
        let fields = [
            sample.process_key.to_string(),
            Self::format_phase(sample.runtime_init_ms),
            Self::format_phase(sample.entry_point_ms),
            Self::format_phase(sample.host_ready_ms),
            Self::format_phase(sample.request_ms),
            format!("{}", sample.jit_total_ms),
        ];
        fields.join(",")
    }

    /// Generate the full CSV document as a string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(Self::header());
        output.push('\n');

        for sample in &self.samples {
            output.push_str(&Self::format_sample(sample));
            output.push('\n');
        }

        output
    }
}
