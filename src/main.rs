use anyhow::{Context, Result};
use clap::Parser;
use despegue::correlator::{Correlator, CorrelatorConfig, DispatchStats};
use despegue::csv_output::CsvReport;
use despegue::trace_source::TraceSource;
use despegue::{cli::Cli, session::Sample};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Print dispatch counters to stderr (-c flag)
fn print_summary(stats: &DispatchStats) {
    eprintln!();
    eprintln!("correlation summary");
    eprintln!("─────────────────────────────");
    eprintln!("{:<22} {:>6}", "events seen", stats.events_seen);
    eprintln!("{:<22} {:>6}", "samples emitted", stats.samples_emitted);
    eprintln!("{:<22} {:>6}", "unroutable dropped", stats.unroutable_dropped);
    eprintln!(
        "{:<22} {:>6}",
        "unrecognized dropped", stats.unrecognized_dropped
    );
    eprintln!("{:<22} {:>6}", "stale evictions", stats.stale_evictions);
    eprintln!("{:<22} {:>6}", "open at end", stats.discarded_open);
    eprintln!("─────────────────────────────");
}

/// Consume the whole trace and return the finalized samples plus counters.
/// The first trace-source fault aborts the run; no report is written.
fn correlate(args: &Cli) -> Result<(Vec<Sample>, DispatchStats)> {
    let source = TraceSource::open(&args.trace_file)
        .with_context(|| format!("cannot open trace file {}", args.trace_file.display()))?;

    let config = CorrelatorConfig {
        monitored_image: args.image.clone(),
        close_on: args.close_on.into(),
    };
    let mut correlator = Correlator::new(config, Vec::new());

    for event in source {
        let event = event.context("trace source failed")?;
        correlator.dispatch(event);
    }

    let stats = correlator.finish();
    Ok((correlator.into_sink(), stats))
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    // all-or-nothing: the report file is only created after the entire
    // input has been correlated and rendered
    let (samples, stats) = correlate(&args)?;
    let report = CsvReport::from_samples(samples);
    std::fs::write(&args.report_file, report.to_csv())
        .with_context(|| format!("cannot write report file {}", args.report_file.display()))?;

    if args.summary {
        print_summary(&stats);
    }
    eprintln!(
        "{} sample(s) written to {}",
        report.len(),
        args.report_file.display()
    );

    Ok(())
}
