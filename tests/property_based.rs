//! Property-based tests for the correlation core
//!
//! Core properties tested:
//! 1. Interval matching is exact under any interleaving of distinct keys
//! 2. Checkpoint application is idempotent (first-wins)
//! 3. Dispatch never panics on arbitrary event streams
//! 4. Samples are never emitted without a close signal

use despegue::correlator::{Correlator, CorrelatorConfig};
use despegue::event::{CheckpointId, EventCategory, TraceEvent};
use despegue::interval::IntervalMatcher;
use despegue::session::{CloseReason, Session};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_interval_total_independent_of_end_order(
        starts in prop::collection::vec(0.0f64..1000.0, 1..20),
        end_order in prop::collection::vec(any::<prop::sample::Index>(), 1..20),
    ) {
        // Property: with N distinct keys, the accumulated total equals the
        // exact per-key sum regardless of the order ends arrive in
        let mut matcher = IntervalMatcher::new();
        let mut expected = 0.0;
        for (key, start) in starts.iter().enumerate() {
            matcher.on_start(key as u64, *start);
            expected += 100.0; // every interval lasts exactly 100ms
        }

        let mut keys: Vec<u64> = (0..starts.len() as u64).collect();
        // permute close order using the generated indices
        for (i, idx) in end_order.iter().enumerate() {
            let j = idx.index(keys.len());
            let i = i % keys.len();
            keys.swap(i, j);
        }
        for key in keys {
            let start = starts[key as usize];
            let duration = matcher.on_end(key, start + 100.0);
            prop_assert!(duration.is_some());
            prop_assert!((duration.unwrap() - 100.0).abs() < 1e-6);
        }

        prop_assert!((matcher.total_ms() - expected).abs() < 1e-6);
        prop_assert_eq!(matcher.open_count(), 0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_checkpoint_idempotent(
        first in 0.0f64..1000.0,
        repeats in prop::collection::vec(0.0f64..1000.0, 0..10),
    ) {
        // Property: duplicate checkpoints never change the recorded value
        let mut session = Session::new(1, 0.0);
        session.apply_checkpoint(CheckpointId::EnteringMain, first);
        for ts in repeats {
            session.apply_checkpoint(CheckpointId::EnteringMain, ts);
        }
        prop_assert_eq!(session.checkpoint(CheckpointId::EnteringMain), Some(first));
    }
}

fn arb_event() -> impl Strategy<Value = TraceEvent> {
    let category = prop_oneof![
        Just(EventCategory::ProcessStart),
        Just(EventCategory::ProcessStop),
        Just(EventCategory::RuntimeStart),
        Just(EventCategory::IntervalStart),
        Just(EventCategory::IntervalEnd),
        Just(EventCategory::Checkpoint),
    ];
    (
        category,
        0u32..8,
        0.0f64..10_000.0,
        prop::option::of(0u64..6),
        prop::option::of("[A-Za-z]{1,12}"),
        "[a-z]{1,6}",
    )
        .prop_map(
            |(category, process_key, timestamp_ms, interval_key, checkpoint, source_tag)| {
                TraceEvent {
                    timestamp_ms,
                    category,
                    process_key,
                    interval_key,
                    checkpoint,
                    source_tag,
                }
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_dispatch_never_panics(events in prop::collection::vec(arb_event(), 0..200)) {
        // Property: arbitrary event soup (missing keys, unknown names,
        // unroutable pids) is absorbed without panics or fatal failures
        let mut correlator = Correlator::new(CorrelatorConfig::default(), Vec::new());
        let close_count = events
            .iter()
            .filter(|e| e.category == EventCategory::ProcessStop)
            .count() as u64;
        for event in events {
            correlator.dispatch(event);
        }
        let stats = correlator.finish();

        // no sample without a close signal
        prop_assert!(stats.samples_emitted <= close_count);
        prop_assert_eq!(correlator.open_sessions(), 0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_one_sample_per_start_close_pair(pids in prop::collection::vec(0u32..5, 1..30)) {
        // Property: for clean start/close pairs every close emits exactly
        // one sample belonging to the matching start
        let mut correlator = Correlator::new(CorrelatorConfig::default(), Vec::new());
        let mut ts = 0.0;
        for pid in &pids {
            correlator.dispatch(TraceEvent::lifecycle(
                EventCategory::ProcessStart, *pid, ts, "w3wp",
            ));
            ts += 1.0;
            correlator.dispatch(TraceEvent::lifecycle(
                EventCategory::ProcessStop, *pid, ts, "w3wp",
            ));
            ts += 1.0;
        }
        let stats = correlator.finish();
        let samples = correlator.into_sink();

        prop_assert_eq!(samples.len(), pids.len());
        prop_assert_eq!(stats.samples_emitted as usize, pids.len());
        prop_assert_eq!(stats.stale_evictions, 0);
        for (sample, pid) in samples.iter().zip(&pids) {
            prop_assert_eq!(sample.process_key, *pid);
            prop_assert_eq!(sample.close_reason, CloseReason::ProcessStop);
        }
    }
}
