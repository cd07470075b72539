//! Keyed start/end interval matching
//!
//! Pairs IntervalStart with IntervalEnd events that share a correlation
//! key, accumulating the matched durations into a running total. Used for
//! cumulative JIT time, but carries no JIT-specific logic: any start/stop
//! event pair keyed by a correlation id can feed it.
//!
//! Many intervals may be open at once (concurrent compilation); each key is
//! tracked independently. A single-slot "most recent start" shortcut
//! misattributes durations as soon as two intervals overlap.

use std::collections::HashMap;

/// Matches start/end pairs for one owning session.
///
/// Policies (both deliberate, both tested):
/// - duplicate start for an open key: last start wins, the prior
///   registration is treated as stale and discarded
/// - end with no matching start: ignored (interval opened before
///   monitoring began, or key collision from an unrelated provider)
#[derive(Debug, Clone, Default)]
pub struct IntervalMatcher {
    open: HashMap<u64, f64>,
    total_ms: f64,
}

impl IntervalMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an open interval. Returns the start timestamp it replaced
    /// when the key was already open (stale registration).
    pub fn on_start(&mut self, interval_key: u64, timestamp_ms: f64) -> Option<f64> {
        self.open.insert(interval_key, timestamp_ms)
    }

    /// Close an open interval and fold its duration into the total.
    /// Returns the matched duration, or `None` when no start was open
    /// under this key.
    pub fn on_end(&mut self, interval_key: u64, timestamp_ms: f64) -> Option<f64> {
        let start = self.open.remove(&interval_key)?;
        let duration = timestamp_ms - start;
        self.total_ms += duration;
        Some(duration)
    }

    /// Sum of all matched durations so far, in milliseconds.
    pub fn total_ms(&self) -> f64 {
        self.total_ms
    }

    /// Number of currently open intervals.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pair_matches() {
        let mut matcher = IntervalMatcher::new();
        assert_eq!(matcher.on_start(9, 130.0), None);
        assert_eq!(matcher.on_end(9, 145.0), Some(15.0));
        assert_eq!(matcher.total_ms(), 15.0);
        assert_eq!(matcher.open_count(), 0);
    }

    #[test]
    fn test_overlapping_pairs_accumulate_independently() {
        // a opens, b opens, b closes, a closes: total must be per-key,
        // not whatever a single most-recent-start slot would produce
        let mut matcher = IntervalMatcher::new();
        matcher.on_start(0xa, 10.0);
        matcher.on_start(0xb, 12.0);
        assert_eq!(matcher.open_count(), 2);
        assert_eq!(matcher.on_end(0xb, 20.0), Some(8.0));
        assert_eq!(matcher.on_end(0xa, 25.0), Some(15.0));
        assert_eq!(matcher.total_ms(), 23.0);
    }

    #[test]
    fn test_duplicate_start_last_wins() {
        let mut matcher = IntervalMatcher::new();
        matcher.on_start(5, 100.0);
        // same key starts again without an end: the first start is stale
        assert_eq!(matcher.on_start(5, 110.0), Some(100.0));
        assert_eq!(matcher.on_end(5, 115.0), Some(5.0));
        assert_eq!(matcher.total_ms(), 5.0);
        assert_eq!(matcher.open_count(), 0);
    }

    #[test]
    fn test_unmatched_end_ignored() {
        let mut matcher = IntervalMatcher::new();
        assert_eq!(matcher.on_end(42, 50.0), None);
        assert_eq!(matcher.total_ms(), 0.0);
    }

    #[test]
    fn test_key_reuse_after_close() {
        let mut matcher = IntervalMatcher::new();
        matcher.on_start(1, 0.0);
        matcher.on_end(1, 10.0);
        matcher.on_start(1, 20.0);
        matcher.on_end(1, 26.0);
        assert_eq!(matcher.total_ms(), 16.0);
    }

    #[test]
    fn test_many_concurrent_intervals() {
        let mut matcher = IntervalMatcher::new();
        for key in 0..100u64 {
            matcher.on_start(key, key as f64);
        }
        assert_eq!(matcher.open_count(), 100);
        // close in reverse order; each duration is exactly 10ms
        for key in (0..100u64).rev() {
            assert_eq!(matcher.on_end(key, key as f64 + 10.0), Some(10.0));
        }
        assert_eq!(matcher.total_ms(), 1000.0);
        assert_eq!(matcher.open_count(), 0);
    }
}
