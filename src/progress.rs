//! Progress reporting for long-running paint invocations
//!
//! The engine reports a monotonically non-decreasing fraction in [0, 1] at a
//! fixed cadence during the stroke loop. UI event pumping belongs to the
//! caller; the engine only ever talks to this sink.

/// Receives progress fractions from the engine.
pub trait ProgressSink {
    /// Called with a fraction in [0, 1]. Never decreases within one invocation.
    fn report(&mut self, fraction: f64);
}

/// Discards all progress reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _fraction: f64) {}
}

impl<F: FnMut(f64)> ProgressSink for F {
    fn report(&mut self, fraction: f64) {
        self(fraction);
    }
}
