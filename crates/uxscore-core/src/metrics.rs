//! Process-wide evaluation counters.
//!
//! Incremented at the call site without logging at info level. Call
//! [`Metrics::flush`] at the end of an evaluation to emit a single summary
//! event.

use std::sync::atomic::{AtomicU64, Ordering};

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    frames_scored: AtomicU64,
    layout_issues: AtomicU64,
    iterations_reconciled: AtomicU64,
    scans_dispatched: AtomicU64,
    scans_failed: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            frames_scored: AtomicU64::new(0),
            layout_issues: AtomicU64::new(0),
            iterations_reconciled: AtomicU64::new(0),
            scans_dispatched: AtomicU64::new(0),
            scans_failed: AtomicU64::new(0),
        }
    }

    pub fn inc_frames_scored(&self) {
        self.frames_scored.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "frames_scored", "counter incremented");
    }

    pub fn add_layout_issues(&self, count: u64) {
        if count == 0 {
            return;
        }
        self.layout_issues.fetch_add(count, Ordering::Relaxed);
        tracing::trace!(metric = "layout_issues", count, "counter incremented");
    }

    pub fn inc_iterations_reconciled(&self) {
        self.iterations_reconciled.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "iterations_reconciled", "counter incremented");
    }

    pub fn inc_scans_dispatched(&self) {
        self.scans_dispatched.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "scans_dispatched", "counter incremented");
    }

    pub fn inc_scans_failed(&self) {
        self.scans_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "scans_failed", "counter incremented");
    }

    /// Emit all counters as one `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            frames_scored = self.frames_scored(),
            layout_issues = self.layout_issues(),
            iterations_reconciled = self.iterations_reconciled(),
            scans_dispatched = self.scans_dispatched(),
            scans_failed = self.scans_failed(),
        );
    }

    pub fn frames_scored(&self) -> u64 {
        self.frames_scored.load(Ordering::Relaxed)
    }

    pub fn layout_issues(&self) -> u64 {
        self.layout_issues.load(Ordering::Relaxed)
    }

    pub fn iterations_reconciled(&self) -> u64 {
        self.iterations_reconciled.load(Ordering::Relaxed)
    }

    pub fn scans_dispatched(&self) -> u64 {
        self.scans_dispatched.load(Ordering::Relaxed)
    }

    pub fn scans_failed(&self) -> u64 {
        self.scans_failed.load(Ordering::Relaxed)
    }

    /// Zero every counter (tests).
    pub fn reset(&self) {
        self.frames_scored.store(0, Ordering::Relaxed);
        self.layout_issues.store(0, Ordering::Relaxed);
        self.iterations_reconciled.store(0, Ordering::Relaxed);
        self.scans_dispatched.store(0, Ordering::Relaxed);
        self.scans_failed.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        m.inc_frames_scored();
        m.inc_frames_scored();
        assert_eq!(m.frames_scored(), 2);

        m.add_layout_issues(3);
        m.add_layout_issues(0);
        assert_eq!(m.layout_issues(), 3);

        m.inc_iterations_reconciled();
        m.inc_scans_dispatched();
        m.inc_scans_failed();
        assert_eq!(m.iterations_reconciled(), 1);
        assert_eq!(m.scans_dispatched(), 1);
        assert_eq!(m.scans_failed(), 1);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.inc_frames_scored();
        m.add_layout_issues(4);
        m.inc_iterations_reconciled();
        m.inc_scans_dispatched();
        m.inc_scans_failed();
        m.reset();
        assert_eq!(m.frames_scored(), 0);
        assert_eq!(m.layout_issues(), 0);
        assert_eq!(m.iterations_reconciled(), 0);
        assert_eq!(m.scans_dispatched(), 0);
        assert_eq!(m.scans_failed(), 0);
    }
}
