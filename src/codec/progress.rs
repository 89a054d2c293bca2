//! Progress reporting for batch conversions.
//!
//! Conversions report through an injected observer instead of printing, so the
//! codec has no I/O of its own. Observers are shared across worker threads.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Receives progress signals from batch operations.
pub trait ProgressObserver: Sync {
    /// Called after every `interval` items have been processed.
    fn on_progress(&self, _done: usize, _total: usize) {}

    /// Called once when the whole batch has finished.
    fn on_complete(&self, _total: usize) {}
}

/// Observer that ignores every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Observer that forwards signals to the `log` facade.
#[derive(Debug, Clone)]
pub struct LogProgress {
    label: String,
}

impl LogProgress {
    /// Create a log observer; `label` names the operation in log lines.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl ProgressObserver for LogProgress {
    fn on_progress(&self, done: usize, total: usize) {
        log::info!("{}: {}/{}", self.label, done, total);
    }

    fn on_complete(&self, total: usize) {
        log::info!("{}: finished {} images", self.label, total);
    }
}

/// Observer that counts signals. Useful for tests and for callers that poll.
#[derive(Debug, Default)]
pub struct CountingProgress {
    progress_calls: AtomicUsize,
    last_done: AtomicUsize,
    completions: AtomicUsize,
    completed_total: AtomicUsize,
}

impl CountingProgress {
    /// Number of `on_progress` calls received.
    pub fn progress_calls(&self) -> usize {
        self.progress_calls.load(Ordering::SeqCst)
    }

    /// Largest `done` value reported so far.
    pub fn last_done(&self) -> usize {
        self.last_done.load(Ordering::SeqCst)
    }

    /// Number of `on_complete` calls received.
    pub fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }

    /// `total` passed to the most recent `on_complete`.
    pub fn completed_total(&self) -> usize {
        self.completed_total.load(Ordering::SeqCst)
    }
}

impl ProgressObserver for CountingProgress {
    fn on_progress(&self, done: usize, _total: usize) {
        self.progress_calls.fetch_add(1, Ordering::SeqCst);
        self.last_done.fetch_max(done, Ordering::SeqCst);
    }

    fn on_complete(&self, total: usize) {
        self.completions.fetch_add(1, Ordering::SeqCst);
        self.completed_total.store(total, Ordering::SeqCst);
    }
}

/// Thread-safe counter that fires `on_progress` every `interval` items.
pub(crate) struct ProgressTicker<'a> {
    observer: &'a dyn ProgressObserver,
    interval: usize,
    total: usize,
    done: AtomicUsize,
}

impl<'a> ProgressTicker<'a> {
    pub(crate) fn new(observer: &'a dyn ProgressObserver, interval: usize, total: usize) -> Self {
        Self {
            observer,
            interval,
            total,
            done: AtomicUsize::new(0),
        }
    }

    /// Record one finished item.
    pub(crate) fn tick(&self) {
        let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        if self.interval > 0 && done % self.interval == 0 {
            self.observer.on_progress(done, self.total);
        }
    }

    pub(crate) fn finish(&self) {
        self.observer.on_complete(self.total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_fires_on_interval() {
        let counter = CountingProgress::default();
        let ticker = ProgressTicker::new(&counter, 15, 40);
        for _ in 0..40 {
            ticker.tick();
        }
        ticker.finish();
        assert_eq!(counter.progress_calls(), 2);
        assert_eq!(counter.last_done(), 30);
        assert_eq!(counter.completions(), 1);
        assert_eq!(counter.completed_total(), 40);
    }

    #[test]
    fn test_ticker_zero_interval_is_silent() {
        let counter = CountingProgress::default();
        let ticker = ProgressTicker::new(&counter, 0, 5);
        for _ in 0..5 {
            ticker.tick();
        }
        assert_eq!(counter.progress_calls(), 0);
    }
}
