//! Progress reporting abstraction
//!
//! Defines the `ProgressReporter` trait implemented by every consumer of
//! assembly progress, a no-op implementation, a logging implementation, and
//! the aggregating adapter used for alternate-edition fan-out.
//!
//! The engine never blocks on how progress is displayed; reporters must
//! return promptly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// What a progress update counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressKind {
    /// Images inlined during export
    Image,
    /// Sub-pages fetched and transformed during one assembly
    Subpage,
    /// Access probes during batch discovery
    CheckAccess,
}

/// Sink for assembly progress and error messages
///
/// Implementations range from full UI updates to silent aggregation; the
/// same core assembly logic drives all of them.
pub trait ProgressReporter: Send + Sync {
    /// Report `done` out of `total` for one progress kind.
    /// `done` increases monotonically within one assembly run.
    fn update_progress(&self, kind: ProgressKind, done: usize, total: usize);

    /// Record a human-readable error message for display
    fn add_error_message(&self, text: &str);

    /// Record an error that must survive subsequent `clear` calls.
    /// Used by the batch orchestrator for per-book failures.
    fn add_permanent_error(&self, text: &str) {
        self.add_error_message(text);
    }

    /// Report that the current operation finished
    fn on_done(&self, text: &str);

    /// Reset transient display state between batch items
    fn clear(&self) {}
}

/// Reporter that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn update_progress(&self, _kind: ProgressKind, _done: usize, _total: usize) {}

    #[inline(always)]
    fn add_error_message(&self, _text: &str) {}

    #[inline(always)]
    fn on_done(&self, _text: &str) {}
}

/// Reporter that writes progress to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn update_progress(&self, kind: ProgressKind, done: usize, total: usize) {
        let label = match kind {
            ProgressKind::Image => "images",
            ProgressKind::Subpage => "pages",
            ProgressKind::CheckAccess => "access checks",
        };
        log::info!("{label}: {done}/{total}");
    }

    fn add_error_message(&self, text: &str) {
        log::error!("{text}");
    }

    fn on_done(&self, text: &str) {
        log::info!("{text}");
    }
}

/// Shared sub-page counters for one edition fan-out
///
/// Maps edition index to its latest `(done, total)`. Totals are provisional
/// until every edition has reported at least once.
pub type EditionCounters = Arc<Mutex<HashMap<usize, (usize, usize)>>>;

/// Adapter that merges sub-page progress from one edition into a combined
/// stream on the original reporter.
///
/// Each concurrently assembled edition gets its own adapter over the same
/// shared counters; sub-page counts are summed additively across editions.
/// Non-subpage progress and done signals from editions are swallowed, while
/// error messages pass through.
pub struct EditionProgress {
    inner: Arc<dyn ProgressReporter>,
    counters: EditionCounters,
    index: usize,
}

impl EditionProgress {
    pub fn new(inner: Arc<dyn ProgressReporter>, counters: EditionCounters, index: usize) -> Self {
        Self {
            inner,
            counters,
            index,
        }
    }
}

impl ProgressReporter for EditionProgress {
    fn update_progress(&self, kind: ProgressKind, done: usize, total: usize) {
        if kind != ProgressKind::Subpage {
            return;
        }
        let (combined_done, combined_total) = {
            let mut counters = match self.counters.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            counters.insert(self.index, (done, total));
            counters
                .values()
                .fold((0, 0), |(d, t), (done, total)| (d + done, t + total))
        };
        self.inner
            .update_progress(ProgressKind::Subpage, combined_done, combined_total);
    }

    fn add_error_message(&self, text: &str) {
        self.inner.add_error_message(text);
    }

    fn on_done(&self, _text: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        updates: Mutex<Vec<(ProgressKind, usize, usize)>>,
        errors: Mutex<Vec<String>>,
    }

    impl ProgressReporter for Recording {
        fn update_progress(&self, kind: ProgressKind, done: usize, total: usize) {
            self.updates.lock().unwrap().push((kind, done, total));
        }

        fn add_error_message(&self, text: &str) {
            self.errors.lock().unwrap().push(text.to_string());
        }

        fn on_done(&self, _text: &str) {}
    }

    #[test]
    fn edition_counts_are_summed_additively() {
        let recording = Arc::new(Recording::default());
        let counters: EditionCounters = Arc::default();

        let first = EditionProgress::new(recording.clone(), counters.clone(), 1);
        let second = EditionProgress::new(recording.clone(), counters.clone(), 2);

        first.update_progress(ProgressKind::Subpage, 1, 4);
        second.update_progress(ProgressKind::Subpage, 2, 3);
        first.update_progress(ProgressKind::Subpage, 2, 4);

        let updates = recording.updates.lock().unwrap();
        assert_eq!(
            *updates,
            vec![
                (ProgressKind::Subpage, 1, 4),
                (ProgressKind::Subpage, 3, 7),
                (ProgressKind::Subpage, 4, 7),
            ]
        );
    }

    #[test]
    fn non_subpage_progress_is_swallowed() {
        let recording = Arc::new(Recording::default());
        let adapter = EditionProgress::new(recording.clone(), Arc::default(), 0);

        adapter.update_progress(ProgressKind::Image, 1, 2);
        adapter.on_done("ignored");
        adapter.add_error_message("kept");

        assert!(recording.updates.lock().unwrap().is_empty());
        assert_eq!(*recording.errors.lock().unwrap(), vec!["kept".to_string()]);
    }
}
