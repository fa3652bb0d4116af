//! Progress reporting for search runs

use mavensearch_core::ProgressEvent;
use tokio::sync::mpsc::UnboundedSender;

/// Percentage reported at the start of the first page
const PAGINATION_START: u32 = 10;
/// Span of the percentage scale covered by pagination
const PAGINATION_SPAN: u32 = 80;
/// Highest percentage reported before the terminal event
const MAX_INTERMEDIATE: u8 = 99;

/// Receiver of progress events
///
/// Called from the task running the search; implementations must not block.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

impl ProgressSink for UnboundedSender<ProgressEvent> {
    fn report(&self, event: ProgressEvent) {
        // A dropped receiver just means nobody is watching anymore
        let _ = self.send(event);
    }
}

/// Adapts a closure into a [`ProgressSink`]
pub struct FnSink<F>(pub F);

impl<F> ProgressSink for FnSink<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn report(&self, event: ProgressEvent) {
        (self.0)(event)
    }
}

/// Discards all progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Progress percentage before fetching `page` (zero-based) of at most `max_pages`
pub fn paginated_progress(page: u32, max_pages: u32) -> u8 {
    if max_pages == 0 {
        return PAGINATION_START as u8;
    }
    let done = u64::from(page.min(max_pages));
    let percent = u64::from(PAGINATION_START)
        + u64::from(PAGINATION_SPAN) * done / u64::from(max_pages);
    percent.min(u64::from(MAX_INTERMEDIATE)) as u8
}

/// Wraps a sink so a run's progress is monotonic and ends at 100 exactly once
pub(crate) struct ProgressReporter<'a> {
    sink: &'a dyn ProgressSink,
    last: u8,
    finished: bool,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            sink,
            last: 0,
            finished: false,
        }
    }

    /// Report an intermediate step, clamped to `[last, 99]`
    pub(crate) fn report(&mut self, percent: u8, note: impl Into<String>) {
        if self.finished {
            return;
        }
        let percent = percent.clamp(self.last, MAX_INTERMEDIATE);
        self.last = percent;
        self.sink.report(ProgressEvent::new(percent, note));
    }

    /// Report completion; later calls are ignored
    pub(crate) fn finish(&mut self, note: impl Into<String>) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.last = 100;
        self.sink.report(ProgressEvent::new(100, note));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<ProgressEvent>>);

    impl ProgressSink for Recorder {
        fn report(&self, event: ProgressEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    impl Recorder {
        fn percents(&self) -> Vec<u8> {
            self.0.lock().unwrap().iter().map(|e| e.percent).collect()
        }
    }

    #[test]
    fn test_paginated_progress_curve() {
        assert_eq!(paginated_progress(0, 50), 10);
        assert_eq!(paginated_progress(25, 50), 50);
        assert_eq!(paginated_progress(49, 50), 88);
        assert_eq!(paginated_progress(50, 50), 90);
        assert_eq!(paginated_progress(500, 50), 90);
        assert_eq!(paginated_progress(3, 0), 10);
    }

    #[test]
    fn test_reporter_is_monotonic_and_capped() {
        let recorder = Recorder::default();
        let mut reporter = ProgressReporter::new(&recorder);
        reporter.report(40, "a");
        reporter.report(20, "b");
        reporter.report(120, "c");
        reporter.finish("done");
        reporter.report(50, "late");
        reporter.finish("again");

        assert_eq!(recorder.percents(), vec![40, 40, 99, 100]);
    }

    #[test]
    fn test_channel_sink_ignores_closed_receiver() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        tx.report(ProgressEvent::new(5, "nobody listening"));
    }

    #[test]
    fn test_fn_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = FnSink(|event: ProgressEvent| seen.lock().unwrap().push(event.note));
        sink.report(ProgressEvent::new(1, "hello"));
        assert_eq!(*seen.lock().unwrap(), vec!["hello".to_string()]);
    }
}
