//! Progress reporting for slow model-load and download paths

use tracing::info;

/// Sink for load/download progress. Implementations must tolerate
/// repeated and equal percentages; producers report values in `0..=100`
/// that never decrease over the lifetime of one operation.
pub trait Progress: Send {
    /// Report completion of the current operation, clamped to `0..=100`.
    fn update(&mut self, percent: u8);

    /// Called once when the operation completes successfully.
    fn finish(&mut self) {
        self.update(100);
    }
}

/// Progress sink that discards all reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn update(&mut self, _percent: u8) {}
}

/// Progress sink that logs coarse steps through `tracing`.
///
/// Reports are deduplicated to 10% steps and regressions are ignored,
/// keeping the log monotonic even if a producer misbehaves.
#[derive(Debug)]
pub struct LogProgress {
    label: String,
    last_logged: Option<u8>,
}

impl LogProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            last_logged: None,
        }
    }
}

impl Progress for LogProgress {
    fn update(&mut self, percent: u8) {
        let percent = percent.min(100);
        let step = percent / 10 * 10;
        match self.last_logged {
            Some(last) if step <= last => {}
            _ => {
                info!("{}: {}%", self.label, step);
                self.last_logged = Some(step);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_progress_accepts_updates() {
        let mut sink = NoProgress;
        sink.update(0);
        sink.update(100);
        sink.finish();
    }

    #[test]
    fn test_log_progress_clamps_and_dedupes() {
        let mut sink = LogProgress::new("download");
        sink.update(5);
        assert_eq!(sink.last_logged, Some(0));
        sink.update(42);
        assert_eq!(sink.last_logged, Some(40));
        // Regression is ignored
        sink.update(10);
        assert_eq!(sink.last_logged, Some(40));
        sink.update(200);
        assert_eq!(sink.last_logged, Some(100));
    }
}
