// ABOUTME: Timing guard built on tracing spans for engine operations
// ABOUTME: Records elapsed time on drop and warns when an operation runs long

use std::time::{Duration, Instant};
use tracing::{Level, Span, field, span, warn};

/// Timer guard that records elapsed time when dropped
pub struct OperationTimer {
    span: Span,
    start: Instant,
    operation: &'static str,
    warn_threshold: Option<Duration>,
}

impl OperationTimer {
    pub fn new(operation: &'static str) -> Self {
        let span = span!(Level::DEBUG, "operation", name = operation, elapsed_ms = field::Empty);

        Self {
            span,
            start: Instant::now(),
            operation,
            warn_threshold: None,
        }
    }

    /// Operations taking longer than `threshold` log a warning
    pub fn with_warn_threshold(mut self, threshold: Duration) -> Self {
        self.warn_threshold = Some(threshold);
        self
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        #[allow(clippy::cast_precision_loss)]
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

        self.span.record("elapsed_ms", elapsed_ms);

        if let Some(threshold) = self.warn_threshold
            && elapsed > threshold
        {
            warn!(
                operation = self.operation,
                elapsed_ms,
                threshold_ms = threshold.as_millis() as u64,
                "Slow operation detected"
            );
        }
    }
}
