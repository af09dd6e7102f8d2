//! Configuration for [`ThrottledTokenSink`](crate::ThrottledTokenSink).

use std::time::Duration;

/// Default minimum time between two token-triggered emissions.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(3);

/// Static configuration for a throttled sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Minimum time since the last emission before a new token triggers one.
    ///
    /// The comparison is strict: a token arriving exactly `interval` after the
    /// previous emission does not flush.
    pub interval: Duration,

    /// Flush the buffered remainder when the producer reports an error.
    ///
    /// When `false` (the default) the remainder is discarded and nothing
    /// reaches the output sink.
    pub flush_on_error: bool,
}

impl SinkConfig {
    /// Override the flush interval.
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Override the error behaviour.
    #[must_use]
    pub fn flush_on_error(mut self, flush: bool) -> Self {
        self.flush_on_error = flush;
        self
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_FLUSH_INTERVAL,
            flush_on_error: false,
        }
    }
}
