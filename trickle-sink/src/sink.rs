//! The throttled token sink.

use std::time::Instant;

use trickle_types::{CompletionResponse, ProviderError, StreamCallbacks};

use crate::clock::{Clock, SystemClock};
use crate::config::SinkConfig;
use crate::output::OutputSink;

/// Buffers streamed tokens and emits them at most once per interval.
///
/// State lives on the instance and is never shared: build one sink per
/// generation request. The gate is measured from the previous emission, not
/// from a fixed grid, and is checked only when a token arrives. A lone token
/// therefore waits until another token lands after the interval, or until
/// completion.
#[derive(Debug)]
pub struct ThrottledTokenSink<O, C = SystemClock> {
    config: SinkConfig,
    output: O,
    clock: C,
    buffer: String,
    last_flush: Instant,
    emissions: usize,
}

impl<O: OutputSink> ThrottledTokenSink<O, SystemClock> {
    /// A sink with the default configuration and the system clock.
    pub fn new(output: O) -> Self {
        Self::with_config(SinkConfig::default(), output)
    }

    /// A sink with the given configuration and the system clock.
    pub fn with_config(config: SinkConfig, output: O) -> Self {
        Self::with_clock(config, output, SystemClock)
    }
}

impl<O: OutputSink, C: Clock> ThrottledTokenSink<O, C> {
    /// A sink reading time from `clock`.
    ///
    /// The interval gate starts counting from construction.
    pub fn with_clock(config: SinkConfig, output: O, clock: C) -> Self {
        let last_flush = clock.now();
        Self {
            config,
            output,
            clock,
            buffer: String::new(),
            last_flush,
            emissions: 0,
        }
    }

    /// Append a token and flush if the interval has elapsed.
    pub fn push_token(&mut self, token: &str) {
        self.buffer.push_str(token);
        let now = self.clock.now();
        if now.duration_since(self.last_flush) > self.config.interval {
            self.flush_at(now);
        }
    }

    /// Flush whatever is buffered, even if it is empty.
    pub fn finish(&mut self) {
        let now = self.clock.now();
        self.flush_at(now);
    }

    /// Handle a producer error according to [`SinkConfig::flush_on_error`].
    ///
    /// Without the toggle the buffer is discarded and the output sink is not
    /// called.
    pub fn abort(&mut self) {
        if self.config.flush_on_error {
            self.finish();
        } else {
            if !self.buffer.is_empty() {
                tracing::debug!(bytes = self.buffer.len(), "discarding buffered text after error");
            }
            self.buffer.clear();
        }
    }

    /// Text received since the last emission.
    #[must_use]
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Number of emissions made so far.
    #[must_use]
    pub fn emissions(&self) -> usize {
        self.emissions
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    /// Consume the sink and return its output.
    pub fn into_output(self) -> O {
        self.output
    }

    fn flush_at(&mut self, now: Instant) {
        let timestamp = self.clock.timestamp();
        let text = std::mem::take(&mut self.buffer);
        self.output.emit(&timestamp, &text);
        self.last_flush = now;
        self.emissions += 1;
    }
}

impl<O: OutputSink, C: Clock> StreamCallbacks for ThrottledTokenSink<O, C> {
    fn on_token(&mut self, token: &str) {
        self.push_token(token);
    }

    fn on_complete(&mut self, _response: &CompletionResponse) {
        self.finish();
    }

    fn on_error(&mut self, error: &ProviderError) {
        tracing::debug!(%error, flush = self.config.flush_on_error, "generation failed");
        self.abort();
    }
}
