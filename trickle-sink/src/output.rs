//! Downstream receivers of emitted text.

use std::io::{self, Stdout, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Receiver of `(timestamp, text)` emissions.
///
/// The same logical message may be emitted many times in pieces; an
/// implementation must accept repeated calls. Emission never fails from the
/// sink's point of view, so implementations handle their own I/O errors.
pub trait OutputSink {
    /// Receive one emission.
    fn emit(&mut self, timestamp: &str, text: &str);
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn emit(&mut self, timestamp: &str, text: &str) {
        (**self).emit(timestamp, text);
    }
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn emit(&mut self, timestamp: &str, text: &str) {
        (**self).emit(timestamp, text);
    }
}

/// Writes `HH:MM:SS: <text>` lines to a writer (stdout by default).
#[derive(Debug)]
pub struct ConsoleSink<W = Stdout> {
    writer: W,
}

impl ConsoleSink<Stdout> {
    /// A sink printing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl Default for ConsoleSink<Stdout> {
    fn default() -> Self {
        Self::stdout()
    }
}

impl<W: Write> ConsoleSink<W> {
    /// A sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for ConsoleSink<W> {
    fn emit(&mut self, timestamp: &str, text: &str) {
        let result = writeln!(self.writer, "{timestamp}: {text}").and_then(|()| self.writer.flush());
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to write emission");
        }
    }
}

/// Emits each flush as a `tracing` event at `INFO`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn emit(&mut self, timestamp: &str, text: &str) {
        tracing::info!(target: "trickle::output", timestamp, text, "emission");
    }
}

/// One recorded emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    /// Wall-clock label, `HH:MM:SS`.
    pub timestamp: String,
    /// The flushed text.
    pub text: String,
}

/// Collects emissions in memory.
///
/// Clones share the same log, so one handle can be given away and the other
/// kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    log: Arc<Mutex<Vec<Emission>>>,
}

impl MemorySink {
    /// An empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything emitted so far, in order.
    #[must_use]
    pub fn emissions(&self) -> Vec<Emission> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Just the emitted texts, in order.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.emissions().into_iter().map(|e| e.text).collect()
    }

    /// Number of emissions so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing has been emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OutputSink for MemorySink {
    fn emit(&mut self, timestamp: &str, text: &str) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Emission {
                timestamp: timestamp.to_string(),
                text: text.to_string(),
            });
    }
}
