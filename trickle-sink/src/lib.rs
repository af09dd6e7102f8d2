#![deny(missing_docs)]
//! Throttled token sink for streamed LLM output.
//!
//! [`ThrottledTokenSink`] buffers incremental text and hands it to an
//! [`OutputSink`] no more than once per configured interval, measured from
//! the previous emission. Completion always flushes, even an empty buffer,
//! so no token is lost on the success path.
//!
//! ```
//! use std::time::Duration;
//! use trickle_sink::{ManualClock, MemorySink, SinkConfig, ThrottledTokenSink};
//!
//! let clock = ManualClock::new();
//! let out = MemorySink::new();
//! let mut sink = ThrottledTokenSink::with_clock(SinkConfig::default(), out.clone(), clock.clone());
//!
//! sink.push_token("Hel");
//! clock.advance(Duration::from_millis(3500));
//! sink.push_token("lo");
//! sink.finish();
//!
//! assert_eq!(out.texts(), vec!["Hello".to_string(), String::new()]);
//! ```
//!
//! One sink serves one generation request. Build a fresh one per call.

pub mod clock;
pub mod config;
pub mod output;
pub mod sink;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DEFAULT_FLUSH_INTERVAL, SinkConfig};
pub use output::{ConsoleSink, Emission, MemorySink, OutputSink, TracingSink};
pub use sink::ThrottledTokenSink;
