//! Time sources for the sink.
//!
//! The sink needs two readings: a monotonic instant for the interval gate and
//! a wall-clock label for each emission. Both come from one [`Clock`] so tests
//! can drive time by hand with [`ManualClock`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{NaiveTime, TimeDelta};

/// Format of the wall-clock label attached to each emission.
const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// Source of monotonic time and wall-clock labels.
pub trait Clock {
    /// Current monotonic instant.
    fn now(&self) -> Instant;

    /// Current wall-clock time formatted as `HH:MM:SS`.
    fn timestamp(&self) -> String;
}

/// The real clock: [`Instant::now`] and local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn timestamp(&self) -> String {
        chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to the sink.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    wall_start: NaiveTime,
    offset_nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// A clock whose wall-clock label starts at `00:00:00`.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(NaiveTime::default())
    }

    /// A clock whose wall-clock label starts at `wall_start`.
    #[must_use]
    pub fn starting_at(wall_start: NaiveTime) -> Self {
        Self {
            origin: Instant::now(),
            wall_start,
            offset_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move time forward. Saturates instead of wrapping, so time never goes
    /// backwards.
    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        // The closure always returns Some, so the update cannot fail.
        let _ = self
            .offset_nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(nanos))
            });
    }

    /// Time elapsed since the clock was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn timestamp(&self) -> String {
        let elapsed = i64::try_from(self.elapsed().as_millis()).unwrap_or(i64::MAX);
        let wall = self.wall_start + TimeDelta::milliseconds(elapsed);
        wall.format(TIMESTAMP_FORMAT).to_string()
    }
}
