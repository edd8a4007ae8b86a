//! Session configuration.

use std::time::Duration;

/// Tuning for a [`RenderSession`](crate::pipeline::RenderSession).
///
/// ```ignore
/// let config = Config::default().with_yield_threshold(Duration::from_micros(500));
/// let session = RenderSession::new(host, config);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// The scheduler yields once the deadline reports less time than this.
    pub yield_threshold: Duration,
    /// Fiber slots reserved up front.
    pub arena_capacity: usize,
}

impl Config {
    pub const DEFAULT_YIELD_THRESHOLD: Duration = Duration::from_millis(1);

    pub fn with_yield_threshold(mut self, threshold: Duration) -> Self {
        self.yield_threshold = threshold;
        self
    }

    pub fn with_arena_capacity(mut self, capacity: usize) -> Self {
        self.arena_capacity = capacity;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            yield_threshold: Self::DEFAULT_YIELD_THRESHOLD,
            arena_capacity: 64,
        }
    }
}
