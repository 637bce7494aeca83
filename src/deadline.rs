//! Monotonic wall-clock deadline shared by the BFS analyzer and the search
//! driver, grounded in the original bot's `time.monotonic()` discipline.
use std::time::{Duration, Instant};

/// An absolute point in time, cheap to copy and compare. `expired()` is
/// checked at every BFS dequeue and before every `Transition` call inside the
/// search, per `spec.md` §5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Instant);

impl Deadline {
    /// a deadline `budget` from now
    pub fn after(budget: Duration) -> Self {
        Deadline(Instant::now() + budget)
    }

    /// a deadline that has already passed
    pub fn already_expired() -> Self {
        Deadline(Instant::now())
    }

    /// whether this deadline has passed
    pub fn expired(&self) -> bool {
        Instant::now() >= self.0
    }

    /// time remaining, zero if already expired
    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }

    /// a deadline a quarter of the way to this one, used to budget the BFS
    /// analyzer out of the overall per-tick budget (`spec.md` §4.8).
    pub fn quarter_from(start: Instant, full_budget: Duration) -> Self {
        Deadline(start + full_budget / 4)
    }
}
