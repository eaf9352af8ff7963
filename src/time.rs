use chrono::Utc;

/// A source of wall-clock milliseconds since the Unix epoch.
///
/// The generator reads the clock once per id and again while waiting for the
/// next millisecond after the sequence is exhausted. Implement this to drive
/// the generator from a simulated clock.
pub trait TimeSource {
    /// Returns the current time in milliseconds since 1970-01-01T00:00:00Z.
    fn current_millis(&self) -> i64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
