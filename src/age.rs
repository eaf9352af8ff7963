use crate::layout::decode;

const SECOND: f64 = 1_000.0;
const MINUTE: f64 = 60.0 * SECOND;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const WEEK: f64 = 7.0 * DAY;
const MONTH: f64 = 30.44 * DAY;
const YEAR: f64 = 365.25 * DAY;
const DECADE: f64 = 10.0 * YEAR;

/// Unit for reporting how long ago an id was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    /// 30.44 days
    Months,
    /// 365.25 days
    Years,
    Decades,
}

impl AgeUnit {
    /// Length of one unit in milliseconds.
    pub fn millis(self) -> f64 {
        match self {
            AgeUnit::Seconds => SECOND,
            AgeUnit::Minutes => MINUTE,
            AgeUnit::Hours => HOUR,
            AgeUnit::Days => DAY,
            AgeUnit::Weeks => WEEK,
            AgeUnit::Months => MONTH,
            AgeUnit::Years => YEAR,
            AgeUnit::Decades => DECADE,
        }
    }
}

/// Age of `id` at `now` (milliseconds since the Unix epoch), in `unit`.
///
/// Negative when the id's timestamp lies in the future.
pub fn age(id: i64, epoch: i64, now: i64, unit: AgeUnit) -> f64 {
    let elapsed = now.wrapping_sub(decode(id, epoch).timestamp);
    elapsed as f64 / unit.millis()
}
