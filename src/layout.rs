//! Bit layout of a snowflake id and the pure functions built on it.
//!
//! ```text
//!  ... timestamp - epoch ... | worker id (5) | sequence (12)
//! ```
//!
//! Ids stay below 2^53 for the next few thousand years, so they survive a
//! round trip through an IEEE-754 double.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fmt;
use std::num::IntErrorKind;

/// bit length of worker id
pub const BIT_LEN_WORKER_ID: u32 = 5;
/// bit length of sequence number
pub const BIT_LEN_SEQUENCE: u32 = 12;
/// shift of the worker id field
pub const WORKER_SHIFT: u32 = BIT_LEN_SEQUENCE;
/// shift of the timestamp field
pub const TIMESTAMP_SHIFT: u32 = WORKER_SHIFT + BIT_LEN_WORKER_ID;
/// largest worker id
pub const MAX_WORKER_ID: i64 = (1 << BIT_LEN_WORKER_ID) - 1;
/// largest sequence number within one millisecond
pub const MAX_SEQUENCE: i64 = (1 << BIT_LEN_SEQUENCE) - 1;
/// 2015-01-01T00:00:00Z in milliseconds.
pub const DEFAULT_EPOCH: i64 = 1_420_070_400_000;

/// mask for sequence number
const MASK_SEQUENCE: i64 = MAX_SEQUENCE;
/// mask for worker id, applied after shifting
const MASK_WORKER_ID: i64 = MAX_WORKER_ID;

/// Pack a timestamp, worker id and sequence into an id.
///
/// The caller keeps `timestamp >= epoch`, `worker_id <= 31` and
/// `sequence <= 4095`; nothing is re-checked here. Use [`validate`] to check
/// an id after the fact.
pub fn encode(timestamp: i64, worker_id: u8, sequence: u16, epoch: i64) -> i64 {
    (timestamp.wrapping_sub(epoch) << TIMESTAMP_SHIFT)
        | (i64::from(worker_id) << WORKER_SHIFT)
        | i64::from(sequence)
}

/// DecomposedSnowflake is the parts of a Snowflake ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecomposedSnowflake {
    pub id: i64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub worker_id: i64,
    pub sequence: i64,
    /// `timestamp` rendered in UTC.
    pub human_timestamp: String,
}

impl DecomposedSnowflake {
    /// Returns the timestamp as a UTC date, or `None` when it is outside the
    /// range chrono can represent.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Break a Snowflake ID up into its parts.
///
/// Total over every `i64`: ids that were not produced by [`encode`] decode
/// to meaningless but well-formed parts.
pub fn decode(id: i64, epoch: i64) -> DecomposedSnowflake {
    // arithmetic shift is floor division, so negative ids stay total
    let timestamp = (id >> TIMESTAMP_SHIFT).wrapping_add(epoch);
    DecomposedSnowflake {
        id,
        timestamp,
        worker_id: (id >> WORKER_SHIFT) & MASK_WORKER_ID,
        sequence: id & MASK_SEQUENCE,
        human_timestamp: human_timestamp(timestamp),
    }
}

fn human_timestamp(timestamp: i64) -> String {
    match DateTime::from_timestamp_millis(timestamp) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string(),
        None => format!("{timestamp} ms since 1970-01-01 UTC"),
    }
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    NotAnInteger(String),
    /// An integer that does not fit in an `i64`.
    OutOfRange(String),
    Negative(i64),
    BeforeEpoch { timestamp: i64, epoch: i64 },
    WorkerIdOutOfRange(i64),
    SequenceOutOfRange(i64),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    /// Human readable reason, `"Valid snowflake"` for valid ids.
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// The `(is_valid, reason)` pair.
    pub fn into_pair(self) -> (bool, String) {
        (self.is_valid(), self.reason())
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validation::Valid => f.write_str("Valid snowflake"),
            Validation::NotAnInteger(raw) => write!(f, "`{raw}` is not an integer"),
            Validation::OutOfRange(raw) => write!(f, "`{raw}` does not fit in a 64-bit id"),
            Validation::Negative(id) => write!(f, "id `{id}` is negative"),
            Validation::BeforeEpoch { timestamp, epoch } => {
                write!(f, "timestamp `{timestamp}` is before epoch `{epoch}`")
            }
            Validation::WorkerIdOutOfRange(worker_id) => {
                write!(f, "worker id `{worker_id}` is outside 0..={MAX_WORKER_ID}")
            }
            Validation::SequenceOutOfRange(sequence) => {
                write!(f, "sequence `{sequence}` is outside 0..={MAX_SEQUENCE}")
            }
        }
    }
}

/// Check that `id` is a structurally valid snowflake under `epoch`.
pub fn validate(id: i64, epoch: i64) -> Validation {
    if id < 0 {
        return Validation::Negative(id);
    }
    check_parts(&decode(id, epoch), epoch)
}

/// Like [`validate`], for an id in its decimal string form.
pub fn validate_str(id: &str, epoch: i64) -> Validation {
    match id.trim().parse::<i64>() {
        Ok(id) => validate(id, epoch),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                Validation::OutOfRange(id.to_owned())
            }
            _ => Validation::NotAnInteger(id.to_owned()),
        },
    }
}

fn check_parts(parts: &DecomposedSnowflake, epoch: i64) -> Validation {
    if parts.timestamp < epoch {
        return Validation::BeforeEpoch {
            timestamp: parts.timestamp,
            epoch,
        };
    }
    if !(0..=MAX_WORKER_ID).contains(&parts.worker_id) {
        return Validation::WorkerIdOutOfRange(parts.worker_id);
    }
    if !(0..=MAX_SEQUENCE).contains(&parts.sequence) {
        return Validation::SequenceOutOfRange(parts.sequence);
    }
    Validation::Valid
}

/// Order two ids by the millisecond they were issued in.
///
/// Worker id and sequence are ignored, so two ids from the same millisecond
/// compare `Equal`.
pub fn compare(a: i64, b: i64, epoch: i64) -> Ordering {
    decode(a, epoch).timestamp.cmp(&decode(b, epoch).timestamp)
}

/// `compare` as the classic `-1 / 0 / 1`.
pub fn compare_i8(a: i64, b: i64, epoch: i64) -> i8 {
    compare(a, b, epoch) as i8
}

/// Whether `a` was issued in a later millisecond than `b`.
pub fn is_newer(a: i64, b: i64, epoch: i64) -> bool {
    compare(a, b, epoch) == Ordering::Greater
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_matches_field_arithmetic() {
        let id = encode(DEFAULT_EPOCH + 1000, 5, 1, DEFAULT_EPOCH);
        assert_eq!(id, 1000 * (1 << 17) + 5 * (1 << 12) + 1);
        assert_eq!(id, 131_092_481);
    }

    #[test]
    fn decode_recovers_parts() {
        let epoch = DEFAULT_EPOCH;
        for (t, w, s) in [(epoch, 0u8, 0u16), (epoch + 1, 31, 4095), (1_700_000_000_123, 17, 42)] {
            let parts = decode(encode(t, w, s, epoch), epoch);
            assert_eq!(parts.timestamp, t);
            assert_eq!(parts.worker_id, i64::from(w));
            assert_eq!(parts.sequence, i64::from(s));
        }
    }

    #[test]
    fn human_timestamp_is_utc() {
        let parts = decode(encode(DEFAULT_EPOCH + 1000, 0, 0, DEFAULT_EPOCH), DEFAULT_EPOCH);
        assert_eq!(parts.human_timestamp, "2015-01-01 00:00:01.000 UTC");
        assert_eq!(parts.datetime().map(|dt| dt.timestamp()), Some(1_420_070_401));
    }

    #[test]
    fn decode_is_total_for_negative_ids() {
        let parts = decode(-1, DEFAULT_EPOCH);
        assert_eq!(parts.timestamp, DEFAULT_EPOCH - 1);
        assert_eq!(parts.worker_id, MAX_WORKER_ID);
        assert_eq!(parts.sequence, MAX_SEQUENCE);
    }

    #[test]
    fn compare_ignores_worker_and_sequence() {
        let epoch = DEFAULT_EPOCH;
        let a = encode(epoch + 10, 3, 4000, epoch);
        let b = encode(epoch + 10, 0, 0, epoch);
        let c = encode(epoch + 11, 0, 0, epoch);
        assert_eq!(compare(a, b, epoch), Ordering::Equal);
        assert_eq!(compare_i8(a, c, epoch), -1);
        assert_eq!(compare_i8(c, a, epoch), 1);
        assert!(is_newer(c, a, epoch));
        assert!(!is_newer(a, b, epoch));
    }

    #[test]
    fn validate_str_reports_overflow_separately() {
        let too_big = "18446744073709551615";
        assert_eq!(
            validate_str(too_big, DEFAULT_EPOCH),
            Validation::OutOfRange(too_big.to_string())
        );
        assert_eq!(
            validate_str(too_big, DEFAULT_EPOCH).reason(),
            "`18446744073709551615` does not fit in a 64-bit id"
        );
        assert!(matches!(
            validate_str("-99999999999999999999", DEFAULT_EPOCH),
            Validation::OutOfRange(_)
        ));
        assert!(matches!(
            validate_str("1.5", DEFAULT_EPOCH),
            Validation::NotAnInteger(_)
        ));
        assert!(validate_str(" 131092480 ", DEFAULT_EPOCH).is_valid());
    }
}
