use crate::age::{AgeUnit, age};
use crate::builder::Builder;
use crate::error::*;
use crate::layout::{self, DecomposedSnowflake, MAX_SEQUENCE, MAX_WORKER_ID, Validation};
use crate::time::{SystemClock, TimeSource};
use std::{
    cmp::Ordering,
    hint,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread,
};
use tracing::{debug, error, trace};

/// mask for sequence number
pub(crate) const GENERATE_MASK_SEQUENCE: u16 = MAX_SEQUENCE as u16;
/// clock reads spent spinning before yielding the thread while waiting for
/// the next millisecond
const SPIN_LIMIT: u32 = 64;

/// Internals of Snowflake.
/// This struct is not exposed to the public.
#[derive(Debug)]
pub(crate) struct Internals {
    pub(crate) epoch: i64,
    pub(crate) worker_id: u8,
    /// `None` until the first id is issued.
    pub(crate) last_timestamp: Option<i64>,
    pub(crate) sequence: u16,
    pub(crate) debug: bool,
}

/// SharedSnowflake is shared between Snowflake instances.
/// This struct is not exposed to the public.
pub(crate) struct SharedSnowflake<T> {
    pub(crate) time: T,
    pub(crate) internals: Mutex<Internals>,
}

/// Snowflake is a unique ID generator for one worker.
/// It is thread-safe and can be cloned to be used in multiple threads; clones
/// share the same clock state, worker id and epoch.
pub struct Snowflake<T = SystemClock>(pub(crate) Arc<SharedSnowflake<T>>);

impl Snowflake {
    /// Create a new Snowflake with the default configuration: worker id 0,
    /// epoch 2015-01-01T00:00:00Z and the system clock.
    /// For custom configuration see [`builder`].
    ///
    /// [`builder`]: struct.Snowflake.html#method.builder
    pub fn new() -> Result<Self, Error> {
        Builder::new().finalize()
    }

    /// Create a new [`Builder`] to construct a Snowflake.
    ///
    /// [`Builder`]: struct.Builder.html
    pub fn builder<'a>() -> Builder<'a> {
        Builder::new()
    }
}

impl<T: TimeSource> Snowflake<T> {
    pub(crate) fn new_inner(shared: Arc<SharedSnowflake<T>>) -> Self {
        Self(shared)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Internals>, Error> {
        self.0.internals.lock().map_err(|_| Error::MutexPoisoned)
    }

    /// Lock for reading configuration. A poisoned lock is still readable:
    /// every field is written in a single assignment.
    fn read(&self) -> MutexGuard<'_, Internals> {
        self.0
            .internals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Generate the next unique id.
    ///
    /// Ids issued in the same millisecond carry consecutive sequence numbers.
    /// Once 4096 ids were issued in one millisecond the call blocks until the
    /// clock moves on.
    ///
    /// # Errors
    /// [`Error::ClockMovedBackwards`] when the clock reads earlier than the
    /// last issued id. Generator state is left untouched and the call is not
    /// retried.
    pub fn next_id(&self) -> Result<i64, Error> {
        let mut internals = self.lock()?;

        let mut now = self.0.time.current_millis();
        let last_timestamp = internals.last_timestamp;
        match last_timestamp {
            Some(last) if now < last => {
                error!(last, now, "clock moved backwards, refusing to issue id");
                return Err(Error::ClockMovedBackwards { last, now });
            }
            Some(last) if now == last => {
                internals.sequence = (internals.sequence + 1) & GENERATE_MASK_SEQUENCE;
                if internals.sequence == 0 {
                    // the wrapped sequence (0) is reused in the new millisecond
                    trace!(last, "sequence exhausted, waiting for next millisecond");
                    now = wait_next_millis(&self.0.time, last);
                }
            }
            _ => internals.sequence = 0,
        }

        internals.last_timestamp = Some(now);
        Ok(layout::encode(
            now,
            internals.worker_id,
            internals.sequence,
            internals.epoch,
        ))
    }

    /// [`next_id`] in decimal string form.
    ///
    /// [`next_id`]: #method.next_id
    pub fn next_id_string(&self) -> Result<String, Error> {
        self.next_id().map(|id| id.to_string())
    }

    /// Set the worker id stamped into subsequently generated ids.
    pub fn set_worker_id(&self, worker_id: i64) -> Result<(), Error> {
        let checked = checked_worker_id(worker_id)?;
        let mut internals = self.lock()?;
        internals.worker_id = checked;
        debug!(worker_id, "worker id changed");
        Ok(())
    }

    pub fn worker_id(&self) -> u8 {
        self.read().worker_id
    }

    /// Set the epoch in milliseconds since the Unix epoch.
    ///
    /// Ids issued under a previous epoch no longer decode to their original
    /// timestamp.
    pub fn set_epoch(&self, epoch: i64) -> Result<(), Error> {
        let mut internals = self.lock()?;
        internals.epoch = epoch;
        debug!(epoch, "epoch changed");
        Ok(())
    }

    pub fn epoch(&self) -> i64 {
        self.read().epoch
    }

    /// Toggle logging of the human readable timestamp from [`parse`].
    ///
    /// [`parse`]: #method.parse
    pub fn set_debug(&self, enabled: bool) -> Result<(), Error> {
        self.lock()?.debug = enabled;
        Ok(())
    }

    pub fn is_debug(&self) -> bool {
        self.read().debug
    }

    /// Decompose `id` under the current epoch.
    pub fn parse(&self, id: i64) -> DecomposedSnowflake {
        let (epoch, debug) = {
            let internals = self.read();
            (internals.epoch, internals.debug)
        };
        let parts = layout::decode(id, epoch);
        if debug {
            debug!(id, timestamp = %parts.human_timestamp, "parsed snowflake");
        }
        parts
    }

    pub fn validate(&self, id: i64) -> Validation {
        layout::validate(id, self.epoch())
    }

    pub fn validate_str(&self, id: &str) -> Validation {
        layout::validate_str(id, self.epoch())
    }

    /// Order `a` and `b` by issue millisecond, see [`layout::compare`].
    pub fn compare(&self, a: i64, b: i64) -> Ordering {
        layout::compare(a, b, self.epoch())
    }

    pub fn is_newer(&self, a: i64, b: i64) -> bool {
        layout::is_newer(a, b, self.epoch())
    }

    /// How long ago `id` was issued according to this generator's clock.
    pub fn age(&self, id: i64, unit: AgeUnit) -> f64 {
        age(id, self.epoch(), self.0.time.current_millis(), unit)
    }

    pub fn age_in_seconds(&self, id: i64) -> f64 {
        self.age(id, AgeUnit::Seconds)
    }

    pub fn age_in_minutes(&self, id: i64) -> f64 {
        self.age(id, AgeUnit::Minutes)
    }

    pub fn age_in_hours(&self, id: i64) -> f64 {
        self.age(id, AgeUnit::Hours)
    }

    pub fn age_in_days(&self, id: i64) -> f64 {
        self.age(id, AgeUnit::Days)
    }

    pub fn age_in_weeks(&self, id: i64) -> f64 {
        self.age(id, AgeUnit::Weeks)
    }

    pub fn age_in_months(&self, id: i64) -> f64 {
        self.age(id, AgeUnit::Months)
    }

    pub fn age_in_years(&self, id: i64) -> f64 {
        self.age(id, AgeUnit::Years)
    }

    pub fn age_in_decades(&self, id: i64) -> f64 {
        self.age(id, AgeUnit::Decades)
    }
}

/// Returns a new `Snowflake` referencing the same state as `self`.
/// This is used for concurrent use.
impl<T> Clone for Snowflake<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Range-check a worker id.
pub(crate) fn checked_worker_id(worker_id: i64) -> Result<u8, Error> {
    if (0..=MAX_WORKER_ID).contains(&worker_id) {
        Ok(worker_id as u8)
    } else {
        Err(Error::InvalidWorkerId(worker_id))
    }
}

/// Spin, then yield, until the clock reads past `last`.
fn wait_next_millis<T: TimeSource>(time: &T, last: i64) -> i64 {
    let mut spins = 0;
    loop {
        let now = time.current_millis();
        if now > last {
            return now;
        }
        if spins < SPIN_LIMIT {
            spins += 1;
            hint::spin_loop();
        } else {
            thread::yield_now();
        }
    }
}
