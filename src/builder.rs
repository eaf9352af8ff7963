use crate::Snowflake;
use crate::error::{BoxDynError, Error};
use crate::layout::DEFAULT_EPOCH;
use crate::snowflake::{Internals, SharedSnowflake, checked_worker_id};
use crate::time::{SystemClock, TimeSource};
use chrono::prelude::*;
use std::sync::{Arc, Mutex};

/// A builder for building the ['Snowflake'] generator.
///
/// [`Snowflake`]: struct.Snowflake.html
pub struct Builder<'a, T = SystemClock> {
    epoch: Option<i64>,
    worker_id: Option<&'a dyn Fn() -> Result<i64, BoxDynError>>,
    check_worker_id: Option<&'a dyn Fn(u8) -> bool>,
    time: T,
    debug: bool,
}

impl<'a> Default for Builder<'a> {
    fn default() -> Self {
        Builder::new()
    }
}

impl<'a> Builder<'a> {
    /// Construct a new builder for the build of ['Snowflake'].
    ///
    /// [`Snowflake`]: struct.Snowflake.html
    pub fn new() -> Self {
        Self {
            epoch: None,
            worker_id: None,
            check_worker_id: None,
            time: SystemClock,
            debug: false,
        }
    }
}

impl<'a, T: TimeSource> Builder<'a, T> {
    /// Set the epoch from a date. Defaults to 2015-01-01T00:00:00Z.
    pub fn epoch(mut self, epoch: DateTime<Utc>) -> Self {
        self.epoch = Some(epoch.timestamp_millis());
        self
    }

    /// Set the epoch in milliseconds since the Unix epoch.
    pub fn epoch_millis(mut self, epoch: i64) -> Self {
        self.epoch = Some(epoch);
        self
    }

    /// Set the worker ID. Defaults to 0.
    /// If the provided closure returns an error or a value outside 0..=31,
    /// 'finalize' will fail.
    pub fn worker_id(mut self, worker_id: &'a dyn Fn() -> Result<i64, BoxDynError>) -> Self {
        self.worker_id = Some(worker_id);
        self
    }

    /// Set up a function to check the worker ID.
    /// If the function returns 'false', 'finalize' will fail.
    pub fn check_worker_id(mut self, check_worker_id: &'a dyn Fn(u8) -> bool) -> Self {
        self.check_worker_id = Some(check_worker_id);
        self
    }

    /// Replace the clock the generator reads.
    pub fn time_source<U: TimeSource>(self, time: U) -> Builder<'a, U> {
        Builder {
            epoch: self.epoch,
            worker_id: self.worker_id,
            check_worker_id: self.check_worker_id,
            time,
            debug: self.debug,
        }
    }

    /// Log the human readable timestamp of every parsed id.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Finish building and create a Snowflake instance.
    /// This method will return an error if the worker ID provider fails or
    /// the worker ID is rejected.
    pub fn finalize(self) -> Result<Snowflake<T>, Error> {
        let epoch = self.epoch.unwrap_or(DEFAULT_EPOCH);

        let worker_id = match self.worker_id {
            Some(worker_id_fn) => checked_worker_id(worker_id_fn().map_err(Error::WorkerIdFailed)?)?,
            None => 0,
        };

        if let Some(check_worker_id) = self.check_worker_id {
            if !check_worker_id(worker_id) {
                return Err(Error::CheckWorkerIdFailed);
            }
        }

        let shared = Arc::new(SharedSnowflake {
            time: self.time,
            internals: Mutex::new(Internals {
                epoch,
                worker_id,
                last_timestamp: None,
                sequence: 0,
                debug: self.debug,
            }),
        });
        Ok(Snowflake::new_inner(shared))
    }
}
