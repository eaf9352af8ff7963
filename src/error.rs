// Copyright 2022 houseme
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::error::Error as StdError;
use thiserror::Error;

/// Convenience type alias for usage within Snowflake.
pub type BoxDynError = Box<dyn StdError + 'static + Send + Sync>;

/// The error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("clock moved backwards: now `{now}` is before last issued timestamp `{last}`")]
    ClockMovedBackwards { last: i64, now: i64 },
    #[error("worker id `{0}` is outside the allowed range 0..=31")]
    InvalidWorkerId(i64),
    #[error("worker_id returned an error: {0}")]
    WorkerIdFailed(#[source] BoxDynError),
    #[error("check_worker_id returned false")]
    CheckWorkerIdFailed,
    #[error("mutex is poisoned (i.e. a panic happened while it was locked)")]
    MutexPoisoned,
}
