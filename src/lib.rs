//! Twitter-style [snowflake] identifiers: generate, parse, validate and order
//! time-sortable 64-bit ids without coordination between producers.
//!
//! An id packs the milliseconds since a configurable epoch, a 5 bit worker id
//! and a 12 bit per-millisecond sequence:
//!
//! ```text
//! id = (timestamp - epoch) << 17 | worker_id << 12 | sequence
//! ```
//!
//! ## Quickstart
//!
//! Add the following to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! snowflake_clock = "0.1"
//! ```
//!
//! Use the library like this:
//!
//! ```
//! use snowflake_clock::Snowflake;
//!
//! let sf = Snowflake::new().unwrap();
//! sf.set_worker_id(5).unwrap();
//! let id = sf.next_id().unwrap();
//! let parts = sf.parse(id);
//! assert_eq!(parts.worker_id, 5);
//! assert!(sf.validate(id).is_valid());
//! ```
//!
//! ## Concurrent use
//!
//! Snowflake is threadSafe. `clone` it before moving to another thread:
//! ```
//! use snowflake_clock::Snowflake;
//! use std::thread;
//!
//! let sf = Snowflake::new().unwrap();
//!
//! let mut children = Vec::new();
//! for _ in 0..10 {
//!     let thread_sf = sf.clone();
//!     children.push(thread::spawn(move || {
//!         println!("{}", thread_sf.next_id().unwrap());
//!     }));
//! }
//!
//! for child in children {
//!     child.join().unwrap();
//! }
//! ```
//!
//! Worker ids are not coordinated: every concurrently running producer needs
//! its own.
//!
//! [snowflake]: https://blog.twitter.com/2010/announcing-snowflake

mod age;
mod builder;
mod error;
mod layout;
mod snowflake;
mod time;

pub use crate::snowflake::*;
pub use age::*;
pub use builder::*;
pub use error::*;
pub use layout::*;
pub use time::*;
