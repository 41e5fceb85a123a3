//! cadence-core
//!
//! Use-case services for recurring series.
//! Depends on cadence-domain. No terminal I/O and no direct filesystem access; persistence
//! goes through the [`storage::SeriesRepository`] contract.

pub mod error;
pub mod schedule_service;
pub mod storage;
pub mod summary_service;
pub mod time;

pub use error::CoreError;
pub use schedule_service::*;
pub use storage::{InMemorySeriesRepository, SeriesRepository};
pub use summary_service::*;
pub use time::{Clock, FixedClock, SystemClock};
