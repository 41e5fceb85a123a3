//! cadence-domain
//!
//! Pure recurrence models (frequency, termination, pattern, overlay, series) and the
//! generator/projector that expand them into occurrences.
//! No I/O, no logging, no storage. Only data types and deterministic functions.

pub mod error;
pub mod frequency;
pub mod generator;
pub mod occurrence;
pub mod overlay;
pub mod pattern;
pub mod projector;
pub mod series;
pub mod termination;

pub use error::DomainError;
pub use frequency::*;
pub use generator::{Occurrences, RawOccurrence};
pub use occurrence::Occurrence;
pub use overlay::*;
pub use pattern::*;
pub use series::*;
pub use termination::*;
