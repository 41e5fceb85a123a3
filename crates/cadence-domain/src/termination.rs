//! Termination rules for recurring series and their display form.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Determines when a series stops producing occurrences.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RecurrenceTermination {
    /// Exactly one occurrence, at index 0.
    OneTime,
    /// Unbounded. Generation must be capped by the caller.
    #[default]
    Infinite,
    /// Occurrences continue while their date is on or before the given day.
    UntilDate(NaiveDate),
    /// Exactly `count` occurrences.
    NOccurrences(u32),
}

impl RecurrenceTermination {
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            RecurrenceTermination::NOccurrences(0) => Err(DomainError::InvalidTermination(
                "occurrence count must be positive".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Dates are calendar days, so the until-date comparison is already midnight-normalized.
    pub fn allows(&self, index: u32, date: NaiveDate) -> bool {
        match self {
            RecurrenceTermination::OneTime => index == 0,
            RecurrenceTermination::Infinite => true,
            RecurrenceTermination::UntilDate(until) => date <= *until,
            RecurrenceTermination::NOccurrences(count) => index < *count,
        }
    }

    pub fn is_bounded(&self) -> bool {
        !matches!(self, RecurrenceTermination::Infinite)
    }
}

impl fmt::Display for RecurrenceTermination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceTermination::OneTime => f.write_str("Once"),
            RecurrenceTermination::Infinite => f.write_str("Never"),
            RecurrenceTermination::UntilDate(date) => write!(f, "Until {}", date),
            RecurrenceTermination::NOccurrences(count) => {
                write!(
                    f,
                    "After {count} occurrence{}",
                    if *count == 1 { "" } else { "s" }
                )
            }
        }
    }
}
