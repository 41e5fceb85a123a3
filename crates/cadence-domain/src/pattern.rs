//! Recurrence patterns: a start date stepped by a frequency offset until a termination.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{generator::Occurrences, DomainError, FrequencyOffset, RecurrenceTermination};

/// Default number of occurrences produced when a caller does not choose a cap.
pub const DEFAULT_GENERATION_CAP: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurrencePattern {
    pub start_date: NaiveDate,
    #[serde(default)]
    pub frequency: FrequencyOffset,
    #[serde(default)]
    pub termination: RecurrenceTermination,
}

impl RecurrencePattern {
    pub fn new(
        start_date: NaiveDate,
        frequency: FrequencyOffset,
        termination: RecurrenceTermination,
    ) -> Result<Self, DomainError> {
        let pattern = Self {
            start_date,
            frequency,
            termination,
        };
        pattern.validate()?;
        Ok(pattern)
    }

    pub fn one_time(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            frequency: FrequencyOffset::ZERO,
            termination: RecurrenceTermination::OneTime,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.termination.validate()
    }

    /// False for one-time items and for patterns whose frequency never advances.
    pub fn is_recurring(&self) -> bool {
        !self.frequency.is_zero() && self.termination != RecurrenceTermination::OneTime
    }

    /// Single calendar step from `date`; the input is left untouched.
    pub fn next(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.frequency.apply(date)
    }

    /// Folds [`Self::next`] `index` times from the start date. Does not consult the
    /// termination; see [`Self::scheduled_date`] for the bounded lookup.
    pub fn occurrence_date(&self, index: u32) -> Option<NaiveDate> {
        (0..index).try_fold(self.start_date, |date, _| self.next(date))
    }

    /// Raw date of occurrence `index` if the series actually produces it.
    pub fn scheduled_date(&self, index: u32) -> Option<NaiveDate> {
        self.occurrences()
            .nth(index as usize)
            .map(|occurrence| occurrence.date)
    }

    pub fn is_within_termination(&self, index: u32, date: NaiveDate) -> bool {
        self.termination.allows(index, date)
    }

    /// Number of occurrences the series produces, `None` when unbounded.
    pub fn total_occurrences(&self) -> Option<u32> {
        if self.frequency.is_zero() {
            let first = self.is_within_termination(0, self.start_date);
            return Some(u32::from(first));
        }
        match self.termination {
            RecurrenceTermination::OneTime => Some(1),
            RecurrenceTermination::Infinite => None,
            RecurrenceTermination::NOccurrences(count) => Some(count),
            RecurrenceTermination::UntilDate(until) => {
                let mut count = 0u32;
                let mut date = Some(self.start_date);
                while let Some(current) = date.filter(|current| *current <= until) {
                    count = count.saturating_add(1);
                    date = self.next(current);
                }
                Some(count)
            }
        }
    }

    pub fn occurrences(&self) -> Occurrences<'_> {
        Occurrences::new(self)
    }
}
