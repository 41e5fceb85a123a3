//! Expands a [`RecurrencePattern`] into raw `(index, date)` occurrences.
//!
//! Every entry point is built on [`Occurrences`], a lazy iterator that stops when the
//! termination rejects an occurrence, when a step leaves the calendar range, or when a
//! step no longer advances the date (zero offset). The last rule keeps patterns with an
//! unparsable frequency from spinning: they produce the start date and nothing else.

use std::iter::FusedIterator;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::RecurrencePattern;

/// A generated occurrence before any overlay is applied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawOccurrence {
    pub index: u32,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    pattern: &'a RecurrencePattern,
    pending: Option<RawOccurrence>,
}

impl<'a> Occurrences<'a> {
    pub fn new(pattern: &'a RecurrencePattern) -> Self {
        Self {
            pattern,
            pending: Some(RawOccurrence {
                index: 0,
                date: pattern.start_date,
            }),
        }
    }

    /// Continues the sequence at `from`, an occurrence previously produced by this
    /// pattern. `from` is yielded again first.
    pub fn resume(pattern: &'a RecurrencePattern, from: RawOccurrence) -> Self {
        Self {
            pattern,
            pending: Some(from),
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = RawOccurrence;

    fn next(&mut self) -> Option<RawOccurrence> {
        let current = self.pending.take()?;
        if !self
            .pattern
            .is_within_termination(current.index, current.date)
        {
            return None;
        }
        self.pending = self
            .pattern
            .next(current.date)
            .filter(|following| *following != current.date)
            .zip(current.index.checked_add(1))
            .map(|(date, index)| RawOccurrence { index, date });
        Some(current)
    }
}

impl FusedIterator for Occurrences<'_> {}

/// First occurrences of the pattern, never more than `max_count`, even when the
/// termination would allow more.
pub fn generate_up_to(pattern: &RecurrencePattern, max_count: usize) -> Vec<RawOccurrence> {
    pattern.occurrences().take(max_count).collect()
}

/// Occurrences whose raw date is on or before `end`.
pub fn generate_until(pattern: &RecurrencePattern, end: NaiveDate) -> Vec<RawOccurrence> {
    pattern
        .occurrences()
        .take_while(|occurrence| occurrence.date <= end)
        .collect()
}

/// Occurrences dated within `[today, today + window_days]`.
pub fn generate_within_days(
    pattern: &RecurrencePattern,
    today: NaiveDate,
    window_days: u32,
) -> Vec<RawOccurrence> {
    let end = today
        .checked_add_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MAX);
    pattern
        .occurrences()
        .take_while(|occurrence| occurrence.date <= end)
        .filter(|occurrence| occurrence.date >= today)
        .collect()
}
