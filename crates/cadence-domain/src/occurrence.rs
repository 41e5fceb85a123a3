//! Occurrences as callers see them, with the overlay already applied.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{OccurrenceState, RawOccurrence, ScheduledSeries};

/// One effective instance of a series. Always derived, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Occurrence {
    pub series_id: Uuid,
    pub index: u32,
    /// Date produced by the pattern, before overrides.
    pub scheduled_date: NaiveDate,
    /// Effective date after overrides.
    pub date: NaiveDate,
    pub amount: f64,
    pub account: Uuid,
    pub to_account: Option<Uuid>,
    pub state: OccurrenceState,
}

impl Occurrence {
    /// Applies the series template and any matching overlay entry to a raw occurrence.
    pub fn resolve(series: &ScheduledSeries, raw: RawOccurrence) -> Self {
        let modification = series.overlay.get(raw.index);
        let overrides = modification.map(|m| &m.overrides);
        Self {
            series_id: series.id,
            index: raw.index,
            scheduled_date: raw.date,
            date: overrides.and_then(|o| o.date).unwrap_or(raw.date),
            amount: overrides
                .and_then(|o| o.amount)
                .unwrap_or(series.template.amount),
            account: overrides
                .and_then(|o| o.account)
                .unwrap_or(series.template.account),
            to_account: overrides
                .and_then(|o| o.to_account)
                .or(series.template.to_account),
            state: modification.map(|m| m.state).unwrap_or_default(),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.state == OccurrenceState::Deleted
    }

    pub fn is_completed(&self) -> bool {
        self.state == OccurrenceState::Completed
    }
}
