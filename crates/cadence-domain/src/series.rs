//! The persisted aggregate: a template, its recurrence pattern, and its overlay.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    projector, ModificationOverlay, Occurrence, RecurrencePattern, RecurrenceTermination,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Operation {
    Expense,
    Income,
    Transfer,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Operation::Expense => "Expense",
            Operation::Income => "Income",
            Operation::Transfer => "Transfer",
        };
        f.write_str(label)
    }
}

/// Fields every occurrence inherits unless the overlay overrides them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesTemplate {
    pub name: String,
    pub amount: f64,
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<Uuid>,
    pub account: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_account: Option<Uuid>,
}

impl SeriesTemplate {
    pub fn new(name: impl Into<String>, amount: f64, operation: Operation, account: Uuid) -> Self {
        Self {
            name: name.into(),
            amount,
            operation,
            category: None,
            subcategory: None,
            account,
            to_account: None,
        }
    }

    pub fn with_category(mut self, category: Uuid, subcategory: Option<Uuid>) -> Self {
        self.category = Some(category);
        self.subcategory = subcategory;
        self
    }

    pub fn with_to_account(mut self, to_account: Uuid) -> Self {
        self.to_account = Some(to_account);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledSeries {
    pub id: Uuid,
    pub template: SeriesTemplate,
    pub pattern: RecurrencePattern,
    #[serde(default)]
    pub overlay: ModificationOverlay,
}

impl ScheduledSeries {
    pub fn new(template: SeriesTemplate, pattern: RecurrencePattern) -> Self {
        Self {
            id: Uuid::new_v4(),
            template,
            pattern,
            overlay: ModificationOverlay::default(),
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.pattern.is_recurring()
    }

    pub fn with_overlay(&self, overlay: ModificationOverlay) -> Self {
        Self {
            overlay,
            ..self.clone()
        }
    }

    /// Replaces the pattern. A new start date or frequency shifts every index, so the
    /// overlay is cleared; a termination-only change keeps it.
    pub fn with_pattern(&self, pattern: RecurrencePattern) -> Self {
        let shifts_sequence = pattern.start_date != self.pattern.start_date
            || pattern.frequency != self.pattern.frequency;
        let overlay = if shifts_sequence {
            self.overlay.clear_all()
        } else {
            self.overlay.clone()
        };
        Self {
            pattern,
            overlay,
            ..self.clone()
        }
    }

    /// Makes occurrence `index + 1` the new index 0 and carries `amount` into the
    /// template for every later occurrence. Returns `None` when nothing follows `index`.
    pub fn rebased_after(&self, index: u32, amount: f64) -> Option<Self> {
        let shift = index.checked_add(1)?;
        let start_date = self.pattern.scheduled_date(shift)?;
        let termination = match self.pattern.termination {
            RecurrenceTermination::NOccurrences(count) => {
                RecurrenceTermination::NOccurrences(count.checked_sub(shift)?)
            }
            other => other,
        };
        Some(Self {
            id: self.id,
            template: SeriesTemplate {
                amount,
                ..self.template.clone()
            },
            pattern: RecurrencePattern {
                start_date,
                frequency: self.pattern.frequency,
                termination,
            },
            overlay: self.overlay.rebase(shift),
        })
    }

    pub fn project(&self, from: NaiveDate, to: NaiveDate) -> Vec<Occurrence> {
        projector::project(self, from, to)
    }

    pub fn nth(&self, index: u32) -> Option<Occurrence> {
        projector::nth(self, index)
    }
}
