//! Sparse per-occurrence exceptions layered over a generated sequence.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// Lifecycle state of a single occurrence.
#[derive(Default)]
pub enum OccurrenceState {
    #[default]
    Pending,
    Completed,
    Deleted,
}

impl fmt::Display for OccurrenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OccurrenceState::Pending => "Pending",
            OccurrenceState::Completed => "Completed",
            OccurrenceState::Deleted => "Deleted",
        };
        f.write_str(label)
    }
}

/// Field values that replace the template's for one occurrence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OccurrenceOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_account: Option<Uuid>,
}

impl OccurrenceOverrides {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.amount.is_none()
            && self.account.is_none()
            && self.to_account.is_none()
    }

    /// Fields set on `newer` win; unset fields fall back to `self`.
    pub fn merged_with(&self, newer: &OccurrenceOverrides) -> OccurrenceOverrides {
        OccurrenceOverrides {
            date: newer.date.or(self.date),
            amount: newer.amount.or(self.amount),
            account: newer.account.or(self.account),
            to_account: newer.to_account.or(self.to_account),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OccurrenceModification {
    pub index: u32,
    #[serde(default)]
    pub overrides: OccurrenceOverrides,
    #[serde(default)]
    pub state: OccurrenceState,
}

impl OccurrenceModification {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            overrides: OccurrenceOverrides::default(),
            state: OccurrenceState::Pending,
        }
    }

    pub fn with_overrides(mut self, overrides: OccurrenceOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_state(mut self, state: OccurrenceState) -> Self {
        self.state = state;
        self
    }
}

/// Index-keyed set of modifications, kept sorted by index with at most one entry each.
///
/// Every operation returns a new overlay; the receiver is never mutated, so one overlay
/// can be shared freely between readers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(
    from = "Vec<OccurrenceModification>",
    into = "Vec<OccurrenceModification>"
)]
pub struct ModificationOverlay {
    entries: Vec<OccurrenceModification>,
}

impl ModificationOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `modification`, replacing any existing entry for the same index.
    pub fn upsert(&self, modification: OccurrenceModification) -> Self {
        let mut next = self.clone();
        next.insert(modification);
        next
    }

    pub fn get(&self, index: u32) -> Option<&OccurrenceModification> {
        self.position(index).ok().map(|pos| &self.entries[pos])
    }

    pub fn state_of(&self, index: u32) -> OccurrenceState {
        self.get(index)
            .map(|modification| modification.state)
            .unwrap_or_default()
    }

    pub fn mark_completed(&self, index: u32) -> Self {
        self.with_state(index, OccurrenceState::Completed)
    }

    pub fn mark_deleted(&self, index: u32) -> Self {
        self.with_state(index, OccurrenceState::Deleted)
    }

    /// Empty overlay. Index-keyed entries stop meaning anything once the base sequence
    /// shifts, so pattern edits discard them instead of remapping.
    pub fn clear_all(&self) -> Self {
        Self::default()
    }

    /// Drops entries below `shift` and re-keys the rest to `index - shift`, for when
    /// occurrence `shift` becomes the new index 0.
    pub fn rebase(&self, shift: u32) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|modification| modification.index >= shift)
                .map(|modification| OccurrenceModification {
                    index: modification.index - shift,
                    ..modification.clone()
                })
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &OccurrenceModification> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn with_state(&self, index: u32, state: OccurrenceState) -> Self {
        let modification = self
            .get(index)
            .cloned()
            .unwrap_or_else(|| OccurrenceModification::new(index));
        self.upsert(modification.with_state(state))
    }

    fn position(&self, index: u32) -> Result<usize, usize> {
        self.entries
            .binary_search_by_key(&index, |modification| modification.index)
    }

    fn insert(&mut self, modification: OccurrenceModification) {
        match self.position(modification.index) {
            Ok(pos) => self.entries[pos] = modification,
            Err(pos) => self.entries.insert(pos, modification),
        }
    }
}

impl From<Vec<OccurrenceModification>> for ModificationOverlay {
    fn from(modifications: Vec<OccurrenceModification>) -> Self {
        let mut overlay = Self::default();
        for modification in modifications {
            overlay.insert(modification);
        }
        overlay
    }
}

impl From<ModificationOverlay> for Vec<OccurrenceModification> {
    fn from(overlay: ModificationOverlay) -> Self {
        overlay.entries
    }
}
