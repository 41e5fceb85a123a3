//! Use cases over recurring series: scheduling, querying, and per-occurrence edits.

use std::sync::Arc;

use cadence_domain::{
    frequency, generator, projector, Occurrence, OccurrenceModification, OccurrenceOverrides,
    OccurrenceState, RecurrencePattern, RecurrenceTermination, ScheduledSeries, SeriesTemplate,
    DEFAULT_GENERATION_CAP,
};
use chrono::{Days, NaiveDate};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{Clock, CoreError, MonthlyTotals, SeriesRepository, SummaryService};

/// Tunables for [`ScheduleService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSettings {
    /// Occurrences produced by [`ScheduleService::preview`].
    pub generation_cap: usize,
    /// Window used by [`ScheduleService::upcoming`] when the caller passes none.
    pub upcoming_window_days: u32,
    /// Reject unparsable frequency strings instead of collapsing them to one occurrence.
    pub strict_frequency: bool,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            generation_cap: DEFAULT_GENERATION_CAP,
            upcoming_window_days: 30,
            strict_frequency: false,
        }
    }
}

/// How a recorded occurrence affects the rest of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordMode {
    /// Only this occurrence is marked completed with the recorded values.
    Single,
    /// This occurrence is recorded and the series restarts after it, carrying the
    /// recorded amount into every later occurrence.
    Permanent,
}

impl From<bool> for RecordMode {
    fn from(permanent: bool) -> Self {
        if permanent {
            RecordMode::Permanent
        } else {
            RecordMode::Single
        }
    }
}

pub struct ScheduleService {
    repository: Arc<dyn SeriesRepository>,
    clock: Arc<dyn Clock>,
    settings: ScheduleSettings,
}

impl ScheduleService {
    pub fn new(repository: Arc<dyn SeriesRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            clock,
            settings: ScheduleSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ScheduleSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> ScheduleSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: ScheduleSettings) {
        self.settings = settings;
    }

    /// Creates and persists a series from a frequency string such as `1mo` or `2w`.
    pub fn schedule(
        &self,
        template: SeriesTemplate,
        start_date: NaiveDate,
        frequency_text: &str,
        termination: RecurrenceTermination,
    ) -> Result<ScheduledSeries, CoreError> {
        let one_time_without_frequency =
            termination == RecurrenceTermination::OneTime && frequency_text.trim().is_empty();
        let offset = if self.settings.strict_frequency && !one_time_without_frequency {
            frequency::parse_strict(frequency_text)?
        } else {
            let offset = frequency::parse(frequency_text);
            if offset.is_zero() && !one_time_without_frequency {
                warn!(
                    frequency = frequency_text,
                    "frequency did not parse; series will produce a single occurrence"
                );
            }
            offset
        };
        let pattern = RecurrencePattern::new(start_date, offset, termination)?;
        let series = ScheduledSeries::new(template, pattern);
        self.repository.persist(&series)?;
        info!(
            series_id = %series.id,
            name = %series.template.name,
            frequency = %series.pattern.frequency,
            termination = %series.pattern.termination,
            "scheduled series"
        );
        Ok(series)
    }

    pub fn find(&self, series_id: Uuid) -> Result<ScheduledSeries, CoreError> {
        self.repository
            .find_by_id(series_id)?
            .ok_or(CoreError::SeriesNotFound(series_id))
    }

    pub fn list_all(&self) -> Result<Vec<ScheduledSeries>, CoreError> {
        self.repository.find_all()
    }

    pub fn delete_series(&self, series_id: Uuid) -> Result<(), CoreError> {
        if !self.repository.delete(series_id)? {
            return Err(CoreError::SeriesNotFound(series_id));
        }
        info!(series_id = %series_id, "deleted series");
        Ok(())
    }

    /// Every effective occurrence from each series' start up to `date`, merged across
    /// series and ordered by date, then series, then index.
    pub fn list_occurrences_until(&self, date: NaiveDate) -> Result<Vec<Occurrence>, CoreError> {
        let candidates = self.repository.find_where_date_before_or_equal(date)?;
        let mut occurrences: Vec<Occurrence> = candidates
            .iter()
            .flat_map(|series| projector::project(series, series.pattern.start_date, date))
            .collect();
        sort_globally(&mut occurrences);
        debug!(
            until = %date,
            series = candidates.len(),
            occurrences = occurrences.len(),
            "listed occurrences"
        );
        Ok(occurrences)
    }

    /// Effective occurrences between today and `window_days` from now.
    pub fn upcoming(&self, window_days: Option<u32>) -> Result<Vec<Occurrence>, CoreError> {
        let today = self.clock.today();
        let days = window_days.unwrap_or(self.settings.upcoming_window_days);
        let end = today
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX);
        let mut occurrences: Vec<Occurrence> = self
            .repository
            .find_where_date_before_or_equal(end)?
            .iter()
            .flat_map(|series| projector::project(series, today, end))
            .collect();
        sort_globally(&mut occurrences);
        debug!(from = %today, to = %end, occurrences = occurrences.len(), "listed upcoming");
        Ok(occurrences)
    }

    /// First occurrences of a series, up to the configured generation cap, with deleted
    /// occurrences left out.
    pub fn preview(&self, series_id: Uuid) -> Result<Vec<Occurrence>, CoreError> {
        let series = self.find(series_id)?;
        Ok(
            generator::generate_up_to(&series.pattern, self.settings.generation_cap)
                .into_iter()
                .map(|raw| Occurrence::resolve(&series, raw))
                .filter(|occurrence| !occurrence.is_deleted())
                .collect(),
        )
    }

    pub fn occurrence(&self, series_id: Uuid, index: u32) -> Result<Occurrence, CoreError> {
        let series = self.find(series_id)?;
        projector::nth(&series, index).ok_or(CoreError::OccurrenceNotFound { series_id, index })
    }

    /// Records occurrence `index` as done with the values actually used and returns it
    /// for the ledger. See [`RecordMode`] for how the rest of the series is affected.
    pub fn record_occurrence(
        &self,
        series_id: Uuid,
        index: u32,
        actual_date: NaiveDate,
        actual_amount: f64,
        mode: impl Into<RecordMode>,
    ) -> Result<Occurrence, CoreError> {
        let mode = mode.into();
        let series = self.find(series_id)?;
        ensure_recurring(&series)?;
        let current = projector::nth(&series, index)
            .ok_or(CoreError::OccurrenceNotFound { series_id, index })?;
        if current.is_deleted() {
            return Err(CoreError::InvalidOperation(format!(
                "occurrence {index} of series {series_id} was deleted and cannot be recorded"
            )));
        }

        let recorded = Occurrence {
            date: actual_date,
            amount: actual_amount,
            state: OccurrenceState::Completed,
            ..current
        };
        let updated = match mode {
            RecordMode::Single => complete_in_overlay(&series, index, actual_date, actual_amount),
            RecordMode::Permanent => match series.rebased_after(index, actual_amount) {
                Some(rebased) => rebased,
                None => {
                    debug!(
                        series_id = %series_id,
                        index,
                        "no occurrence follows; recording without rebasing"
                    );
                    complete_in_overlay(&series, index, actual_date, actual_amount)
                }
            },
        };
        self.repository.persist(&updated)?;
        info!(
            series_id = %series_id,
            index,
            date = %actual_date,
            amount = actual_amount,
            mode = ?mode,
            "recorded occurrence"
        );
        Ok(recorded)
    }

    /// Merges `overrides` onto whatever the occurrence already overrides; the state is kept.
    pub fn edit_occurrence(
        &self,
        series_id: Uuid,
        index: u32,
        overrides: OccurrenceOverrides,
    ) -> Result<Occurrence, CoreError> {
        let series = self.find(series_id)?;
        ensure_recurring(&series)?;
        ensure_index_in_range(&series, index)?;
        ensure_occurrence_exists(&series, index)?;
        let existing = series
            .overlay
            .get(index)
            .cloned()
            .unwrap_or_else(|| OccurrenceModification::new(index));
        let merged = existing.overrides.merged_with(&overrides);
        let updated = series.with_overlay(series.overlay.upsert(existing.with_overrides(merged)));
        self.repository.persist(&updated)?;
        info!(series_id = %series_id, index, "edited occurrence");
        projector::nth(&updated, index).ok_or(CoreError::OccurrenceNotFound { series_id, index })
    }

    pub fn delete_occurrence(&self, series_id: Uuid, index: u32) -> Result<(), CoreError> {
        let series = self.find(series_id)?;
        ensure_recurring(&series)?;
        ensure_index_in_range(&series, index)?;
        ensure_occurrence_exists(&series, index)?;
        let updated = series.with_overlay(series.overlay.mark_deleted(index));
        self.repository.persist(&updated)?;
        info!(series_id = %series_id, index, "deleted occurrence");
        Ok(())
    }

    /// Replaces the pattern. Changing the start date or frequency discards every
    /// per-occurrence modification.
    pub fn edit_pattern(
        &self,
        series_id: Uuid,
        pattern: RecurrencePattern,
    ) -> Result<ScheduledSeries, CoreError> {
        pattern.validate()?;
        let series = self.find(series_id)?;
        let updated = series.with_pattern(pattern);
        let discarded = series.overlay.len() - updated.overlay.len();
        if discarded > 0 {
            warn!(
                series_id = %series_id,
                discarded,
                "pattern change invalidated occurrence modifications"
            );
        }
        self.repository.persist(&updated)?;
        info!(
            series_id = %series_id,
            start = %updated.pattern.start_date,
            frequency = %updated.pattern.frequency,
            termination = %updated.pattern.termination,
            "edited pattern"
        );
        Ok(updated)
    }

    /// Series that still produce an occurrence on or after today.
    pub fn active_series(&self) -> Result<Vec<ScheduledSeries>, CoreError> {
        let today = self.clock.today();
        Ok(self
            .repository
            .find_all()?
            .into_iter()
            .filter(|series| {
                series
                    .pattern
                    .occurrences()
                    .any(|occurrence| occurrence.date >= today)
            })
            .collect())
    }

    /// Monthly-equivalent totals over [`Self::active_series`].
    pub fn monthly_totals(&self) -> Result<MonthlyTotals, CoreError> {
        let active = self.active_series()?;
        Ok(SummaryService::monthly_totals(&active))
    }
}

fn complete_in_overlay(
    series: &ScheduledSeries,
    index: u32,
    actual_date: NaiveDate,
    actual_amount: f64,
) -> ScheduledSeries {
    let existing = series
        .overlay
        .get(index)
        .cloned()
        .unwrap_or_else(|| OccurrenceModification::new(index));
    let overrides = existing.overrides.merged_with(&OccurrenceOverrides {
        date: Some(actual_date),
        amount: Some(actual_amount),
        ..Default::default()
    });
    let modification = existing
        .with_overrides(overrides)
        .with_state(OccurrenceState::Completed);
    series.with_overlay(series.overlay.upsert(modification))
}

fn ensure_recurring(series: &ScheduledSeries) -> Result<(), CoreError> {
    if series.is_recurring() {
        Ok(())
    } else {
        Err(CoreError::NotRecurring(series.id))
    }
}

fn ensure_index_in_range(series: &ScheduledSeries, index: u32) -> Result<(), CoreError> {
    match series.pattern.total_occurrences() {
        Some(total) if index >= total => Err(CoreError::IndexOutOfRange { index, total }),
        _ => Ok(()),
    }
}

fn ensure_occurrence_exists(series: &ScheduledSeries, index: u32) -> Result<(), CoreError> {
    match series.pattern.scheduled_date(index) {
        Some(_) => Ok(()),
        None => Err(CoreError::OccurrenceNotFound {
            series_id: series.id,
            index,
        }),
    }
}

fn sort_globally(occurrences: &mut [Occurrence]) {
    occurrences.sort_by_key(|occurrence| (occurrence.date, occurrence.series_id, occurrence.index));
}
