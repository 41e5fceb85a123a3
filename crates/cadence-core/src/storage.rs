use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use cadence_domain::ScheduledSeries;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::CoreError;

/// Persistence contract for series. A series (template, pattern, and overlay) is one
/// document: `persist` replaces it whole and concurrent writers resolve last-write-wins.
pub trait SeriesRepository: Send + Sync {
    fn find_by_id(&self, id: Uuid) -> Result<Option<ScheduledSeries>, CoreError>;
    fn find_all(&self) -> Result<Vec<ScheduledSeries>, CoreError>;
    /// Series whose start date is on or before `date`.
    fn find_where_date_before_or_equal(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<ScheduledSeries>, CoreError>;
    fn persist(&self, series: &ScheduledSeries) -> Result<(), CoreError>;
    /// Removes the series with its pattern and overlay. Returns whether it existed.
    fn delete(&self, id: Uuid) -> Result<bool, CoreError>;
}

/// Process-local repository, ordered by series id.
#[derive(Debug, Default)]
pub struct InMemorySeriesRepository {
    series: Mutex<BTreeMap<Uuid, ScheduledSeries>>,
}

impl InMemorySeriesRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(series: impl IntoIterator<Item = ScheduledSeries>) -> Self {
        Self {
            series: Mutex::new(series.into_iter().map(|s| (s.id, s)).collect()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<Uuid, ScheduledSeries>>, CoreError> {
        self.series
            .lock()
            .map_err(|_| CoreError::Storage("in-memory repository lock poisoned".into()))
    }
}

impl SeriesRepository for InMemorySeriesRepository {
    fn find_by_id(&self, id: Uuid) -> Result<Option<ScheduledSeries>, CoreError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    fn find_all(&self) -> Result<Vec<ScheduledSeries>, CoreError> {
        Ok(self.lock()?.values().cloned().collect())
    }

    fn find_where_date_before_or_equal(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<ScheduledSeries>, CoreError> {
        Ok(self
            .lock()?
            .values()
            .filter(|series| series.pattern.start_date <= date)
            .cloned()
            .collect())
    }

    fn persist(&self, series: &ScheduledSeries) -> Result<(), CoreError> {
        self.lock()?.insert(series.id, series.clone());
        Ok(())
    }

    fn delete(&self, id: Uuid) -> Result<bool, CoreError> {
        Ok(self.lock()?.remove(&id).is_some())
    }
}
