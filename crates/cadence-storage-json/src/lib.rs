//! cadence-storage-json
//!
//! File-backed [`SeriesRepository`](cadence_core::SeriesRepository) keeping one JSON
//! document per series.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use cadence_core::{CoreError, SeriesRepository};
use cadence_domain::ScheduledSeries;
use chrono::NaiveDate;
use uuid::Uuid;

const SERIES_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed JSON persistence: one document per series at `<root>/<id>.json`.
#[derive(Debug, Clone)]
pub struct JsonSeriesStorage {
    root: PathBuf,
}

impl JsonSeriesStorage {
    pub fn new(root: PathBuf) -> Result<Self, CoreError> {
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn series_path(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{}.{}", id, SERIES_EXTENSION))
    }

    fn document_paths(&self) -> Result<Vec<PathBuf>, CoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(SERIES_EXTENSION) {
                continue;
            }
            paths.push(path);
        }
        paths.sort();
        Ok(paths)
    }
}

impl SeriesRepository for JsonSeriesStorage {
    fn find_by_id(&self, id: Uuid) -> Result<Option<ScheduledSeries>, CoreError> {
        match load_series_from_path(&self.series_path(id)) {
            Ok(series) => Ok(Some(series)),
            Err(CoreError::Io(err)) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn find_all(&self) -> Result<Vec<ScheduledSeries>, CoreError> {
        self.document_paths()?
            .iter()
            .map(|path| load_series_from_path(path))
            .collect()
    }

    fn find_where_date_before_or_equal(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<ScheduledSeries>, CoreError> {
        let mut matching = self.find_all()?;
        matching.retain(|series| series.pattern.start_date <= date);
        Ok(matching)
    }

    fn persist(&self, series: &ScheduledSeries) -> Result<(), CoreError> {
        save_series_to_path(series, &self.series_path(series.id))
    }

    fn delete(&self, id: Uuid) -> Result<bool, CoreError> {
        let path = self.series_path(id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }
}

/// Writes a series document to an arbitrary path, replacing it atomically.
pub fn save_series_to_path(series: &ScheduledSeries, path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_series(series)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a series document. A document that does not deserialize is a storage error
/// naming the file.
pub fn load_series_from_path(path: &Path) -> Result<ScheduledSeries, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| {
        CoreError::Storage(format!("unreadable series document `{}`: {}", path.display(), err))
    })
}

fn serialize_series(series: &ScheduledSeries) -> Result<String, CoreError> {
    serde_json::to_string_pretty(series).map_err(|err| CoreError::Serde(err.to_string()))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
