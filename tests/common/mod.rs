use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use cadence::{Cadence, FixedClock};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Creates an isolated workspace directory that outlives the test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Opens a workspace at `base` whose clock is pinned to `today`.
pub fn open_at(base: &Path, today: NaiveDate) -> Cadence {
    Cadence::open_with_clock(Some(base.to_path_buf()), Arc::new(FixedClock::new(today)))
        .expect("open workspace")
}
