use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine settings persisted as JSON. Missing fields fall back to their defaults, so
/// older files keep loading as fields are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding one JSON document per series. Defaults to `<data dir>/cadence/series`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_root: Option<PathBuf>,
    /// Occurrences generated for an unbounded series when listing a preview.
    pub generation_cap: usize,
    /// Days covered by the upcoming view when no window is given.
    pub upcoming_window_days: u32,
    /// Reject frequency strings that do not parse instead of treating them as one-time.
    pub strict_frequency: bool,
    /// Default `tracing` directive, applied on top of `RUST_LOG`.
    pub log_directive: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_root: None,
            generation_cap: Self::default_generation_cap(),
            upcoming_window_days: Self::default_upcoming_window_days(),
            strict_frequency: false,
            log_directive: Self::default_log_directive(),
        }
    }
}

impl Config {
    pub fn default_generation_cap() -> usize {
        100
    }

    pub fn default_upcoming_window_days() -> u32 {
        30
    }

    pub fn default_log_directive() -> String {
        "cadence=info".into()
    }

    /// Where series documents live: the configured root, else `series` under `base`.
    pub fn resolve_data_root(&self, base: &Path) -> PathBuf {
        match &self.data_root {
            Some(path) => path.clone(),
            None => base.join("series"),
        }
    }
}

/// Per-user application directory, `<data dir>/cadence`.
pub fn default_base_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cadence")
}
