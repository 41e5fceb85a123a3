use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use cadence_config::{default_base_dir, Config, ConfigManager};
use cadence_core::{Clock, ScheduleService, ScheduleSettings, SystemClock};
use cadence_storage_json::JsonSeriesStorage;
use tracing::info;

use crate::AppError;

/// A workspace on disk: configuration under `<base>/config` and series documents under
/// the configured data root, served through one [`ScheduleService`].
pub struct Cadence {
    base_dir: PathBuf,
    data_root: PathBuf,
    config_manager: ConfigManager,
    config: Config,
    service: ScheduleService,
}

impl Cadence {
    /// Opens the workspace at `base_dir` (or the per-user default) with the system clock.
    pub fn open(base_dir: Option<PathBuf>) -> Result<Self, AppError> {
        Self::open_with_clock(base_dir, Arc::new(SystemClock))
    }

    pub fn open_with_clock(
        base_dir: Option<PathBuf>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let base_dir = base_dir.unwrap_or_else(default_base_dir);
        let config_manager = ConfigManager::with_base_dir(&base_dir)?;
        let config = config_manager.load()?;
        let data_root = config.resolve_data_root(&base_dir);
        let storage = JsonSeriesStorage::new(data_root.clone())?;
        let service =
            ScheduleService::new(Arc::new(storage), clock).with_settings(settings_for(&config));
        info!(
            base_dir = %base_dir.display(),
            data_root = %data_root.display(),
            "opened workspace"
        );
        Ok(Self {
            base_dir,
            data_root,
            config_manager,
            config,
            service,
        })
    }

    pub fn service(&self) -> &ScheduleService {
        &self.service
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Applies `update`, saves the result and refreshes the service settings. A new
    /// `data_root` takes effect the next time the workspace is opened.
    pub fn update_config(&mut self, update: impl FnOnce(&mut Config)) -> Result<(), AppError> {
        let mut config = self.config.clone();
        update(&mut config);
        self.config_manager.save(&config)?;
        self.service.set_settings(settings_for(&config));
        self.config = config;
        info!(path = %self.config_manager.config_path().display(), "saved configuration");
        Ok(())
    }
}

fn settings_for(config: &Config) -> ScheduleSettings {
    ScheduleSettings {
        generation_cap: config.generation_cap,
        upcoming_window_days: config.upcoming_window_days,
        strict_frequency: config.strict_frequency,
    }
}
