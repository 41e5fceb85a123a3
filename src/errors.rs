use cadence_config::ConfigError;
use cadence_core::CoreError;
use thiserror::Error;

/// Failures surfaced by the [`crate::Cadence`] facade.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Core(#[from] CoreError),
}
