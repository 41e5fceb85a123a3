#![doc(test(attr(deny(warnings))))]

//! Cadence projects recurring obligations (subscriptions, installments, salaries) from
//! compact patterns and keeps per-occurrence edits in a sparse overlay.

pub mod app;
pub mod errors;
pub mod utils;

pub use app::Cadence;
pub use cadence_config as config;
pub use cadence_core::{
    Clock, CoreError, FixedClock, MonthlyTotals, RecordMode, ScheduleService, ScheduleSettings,
    SeriesRepository, SummaryService, SystemClock,
};
pub use cadence_domain as domain;
pub use cadence_storage_json as storage;
pub use errors::AppError;

use std::sync::Once;

use cadence_config::Config;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default directive and emits a startup info log.
pub fn init() {
    init_with(&Config::default());
}

/// Initializes global tracing using the configured directive. Only the first call has
/// any effect.
pub fn init_with(config: &Config) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(&config.log_directive);
        tracing::info!("Cadence tracing initialized.");
    });
}
