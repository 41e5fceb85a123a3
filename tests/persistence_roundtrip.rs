mod common;

use std::fs;

use cadence::domain::{Operation, RecurrenceTermination, ScheduledSeries, SeriesTemplate};
use cadence::{AppError, CoreError};
use common::{date, open_at, temp_base};
use uuid::Uuid;

fn gym() -> SeriesTemplate {
    SeriesTemplate::new("Gym", 39.0, Operation::Expense, Uuid::new_v4())
}

#[test]
fn workspace_layout_uses_config_and_series_dirs() {
    let base = temp_base();
    let app = open_at(&base, date(2024, 1, 1));

    assert_eq!(app.base_dir(), base.as_path());
    assert_eq!(app.data_root(), base.join("series").as_path());
    assert_eq!(app.config(), &cadence::config::Config::default());

    let series = app
        .service()
        .schedule(gym(), date(2024, 1, 3), "1w", RecurrenceTermination::Infinite)
        .expect("schedule");
    let document = base.join("series").join(format!("{}.json", series.id));
    let stored: ScheduledSeries =
        serde_json::from_str(&fs::read_to_string(document).expect("read document"))
            .expect("parse document");
    assert_eq!(stored, series);
}

#[test]
fn config_updates_persist_and_apply() {
    let base = temp_base();
    let mut app = open_at(&base, date(2024, 1, 1));
    app.update_config(|config| {
        config.strict_frequency = true;
        config.generation_cap = 3;
    })
    .expect("update config");

    let err = app
        .service()
        .schedule(gym(), date(2024, 1, 3), "weekly", RecurrenceTermination::Infinite)
        .expect_err("strict parsing");
    assert!(matches!(err, CoreError::Validation(_)));

    let reopened = open_at(&base, date(2024, 1, 1));
    assert!(reopened.config().strict_frequency);
    assert_eq!(reopened.service().settings().generation_cap, 3);

    let series = reopened
        .service()
        .schedule(gym(), date(2024, 1, 3), "1w", RecurrenceTermination::Infinite)
        .expect("schedule");
    assert_eq!(reopened.service().preview(series.id).expect("preview").len(), 3);
}

#[test]
fn custom_data_root_applies_on_next_open() {
    let base = temp_base();
    let elsewhere = temp_base().join("series-store");
    let mut app = open_at(&base, date(2024, 1, 1));
    app.update_config(|config| config.data_root = Some(elsewhere.clone()))
        .expect("update config");

    let reopened = open_at(&base, date(2024, 1, 1));
    assert_eq!(reopened.data_root(), elsewhere.as_path());
    let series = reopened
        .service()
        .schedule(gym(), date(2024, 1, 3), "2w", RecurrenceTermination::Infinite)
        .expect("schedule");
    assert!(elsewhere.join(format!("{}.json", series.id)).exists());
}

#[test]
fn corrupt_config_surfaces_as_config_error() {
    let base = temp_base();
    let config_dir = base.join("config");
    fs::create_dir_all(&config_dir).expect("config dir");
    fs::write(config_dir.join("config.json"), "strict_frequency: yes").expect("write config");

    let result = cadence::Cadence::open(Some(base));
    assert!(matches!(result, Err(AppError::Config(_))));
}
