//! Combines generated occurrences with a series' overlay.

use chrono::NaiveDate;

use crate::{generator, Occurrence, Occurrences, RawOccurrence, ScheduledSeries};

/// Effective occurrences dated within `[from, to]`, sorted by effective date then index.
///
/// Deleted occurrences are dropped and the window applies to the effective date, so an
/// override can move an occurrence into or out of the window. Entries whose raw date lies
/// after `to` but whose override pulls them inside are included as well.
pub fn project(series: &ScheduledSeries, from: NaiveDate, to: NaiveDate) -> Vec<Occurrence> {
    if from > to {
        return Vec::new();
    }
    let generated = generator::generate_until(&series.pattern, to);
    let last_generated = generated.last().copied();

    let wanted: Vec<u32> = series
        .overlay
        .iter()
        .filter(|modification| last_generated.map_or(true, |last| modification.index > last.index))
        .filter(|modification| modification.overrides.date.is_some_and(|date| date <= to))
        .map(|modification| modification.index)
        .collect();
    let moved_in = resolve_later(series, last_generated, wanted);

    let mut occurrences: Vec<Occurrence> = generated
        .into_iter()
        .chain(moved_in)
        .map(|raw| Occurrence::resolve(series, raw))
        .filter(|occurrence| !occurrence.is_deleted())
        .filter(|occurrence| occurrence.date >= from && occurrence.date <= to)
        .collect();
    occurrences.sort_by_key(|occurrence| (occurrence.date, occurrence.index));
    occurrences
}

/// Raw occurrences for the ascending `wanted` indices, found in one walk that continues
/// after `last_generated`. Indices the pattern never reaches are skipped.
fn resolve_later(
    series: &ScheduledSeries,
    last_generated: Option<RawOccurrence>,
    wanted: Vec<u32>,
) -> Vec<RawOccurrence> {
    let mut found = Vec::with_capacity(wanted.len());
    if wanted.is_empty() {
        return found;
    }
    let walk = match last_generated {
        Some(last) => Occurrences::resume(&series.pattern, last).skip(1),
        None => Occurrences::new(&series.pattern).skip(0),
    };
    let mut remaining = wanted.into_iter().peekable();
    for raw in walk {
        while remaining.next_if(|&index| index < raw.index).is_some() {}
        match remaining.peek() {
            None => break,
            Some(&index) if index == raw.index => {
                found.push(raw);
                remaining.next();
            }
            Some(_) => {}
        }
    }
    found
}

/// Occurrence `index` with overrides applied and no window filter. Deleted occurrences
/// are returned with their state; `None` means the series never produces `index`.
pub fn nth(series: &ScheduledSeries, index: u32) -> Option<Occurrence> {
    let date = series.pattern.scheduled_date(index)?;
    Some(Occurrence::resolve(series, RawOccurrence { index, date }))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::{
        FrequencyOffset, OccurrenceModification, OccurrenceOverrides, OccurrenceState, Operation,
        RecurrencePattern, RecurrenceTermination, SeriesTemplate,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn subscription(
        frequency: FrequencyOffset,
        termination: RecurrenceTermination,
    ) -> ScheduledSeries {
        let template = SeriesTemplate::new("Streaming", 15.0, Operation::Expense, Uuid::new_v4());
        let pattern = RecurrencePattern::new(date(2024, 1, 10), frequency, termination).unwrap();
        ScheduledSeries::new(template, pattern)
    }

    fn moved(series: &ScheduledSeries, index: u32, to: NaiveDate) -> ScheduledSeries {
        let modification = OccurrenceModification::new(index).with_overrides(OccurrenceOverrides {
            date: Some(to),
            ..Default::default()
        });
        series.with_overlay(series.overlay.upsert(modification))
    }

    #[test]
    fn deleting_one_occurrence_leaves_others_untouched() {
        let series =
            subscription(FrequencyOffset::months(1), RecurrenceTermination::NOccurrences(5));
        let before = project(&series, date(2024, 1, 1), date(2024, 12, 31));
        assert_eq!(before.len(), 5);

        let deleted = series.with_overlay(series.overlay.mark_deleted(2));
        let after = project(&deleted, date(2024, 1, 1), date(2024, 12, 31));
        let indices: Vec<u32> = after.iter().map(|o| o.index).collect();
        assert_eq!(indices, vec![0, 1, 3, 4]);
        for occurrence in &after {
            let original = before.iter().find(|o| o.index == occurrence.index).unwrap();
            assert_eq!(occurrence, original);
        }
    }

    #[test]
    fn overrides_replace_template_fields() {
        let series = subscription(FrequencyOffset::months(1), RecurrenceTermination::Infinite);
        let account = Uuid::new_v4();
        let modification = OccurrenceModification::new(1)
            .with_overrides(OccurrenceOverrides {
                amount: Some(19.99),
                account: Some(account),
                ..Default::default()
            })
            .with_state(OccurrenceState::Completed);
        let series = series.with_overlay(series.overlay.upsert(modification));

        let occurrence = nth(&series, 1).unwrap();
        assert_eq!(occurrence.amount, 19.99);
        assert_eq!(occurrence.account, account);
        assert_eq!(occurrence.state, OccurrenceState::Completed);
        assert_eq!(nth(&series, 2).unwrap().amount, 15.0);
    }

    #[test]
    fn window_filters_on_effective_date() {
        let series = subscription(FrequencyOffset::months(1), RecurrenceTermination::Infinite);
        // raw 2024-02-10 pushed out of February
        let series = moved(&series, 1, date(2024, 3, 1));
        let february = project(&series, date(2024, 2, 1), date(2024, 2, 29));
        assert!(february.is_empty());
        let march = project(&series, date(2024, 3, 1), date(2024, 3, 31));
        let indices: Vec<u32> = march.iter().map(|o| o.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn occurrence_pulled_into_window_from_later_raw_date() {
        let series = subscription(FrequencyOffset::months(1), RecurrenceTermination::Infinite);
        // raw 2024-06-10 moved back into January
        let series = moved(&series, 5, date(2024, 1, 20));
        let january = project(&series, date(2024, 1, 1), date(2024, 1, 31));
        let dates: Vec<NaiveDate> = january.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 10), date(2024, 1, 20)]);
        assert_eq!(january[1].scheduled_date, date(2024, 6, 10));
    }

    #[test]
    fn moved_in_entries_still_respect_termination() {
        let series =
            subscription(FrequencyOffset::months(1), RecurrenceTermination::NOccurrences(3));
        let series = moved(&series, 7, date(2024, 1, 20));
        assert_eq!(project(&series, date(2024, 1, 1), date(2024, 1, 31)).len(), 1);
    }

    #[test]
    fn several_later_occurrences_pulled_in_keep_their_scheduled_dates() {
        let series = subscription(FrequencyOffset::months(1), RecurrenceTermination::Infinite);
        let series = moved(&series, 3, date(2024, 1, 25));
        let series = moved(&series, 9, date(2024, 1, 15));
        let series = series.with_overlay(series.overlay.mark_deleted(6));
        let series = moved(&series, 14, date(2024, 1, 31));

        let january: Vec<(u32, NaiveDate, NaiveDate)> =
            project(&series, date(2024, 1, 1), date(2024, 1, 31))
                .into_iter()
                .map(|o| (o.index, o.date, o.scheduled_date))
                .collect();
        assert_eq!(
            january,
            vec![
                (0, date(2024, 1, 10), date(2024, 1, 10)),
                (9, date(2024, 1, 15), date(2024, 10, 10)),
                (3, date(2024, 1, 25), date(2024, 4, 10)),
                (14, date(2024, 1, 31), date(2025, 3, 10)),
            ]
        );
    }

    #[test]
    fn pulled_in_occurrence_found_when_window_precedes_start() {
        let series = subscription(FrequencyOffset::weeks(1), RecurrenceTermination::Infinite);
        let series = moved(&series, 2, date(2023, 12, 30));
        let projected = project(&series, date(2023, 12, 1), date(2023, 12, 31));
        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].index, 2);
        assert_eq!(projected[0].scheduled_date, date(2024, 1, 24));
    }

    #[test]
    fn equal_dates_tie_break_by_index() {
        let series = subscription(FrequencyOffset::days(1), RecurrenceTermination::Infinite);
        let series = moved(&series, 0, date(2024, 1, 12));
        let projected = project(&series, date(2024, 1, 12), date(2024, 1, 12));
        let indices: Vec<u32> = projected.iter().map(|o| o.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn inverted_window_is_empty() {
        let series = subscription(FrequencyOffset::days(1), RecurrenceTermination::Infinite);
        assert!(project(&series, date(2024, 2, 1), date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn nth_beyond_termination_is_none() {
        let series =
            subscription(FrequencyOffset::weeks(1), RecurrenceTermination::NOccurrences(2));
        assert!(nth(&series, 1).is_some());
        assert!(nth(&series, 2).is_none());
    }

    #[test]
    fn nth_reports_deleted_state() {
        let series = subscription(FrequencyOffset::weeks(1), RecurrenceTermination::Infinite);
        let series = series.with_overlay(series.overlay.mark_deleted(3));
        assert!(nth(&series, 3).unwrap().is_deleted());
    }

    #[test]
    fn until_and_count_terminations_project_identically() {
        let counted =
            subscription(FrequencyOffset::weeks(2), RecurrenceTermination::NOccurrences(6));
        let until = ScheduledSeries {
            pattern: RecurrencePattern {
                termination: RecurrenceTermination::UntilDate(date(2024, 3, 20)),
                ..counted.pattern.clone()
            },
            ..counted.clone()
        };
        assert_eq!(until.pattern.total_occurrences(), Some(6));
        assert_eq!(
            project(&counted, date(2024, 1, 1), date(2025, 1, 1)),
            project(&until, date(2024, 1, 1), date(2025, 1, 1))
        );
    }
}
