//! Composite calendar offsets and the compact frequency grammar (`1y2mo3w4d`).

use std::{fmt, str::FromStr};

use chrono::{Days, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Average month length, used only for reporting ratios.
pub const DAYS_PER_MONTH: f64 = 30.4167;
pub const DAYS_PER_YEAR: f64 = 365.0;

static FREQUENCY_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d*)y)?(?:(\d*)mo)?(?:(\d*)w)?(?:(\d*)d)?$")
        .expect("FREQUENCY_GRAMMAR should be valid")
});

/// Calendar offset applied once per occurrence step. Weeks are folded into `days`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FrequencyOffset {
    #[serde(default)]
    pub years: u32,
    #[serde(default)]
    pub months: u32,
    #[serde(default)]
    pub days: u32,
}

impl FrequencyOffset {
    pub const ZERO: FrequencyOffset = FrequencyOffset {
        years: 0,
        months: 0,
        days: 0,
    };

    pub fn new(years: u32, months: u32, days: u32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    pub fn days(days: u32) -> Self {
        Self::new(0, 0, days)
    }

    pub fn weeks(weeks: u32) -> Self {
        Self::new(0, 0, weeks.saturating_mul(7))
    }

    pub fn months(months: u32) -> Self {
        Self::new(0, months, 0)
    }

    pub fn years(years: u32) -> Self {
        Self::new(years, 0, 0)
    }

    /// A zero offset means "no recurrence": stepping it returns the same date.
    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }

    /// Applies years, then months, then days to `date`. Month and year steps clamp to the
    /// last day of the target month. Returns `None` past chrono's representable range.
    pub fn apply(&self, date: NaiveDate) -> Option<NaiveDate> {
        date.checked_add_months(Months::new(self.years.checked_mul(12)?))?
            .checked_add_months(Months::new(self.months))?
            .checked_add_days(Days::new(u64::from(self.days)))
    }

    /// Approximate length in days. Reporting only; never used to generate dates.
    pub fn to_approximate_days(&self) -> f64 {
        f64::from(self.years) * DAYS_PER_YEAR
            + f64::from(self.months) * DAYS_PER_MONTH
            + f64::from(self.days)
    }

    pub fn label(&self) -> String {
        match (self.years, self.months, self.days) {
            (0, 0, 0) => "Once".into(),
            (1, 0, 0) => "Yearly".into(),
            (0, 1, 0) => "Monthly".into(),
            (0, 0, 7) => "Weekly".into(),
            (0, 0, 1) => "Daily".into(),
            (n, 0, 0) => format!("Every {} Years", n),
            (0, n, 0) => format!("Every {} Months", n),
            (0, 0, n) if n % 7 == 0 => format!("Every {} Weeks", n / 7),
            (0, 0, n) => format!("Every {} Days", n),
            _ => {
                let mut parts = Vec::new();
                if self.years > 0 {
                    parts.push(format!("{}y", self.years));
                }
                if self.months > 0 {
                    parts.push(format!("{}mo", self.months));
                }
                if self.days > 0 {
                    parts.push(format!("{}d", self.days));
                }
                format!("Every {}", parts.join(" "))
            }
        }
    }
}

impl fmt::Display for FrequencyOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0d");
        }
        if self.years > 0 {
            write!(f, "{}y", self.years)?;
        }
        if self.months > 0 {
            write!(f, "{}mo", self.months)?;
        }
        if self.days > 0 {
            write!(f, "{}d", self.days)?;
        }
        Ok(())
    }
}

impl FromStr for FrequencyOffset {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_strict(s)
    }
}

/// Parses the compact grammar. Never fails: anything that does not match yields
/// [`FrequencyOffset::ZERO`], which callers treat as "no recurrence".
pub fn parse(text: &str) -> FrequencyOffset {
    parse_components(text).unwrap_or_default()
}

/// Like [`parse`], but rejects unmatched input and input that denotes no recurrence.
pub fn parse_strict(text: &str) -> Result<FrequencyOffset, DomainError> {
    match parse_components(text) {
        Some(offset) if !offset.is_zero() => Ok(offset),
        _ => Err(DomainError::InvalidFrequency(text.to_string())),
    }
}

fn parse_components(text: &str) -> Option<FrequencyOffset> {
    let normalized = text.trim().to_ascii_lowercase();
    let captures = FREQUENCY_GRAMMAR.captures(&normalized)?;
    // absent unit -> 0, bare unit -> 1
    let unit = |group: usize| -> Option<u32> {
        match captures.get(group) {
            None => Some(0),
            Some(digits) if digits.as_str().is_empty() => Some(1),
            Some(digits) => digits.as_str().parse().ok(),
        }
    };
    let years = unit(1)?;
    let months = unit(2)?;
    let weeks = unit(3)?;
    let days = weeks.checked_mul(7)?.checked_add(unit(4)?)?;
    Some(FrequencyOffset::new(years, months, days))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_every_component() {
        assert_eq!(parse("1y2mo3w4d"), FrequencyOffset::new(1, 2, 25));
        assert_eq!(parse("2w"), FrequencyOffset::days(14));
        assert_eq!(parse("3mo"), FrequencyOffset::months(3));
        assert_eq!(parse("10y"), FrequencyOffset::years(10));
    }

    #[test]
    fn bare_unit_counts_as_one() {
        assert_eq!(parse("mo"), FrequencyOffset::months(1));
        assert_eq!(parse("y2w"), FrequencyOffset::new(1, 0, 14));
    }

    #[test]
    fn parsing_ignores_case_and_whitespace() {
        assert_eq!(parse("  1Y6MO "), FrequencyOffset::new(1, 6, 0));
    }

    #[test]
    fn unparsable_input_degrades_to_zero_offset() {
        assert!(parse("").is_zero());
        assert!(parse("monthly").is_zero());
        assert!(parse("2d1y").is_zero(), "components out of order do not match");
        assert!(parse("99999999999d").is_zero(), "overflowing digits do not match");
    }

    #[test]
    fn strict_parsing_rejects_what_permissive_parsing_swallows() {
        assert_eq!(
            parse_strict("weekly"),
            Err(DomainError::InvalidFrequency("weekly".into()))
        );
        assert!(parse_strict("").is_err());
        assert!(parse_strict("0d").is_err());
        assert_eq!("1w".parse::<FrequencyOffset>(), Ok(FrequencyOffset::weeks(1)));
    }

    #[test]
    fn display_round_trips_through_parse() {
        let offset = FrequencyOffset::new(1, 2, 25);
        assert_eq!(offset.to_string(), "1y2mo25d");
        assert_eq!(parse(&offset.to_string()), offset);
        assert_eq!(FrequencyOffset::ZERO.to_string(), "0d");
    }

    #[test]
    fn simple_steps() {
        let start = date(2024, 1, 1);
        assert_eq!(FrequencyOffset::days(1).apply(start), Some(date(2024, 1, 2)));
        assert_eq!(FrequencyOffset::days(7).apply(start), Some(date(2024, 1, 8)));
        assert_eq!(FrequencyOffset::months(1).apply(start), Some(date(2024, 2, 1)));
        assert_eq!(FrequencyOffset::years(1).apply(start), Some(date(2025, 1, 1)));
    }

    #[test]
    fn composite_step_applies_years_then_months_then_days() {
        let offset = FrequencyOffset::new(4, 2, 19);
        assert_eq!(offset.apply(date(2024, 1, 1)), Some(date(2028, 3, 20)));
    }

    #[test]
    fn component_order_is_observable_at_month_ends() {
        // years first: 2024-01-31 -> +1mo clamps into leap February
        let offset = FrequencyOffset::new(1, 1, 0);
        assert_eq!(offset.apply(date(2023, 1, 31)), Some(date(2024, 2, 29)));
        // months first would have clamped to 2023-02-28 and landed on 2024-02-28
        let months_first = FrequencyOffset::years(1)
            .apply(FrequencyOffset::months(1).apply(date(2023, 1, 31)).unwrap());
        assert_eq!(months_first, Some(date(2024, 2, 28)));
    }

    #[test]
    fn month_steps_clamp_to_month_end() {
        assert_eq!(
            FrequencyOffset::months(1).apply(date(2023, 1, 31)),
            Some(date(2023, 2, 28))
        );
        assert_eq!(
            FrequencyOffset::years(1).apply(date(2024, 2, 29)),
            Some(date(2025, 2, 28))
        );
    }

    #[test]
    fn apply_returns_none_past_calendar_range() {
        assert_eq!(FrequencyOffset::days(1).apply(NaiveDate::MAX), None);
    }

    #[test]
    fn approximate_days_for_reporting() {
        let offset = FrequencyOffset::new(1, 2, 3);
        let expected = 365.0 + 2.0 * DAYS_PER_MONTH + 3.0;
        assert!((offset.to_approximate_days() - expected).abs() < 1e-9);
        assert_eq!(FrequencyOffset::ZERO.to_approximate_days(), 0.0);
    }

    #[test]
    fn labels() {
        assert_eq!(FrequencyOffset::months(1).label(), "Monthly");
        assert_eq!(FrequencyOffset::weeks(2).label(), "Every 2 Weeks");
        assert_eq!(FrequencyOffset::days(3).label(), "Every 3 Days");
        assert_eq!(FrequencyOffset::new(1, 2, 25).label(), "Every 1y 2mo 25d");
        assert_eq!(FrequencyOffset::ZERO.label(), "Once");
    }
}
