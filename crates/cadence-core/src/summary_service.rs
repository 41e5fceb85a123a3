use cadence_domain::{Operation, ScheduledSeries, DAYS_PER_MONTH};

/// Monthly-equivalent amounts, summed per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthlyTotals {
    pub income: f64,
    pub expense: f64,
    pub transfer: f64,
}

impl MonthlyTotals {
    /// Income minus expenses. Transfers move money between accounts and do not count.
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

pub struct SummaryService;

impl SummaryService {
    /// What the series costs (or earns) per average month. `None` for series that do not recur.
    pub fn monthly_equivalent(series: &ScheduledSeries) -> Option<f64> {
        if !series.is_recurring() {
            return None;
        }
        let days = series.pattern.frequency.to_approximate_days();
        Some(series.template.amount * DAYS_PER_MONTH / days)
    }

    pub fn monthly_totals<'a>(
        series: impl IntoIterator<Item = &'a ScheduledSeries>,
    ) -> MonthlyTotals {
        series
            .into_iter()
            .filter_map(|s| {
                Self::monthly_equivalent(s).map(|amount| (s.template.operation, amount))
            })
            .fold(MonthlyTotals::default(), |mut totals, (operation, amount)| {
                match operation {
                    Operation::Income => totals.income += amount,
                    Operation::Expense => totals.expense += amount,
                    Operation::Transfer => totals.transfer += amount,
                }
                totals
            })
    }
}
