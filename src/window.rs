use spendlog_core::{ExpenseRecord, WindowSelector};
use time::{Date, Duration, OffsetDateTime};

/// Date predicate for a [`WindowSelector`] evaluated against a fixed "now".
///
/// `ThisWeek` is week-to-date: it starts on the most recent Sunday at or
/// before today and has no upper bound, so future-dated records pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowFilter {
    selector: WindowSelector,
    today: Date,
}

impl WindowFilter {
    pub fn new(selector: WindowSelector, now: OffsetDateTime) -> Self {
        Self::for_date(selector, now.date())
    }

    pub fn for_date(selector: WindowSelector, today: Date) -> Self {
        Self { selector, today }
    }

    pub fn selector(&self) -> WindowSelector {
        self.selector
    }

    pub fn week_start(&self) -> Date {
        let back = Duration::days(self.today.weekday().number_days_from_sunday() as i64);
        self.today.checked_sub(back).unwrap_or(Date::MIN)
    }

    pub fn contains(&self, date: Date) -> bool {
        match self.selector {
            WindowSelector::All => true,
            WindowSelector::ThisWeek => date >= self.week_start(),
            WindowSelector::ThisMonth => {
                date.year() == self.today.year() && date.month() == self.today.month()
            }
        }
    }

    /// Records inside the window, in input order.
    pub fn apply(&self, records: &[ExpenseRecord]) -> Vec<ExpenseRecord> {
        records.iter().filter(|r| self.contains(r.date)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use time::macros::date;

    fn record(id: i64, date: Date) -> ExpenseRecord {
        ExpenseRecord {
            id,
            amount: dec!(1),
            category: Arc::from("Food"),
            note: None,
            date,
        }
    }

    #[test]
    fn test_week_start_is_previous_sunday() {
        // 2024-03-07 is a Thursday
        let filter = WindowFilter::for_date(WindowSelector::ThisWeek, date!(2024 - 03 - 07));
        assert_eq!(filter.week_start(), date!(2024 - 03 - 03));
    }

    #[test]
    fn test_week_start_on_sunday_is_today() {
        let filter = WindowFilter::for_date(WindowSelector::ThisWeek, date!(2024 - 03 - 03));
        assert_eq!(filter.week_start(), date!(2024 - 03 - 03));
        assert!(filter.contains(date!(2024 - 03 - 03)));
        assert!(!filter.contains(date!(2024 - 03 - 02)));
    }

    #[test]
    fn test_week_crosses_month_boundary() {
        // 2024-03-01 is a Friday, so the week began in February
        let filter = WindowFilter::for_date(WindowSelector::ThisWeek, date!(2024 - 03 - 01));
        assert_eq!(filter.week_start(), date!(2024 - 02 - 25));
        assert!(filter.contains(date!(2024 - 02 - 26)));
    }

    #[test]
    fn test_week_has_no_upper_bound() {
        let filter = WindowFilter::for_date(WindowSelector::ThisWeek, date!(2024 - 03 - 07));
        assert!(filter.contains(date!(2024 - 04 - 30)));
    }

    #[test]
    fn test_month_matches_year_and_month() {
        let filter = WindowFilter::for_date(WindowSelector::ThisMonth, date!(2024 - 03 - 07));
        assert!(filter.contains(date!(2024 - 03 - 01)));
        assert!(filter.contains(date!(2024 - 03 - 31)));
        assert!(!filter.contains(date!(2024 - 02 - 29)));
        assert!(!filter.contains(date!(2023 - 03 - 07)));
    }

    #[test]
    fn test_all_passes_everything() {
        let filter = WindowFilter::for_date(WindowSelector::All, date!(2024 - 03 - 07));
        assert!(filter.contains(date!(1999 - 01 - 01)));
        assert!(filter.contains(date!(2100 - 12 - 31)));
    }

    #[test]
    fn test_apply_preserves_order() {
        let records = vec![
            record(5, date!(2024 - 03 - 06)),
            record(4, date!(2024 - 01 - 15)),
            record(3, date!(2024 - 03 - 04)),
            record(2, date!(2024 - 03 - 01)),
        ];
        let filter = WindowFilter::for_date(WindowSelector::ThisWeek, date!(2024 - 03 - 07));
        let ids: Vec<i64> = filter.apply(&records).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 3]);

        let filter = WindowFilter::for_date(WindowSelector::ThisMonth, date!(2024 - 03 - 07));
        let ids: Vec<i64> = filter.apply(&records).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 3, 2]);
    }
}
