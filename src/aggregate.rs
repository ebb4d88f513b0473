use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use spendlog_core::{AggregateView, ExpenseRecord};

/// Adds without panicking; an overflowing sum is clamped to the Decimal range.
fn add_amount(sum: Decimal, amount: Decimal) -> Decimal {
    sum.checked_add(amount).unwrap_or_else(|| {
        tracing::warn!(%sum, %amount, "Expense sum overflowed; clamping");
        if amount.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

pub fn total(records: &[ExpenseRecord]) -> Decimal {
    records.iter().fold(Decimal::ZERO, |sum, r| add_amount(sum, r.amount))
}

/// Sums amounts per exact category label. Categories without records are
/// absent, never present with zero.
pub fn by_category(records: &[ExpenseRecord]) -> BTreeMap<Arc<str>, Decimal> {
    let mut sums: BTreeMap<Arc<str>, Decimal> = BTreeMap::new();
    for record in records {
        let sum = sums.entry(record.category.clone()).or_insert(Decimal::ZERO);
        *sum = add_amount(*sum, record.amount);
    }
    sums
}

pub fn summarize(records: &[ExpenseRecord]) -> AggregateView {
    AggregateView {
        total: total(records),
        by_category: by_category(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use time::macros::date;

    fn record(id: i64, amount: Decimal, category: &str) -> ExpenseRecord {
        ExpenseRecord {
            id,
            amount,
            category: Arc::from(category),
            note: None,
            date: date!(2024 - 03 - 07),
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(total(&[]), Decimal::ZERO);
        assert!(by_category(&[]).is_empty());
    }

    #[test]
    fn test_totals_by_category() {
        let records = vec![
            record(1, dec!(12.50), "Food"),
            record(2, dec!(7.25), "Books"),
            record(3, dec!(3.10), "Food"),
        ];
        let view = summarize(&records);
        assert_eq!(view.total, dec!(22.85));
        assert_eq!(view.by_category.len(), 2);
        assert_eq!(view.by_category["Food"], dec!(15.60));
        assert_eq!(view.by_category["Books"], dec!(7.25));
    }

    #[test]
    fn test_categories_are_case_sensitive() {
        let records = vec![record(1, dec!(1), "food"), record(2, dec!(2), "Food")];
        let sums = by_category(&records);
        assert_eq!(sums.len(), 2);
        assert_eq!(sums["food"], dec!(1));
    }

    #[test]
    fn test_partitions_sum_to_total() {
        let records = vec![
            record(1, dec!(0.10), "Food"),
            record(2, dec!(0.20), "Books"),
            record(3, dec!(0.30), "Rent"),
            record(4, dec!(19.99), "Food"),
        ];
        let (food, rest): (Vec<ExpenseRecord>, Vec<ExpenseRecord>) =
            records.iter().cloned().partition(|r| r.category.as_ref() == "Food");
        assert_eq!(total(&food) + total(&rest), total(&records));
        assert_eq!(by_category(&records).values().copied().sum::<Decimal>(), total(&records));
    }

    #[test]
    fn test_overflowing_sums_do_not_panic() {
        let records = vec![
            record(1, Decimal::MAX, "Food"),
            record(2, Decimal::MAX, "Food"),
            record(3, dec!(1), "Books"),
        ];
        let view = summarize(&records);
        assert_eq!(view.total, Decimal::MAX);
        assert_eq!(view.by_category["Food"], Decimal::MAX);
        assert_eq!(view.by_category["Books"], dec!(1));
        assert_eq!(view.ranked().len(), 2);
    }

    #[test]
    fn test_no_drift_on_repeated_cycles() {
        let mut records = vec![record(1, dec!(0.10), "Food")];
        let start = total(&records);
        for i in 0..1000 {
            records.push(record(i + 2, dec!(0.20), "Snacks"));
            records.pop();
        }
        assert_eq!(total(&records), start);
        assert_eq!(total(&[record(1, dec!(0.1), "A"), record(2, dec!(0.2), "B")]), dec!(0.3));
    }
}
