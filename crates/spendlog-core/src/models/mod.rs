use std::{cmp::Ordering, collections::BTreeMap, fmt::Display, str::FromStr, sync::Arc};

use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

pub mod write;

pub type ExpenseId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    pub amount: Decimal,
    pub category: Arc<str>,
    pub note: Option<Arc<str>>,
    pub date: Date,
}

/// Named reporting window. Held by the caller, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowSelector {
    #[default]
    All,
    ThisWeek,
    ThisMonth,
}

impl Display for WindowSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            WindowSelector::All => "all",
            WindowSelector::ThisWeek => "week",
            WindowSelector::ThisMonth => "month",
        })
    }
}

impl FromStr for WindowSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(WindowSelector::All),
            "week" | "this-week" | "this_week" => Ok(WindowSelector::ThisWeek),
            "month" | "this-month" | "this_month" => Ok(WindowSelector::ThisMonth),
            other => Err(format!("unknown window '{}': expected all, week or month", other)),
        }
    }
}

/// Total and per-category totals over a set of records. Always derived,
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AggregateView {
    pub total: Decimal,
    pub by_category: BTreeMap<Arc<str>, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    pub category: Arc<str>,
    pub amount: Decimal,
    /// Percentage of the view total, rounded to two places.
    pub percent: Decimal,
}

impl AggregateView {
    pub fn is_empty(&self) -> bool {
        self.by_category.is_empty()
    }

    /// Categories ordered by descending amount, ties broken by name.
    pub fn ranked(&self) -> Vec<CategoryShare> {
        let mut shares: Vec<CategoryShare> = self
            .by_category
            .iter()
            .map(|(category, amount)| CategoryShare {
                category: category.clone(),
                amount: *amount,
                percent: amount
                    .checked_div(self.total)
                    .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                    .map(|p| p.round_dp(2))
                    .unwrap_or(Decimal::ZERO),
            })
            .collect();

        shares.sort_by(|a, b| match b.amount.cmp(&a.amount) {
            Ordering::Equal => a.category.cmp(&b.category),
            other => other,
        });
        shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_window_selector_parse() {
        assert_eq!("all".parse::<WindowSelector>().unwrap(), WindowSelector::All);
        assert_eq!("Week".parse::<WindowSelector>().unwrap(), WindowSelector::ThisWeek);
        assert_eq!("this-month".parse::<WindowSelector>().unwrap(), WindowSelector::ThisMonth);
        assert!("year".parse::<WindowSelector>().is_err());
    }

    #[test]
    fn test_ranked_orders_by_amount_then_name() {
        let mut view = AggregateView { total: dec!(40), ..Default::default() };
        view.by_category.insert(Arc::from("Books"), dec!(10));
        view.by_category.insert(Arc::from("Food"), dec!(20));
        view.by_category.insert(Arc::from("Bus"), dec!(10));

        let ranked = view.ranked();
        let names: Vec<&str> = ranked.iter().map(|s| s.category.as_ref()).collect();
        assert_eq!(names, vec!["Food", "Books", "Bus"]);
        assert_eq!(ranked[0].percent, dec!(50));
        assert_eq!(ranked[1].percent, dec!(25));
    }

    #[test]
    fn test_ranked_extreme_amounts() {
        let mut view = AggregateView { total: Decimal::MAX, ..Default::default() };
        view.by_category.insert(Arc::from("Rent"), Decimal::MAX);
        view.by_category.insert(Arc::from("Food"), dec!(1000000000000000000000000000));

        let ranked = view.ranked();
        assert_eq!(ranked[0].category.as_ref(), "Rent");
        assert_eq!(ranked[0].percent, dec!(100));
        assert!(ranked[1].percent < dec!(2));
    }

    #[test]
    fn test_ranked_empty_view() {
        assert!(AggregateView::default().ranked().is_empty());
    }
}
