use std::{str::FromStr, sync::Arc};

use rust_decimal::Decimal;
use thiserror::Error;

/// User-facing validation failure. The message is meant to be shown as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Category is required.")]
    MissingCategory,
    #[error("Enter a valid amount.")]
    InvalidAmount,
}

/// An amount as supplied by a caller: free text straight from an input
/// field, or a value the caller already parsed. Text is only parsed when the
/// expense is committed, so unparsed text never reaches a record.
#[derive(Debug, Clone, PartialEq)]
pub enum AmountInput {
    Text(String),
    Value(Decimal),
}

impl From<&str> for AmountInput {
    fn from(s: &str) -> Self {
        AmountInput::Text(s.to_string())
    }
}

impl From<String> for AmountInput {
    fn from(s: String) -> Self {
        AmountInput::Text(s)
    }
}

impl From<Decimal> for AmountInput {
    fn from(d: Decimal) -> Self {
        AmountInput::Value(d)
    }
}

/// Most decimal places an amount may carry.
pub const MAX_AMOUNT_SCALE: u32 = 2;

/// Largest accepted amount. With at most two decimal places this keeps every
/// amount within 15 significant digits, which round-trips exactly through
/// the SQLite `REAL` column.
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, MAX_AMOUNT_SCALE)
}

impl AmountInput {
    pub fn parse(&self) -> Result<Decimal, ValidationError> {
        let amount = match self {
            AmountInput::Value(d) => *d,
            AmountInput::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Err(ValidationError::InvalidAmount);
                }
                Decimal::from_str(s).map_err(|_| ValidationError::InvalidAmount)?
            }
        };
        if amount <= Decimal::ZERO
            || amount > max_amount()
            || amount.normalize().scale() > MAX_AMOUNT_SCALE
        {
            return Err(ValidationError::InvalidAmount);
        }
        Ok(amount.normalize())
    }
}

/// The mutable fields of an expense after validation and normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidExpense {
    pub amount: Decimal,
    pub category: Arc<str>,
    pub note: Option<Arc<str>>,
}

/// Category is checked before amount, so an empty form reports the category.
pub fn validate_expense(
    amount: &AmountInput,
    category: &str,
    note: Option<&str>,
) -> Result<ValidExpense, ValidationError> {
    let category = category.trim();
    if category.is_empty() {
        return Err(ValidationError::MissingCategory);
    }
    let amount = amount.parse()?;

    Ok(ValidExpense {
        amount,
        category: Arc::from(category),
        note: note.map(str::trim).filter(|n| !n.is_empty()).map(Arc::from),
    })
}
