use std::sync::Arc;

use rust_decimal::Decimal;
use time::Date;

use super::ExpenseId;

/// A validated expense ready to be persisted. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertExpenseCommand {
    pub amount: Decimal,
    pub category: Arc<str>,
    pub note: Option<Arc<str>>,
    pub date: Date,
}

/// Replaces the mutable fields of an existing record. `id` and `date` are
/// never changed by an update.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpenseCommand {
    pub id: ExpenseId,
    pub amount: Decimal,
    pub category: Arc<str>,
    pub note: Option<Arc<str>>,
}
