use crate::models::{
    write::{InsertExpenseCommand, UpdateExpenseCommand},
    ExpenseId, ExpenseRecord,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    Other(String),
    #[error("expense not found: {0}")]
    ExpenseNotFound(ExpenseId),
    #[error("invalid row {id}: {reason}")]
    InvalidRow { id: ExpenseId, reason: String },
    #[error("storage is closed")]
    Closed,
}

/// Durable keyed storage for expense records.
///
/// Implementations trust their input: amount and category validation
/// happens in the ledger service before any command reaches a backend.
pub trait StorageBackend: Send + Sync {
    /// Creates the backing schema if missing. Safe to call on every startup.
    fn initialize(&self) -> Result<(), StorageError>;

    fn insert_expense(&self, command: &InsertExpenseCommand) -> Result<ExpenseId, StorageError>;

    /// All records, most recently created (highest id) first.
    fn list_expenses(&self) -> Result<Vec<ExpenseRecord>, StorageError>;

    /// Fails with `ExpenseNotFound` when no record has `command.id`.
    fn update_expense(&self, command: &UpdateExpenseCommand) -> Result<(), StorageError>;

    /// Returns whether a record was removed. Deleting an absent id is a no-op.
    fn delete_expense(&self, id: ExpenseId) -> Result<bool, StorageError>;

    fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
