use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicI64, Ordering},
        RwLock, RwLockReadGuard, RwLockWriteGuard,
    },
};

use spendlog_core::{ExpenseId, ExpenseRecord, InsertExpenseCommand, UpdateExpenseCommand};

// Re-export core storage types so callers can use crate::storage::*
pub use spendlog_core::storage::{StorageBackend, StorageError};

/// Volatile backend, used for tests and `backend = "memory"` sessions.
pub struct InMemoryStorage {
    expenses: RwLock<BTreeMap<ExpenseId, ExpenseRecord>>,
    id_counter: AtomicI64,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            expenses: RwLock::new(BTreeMap::new()),
            id_counter: AtomicI64::new(1),
        }
    }

    fn next_id(&self) -> ExpenseId {
        self.id_counter.fetch_add(1, Ordering::SeqCst)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<ExpenseId, ExpenseRecord>>, StorageError> {
        self.expenses
            .read()
            .map_err(|_| StorageError::Other("expense table lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<ExpenseId, ExpenseRecord>>, StorageError> {
        self.expenses
            .write()
            .map_err(|_| StorageError::Other("expense table lock poisoned".to_string()))
    }
}

impl StorageBackend for InMemoryStorage {
    fn initialize(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn insert_expense(&self, command: &InsertExpenseCommand) -> Result<ExpenseId, StorageError> {
        let mut expenses = self.write()?;
        let id = self.next_id();
        expenses.insert(
            id,
            ExpenseRecord {
                id,
                amount: command.amount,
                category: command.category.clone(),
                note: command.note.clone(),
                date: command.date,
            },
        );
        tracing::debug!(id, "Expense inserted");
        Ok(id)
    }

    fn list_expenses(&self) -> Result<Vec<ExpenseRecord>, StorageError> {
        Ok(self.read()?.values().rev().cloned().collect())
    }

    fn update_expense(&self, command: &UpdateExpenseCommand) -> Result<(), StorageError> {
        let mut expenses = self.write()?;
        let record = expenses
            .get_mut(&command.id)
            .ok_or(StorageError::ExpenseNotFound(command.id))?;
        record.amount = command.amount;
        record.category = command.category.clone();
        record.note = command.note.clone();
        tracing::debug!(id = command.id, "Expense updated");
        Ok(())
    }

    fn delete_expense(&self, id: ExpenseId) -> Result<bool, StorageError> {
        let removed = self.write()?.remove(&id).is_some();
        tracing::debug!(id, removed, "Expense delete");
        Ok(removed)
    }
}
