use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use spendlog_core::{
    AggregateView, ExpenseId, ExpenseRecord, InsertExpenseCommand, UpdateExpenseCommand,
    WindowSelector,
};
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::{
    aggregate,
    clock::Clock,
    input::{validate_expense, AmountInput, ValidExpense, ValidationError},
    storage::{StorageBackend, StorageError},
    window::WindowFilter,
};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("expense not found: {0}")]
    NotFound(ExpenseId),
    #[error("storage error: {0}")]
    Storage(#[source] StorageError),
    /// The mutation was persisted but the cached view could not be refreshed.
    /// Call `load()` again before trusting `current_view`.
    #[error("change saved but reload failed: {0}")]
    Reload(#[source] StorageError),
}

impl From<StorageError> for LedgerError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::ExpenseNotFound(id) => LedgerError::NotFound(id),
            e => LedgerError::Storage(e),
        }
    }
}

/// Filtered records plus their aggregate for one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerView {
    pub window: WindowSelector,
    pub records: Vec<ExpenseRecord>,
    #[serde(flatten)]
    pub aggregate: AggregateView,
}

/// Single entry point for the presentation layer.
///
/// Holds a cached copy of the store's records. The cache starts empty
/// (unloaded) and is replaced after every mutation; the store stays the
/// only source of truth. Store-touching calls are serialized in call order,
/// each mutation including its reload.
pub struct LedgerService {
    storage: Arc<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
    op_lock: Mutex<()>,
    cache: RwLock<Option<Arc<[ExpenseRecord]>>>,
}

impl LedgerService {
    pub fn new(storage: Arc<dyn StorageBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            op_lock: Mutex::new(()),
            cache: RwLock::new(None),
        }
    }

    pub async fn initialize(&self) -> Result<(), LedgerError> {
        let _guard = self.op_lock.lock().await;
        self.run(|s| s.initialize()).await?;
        Ok(())
    }

    pub async fn load(&self) -> Result<(), LedgerError> {
        let _guard = self.op_lock.lock().await;
        let count = self.refresh().await.map_err(LedgerError::Storage)?;
        tracing::debug!(count, "Ledger loaded");
        Ok(())
    }

    pub async fn add_expense(
        &self,
        amount: impl Into<AmountInput>,
        category: &str,
        note: Option<&str>,
    ) -> Result<ExpenseId, LedgerError> {
        let valid = self.validate(amount.into(), category, note)?;
        let command = InsertExpenseCommand {
            amount: valid.amount,
            category: valid.category,
            note: valid.note,
            date: self.clock.today(),
        };

        let _guard = self.op_lock.lock().await;
        let id = self.run(move |s| s.insert_expense(&command)).await?;
        tracing::info!(id, "Expense added");
        self.reload_after_mutation().await?;
        Ok(id)
    }

    pub async fn update_expense(
        &self,
        id: ExpenseId,
        amount: impl Into<AmountInput>,
        category: &str,
        note: Option<&str>,
    ) -> Result<(), LedgerError> {
        let valid = self.validate(amount.into(), category, note)?;
        let command = UpdateExpenseCommand {
            id,
            amount: valid.amount,
            category: valid.category,
            note: valid.note,
        };

        let _guard = self.op_lock.lock().await;
        self.run(move |s| s.update_expense(&command)).await?;
        tracing::info!(id, "Expense updated");
        self.reload_after_mutation().await
    }

    /// Deleting an id that does not exist is not an error.
    pub async fn delete_expense(&self, id: ExpenseId) -> Result<(), LedgerError> {
        let _guard = self.op_lock.lock().await;
        let removed = self.run(move |s| s.delete_expense(id)).await?;
        tracing::info!(id, removed, "Expense deleted");
        self.reload_after_mutation().await
    }

    /// Applies `window` to the cached records as of `now`. Never touches the
    /// store; an unloaded service yields an empty view.
    pub fn current_view(&self, window: WindowSelector, now: OffsetDateTime) -> LedgerView {
        let records = self.records();
        let filtered = WindowFilter::new(window, now).apply(&records);
        let aggregate = aggregate::summarize(&filtered);
        LedgerView {
            window,
            records: filtered,
            aggregate,
        }
    }

    /// `current_view` as of the service clock.
    pub fn view(&self, window: WindowSelector) -> LedgerView {
        self.current_view(window, self.clock.now())
    }

    /// The cached record list, newest first. Empty until the first `load()`.
    pub fn records(&self) -> Arc<[ExpenseRecord]> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    pub async fn close(&self) -> Result<(), LedgerError> {
        let _guard = self.op_lock.lock().await;
        self.run(|s| s.close()).await?;
        tracing::debug!("Ledger closed");
        Ok(())
    }

    fn validate(
        &self,
        amount: AmountInput,
        category: &str,
        note: Option<&str>,
    ) -> Result<ValidExpense, LedgerError> {
        validate_expense(&amount, category, note).map_err(|e| {
            tracing::warn!(error = %e, "Expense rejected");
            LedgerError::Validation(e)
        })
    }

    async fn reload_after_mutation(&self) -> Result<(), LedgerError> {
        self.refresh().await.map(|_| ()).map_err(|e| {
            tracing::error!(error = %e, "Reload after mutation failed; cached view is stale");
            LedgerError::Reload(e)
        })
    }

    /// Callers must hold `op_lock`.
    async fn refresh(&self) -> Result<usize, StorageError> {
        let records = self.run(|s| s.list_expenses()).await?;
        let count = records.len();
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::from(records));
        Ok(count)
    }

    /// Runs a store call on the blocking pool. The call completes even if
    /// the awaiting future is dropped.
    async fn run<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&dyn StorageBackend) -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let storage = self.storage.clone();
        tokio::task::spawn_blocking(move || f(storage.as_ref()))
            .await
            .map_err(|e| StorageError::Other(format!("storage task failed: {}", e)))?
    }
}
