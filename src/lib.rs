pub mod aggregate;
pub mod clock;
pub mod config;
pub mod input;
pub mod ledger;
pub mod report;
pub mod sqlite_storage;
pub mod storage;
pub mod window;

pub use spendlog_core::{AggregateView, ExpenseId, ExpenseRecord, WindowSelector};
