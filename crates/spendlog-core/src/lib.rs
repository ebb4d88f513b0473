//! Core types and traits for spendlog storage backends.
//!
//! This crate provides the `StorageBackend` trait and the expense record
//! types, so storage implementations can live outside the service crate.

pub mod models;
pub mod storage;

pub use models::{AggregateView, CategoryShare, ExpenseId, ExpenseRecord, WindowSelector};
pub use models::write::{InsertExpenseCommand, UpdateExpenseCommand};
pub use storage::{StorageBackend, StorageError};
