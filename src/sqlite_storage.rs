use std::{str::FromStr, sync::{Arc, Mutex}};

use rusqlite::{params, types::ValueRef, Connection};
use rust_decimal::Decimal;
use time::{format_description::FormatItem, macros::format_description, Date};

use spendlog_core::{ExpenseId, ExpenseRecord, InsertExpenseCommand, UpdateExpenseCommand};

use crate::storage::{StorageBackend, StorageError};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub struct SqliteStorage {
    conn: Mutex<Option<Connection>>,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and bootstraps the schema.
    /// `":memory:"` opens a private in-memory database.
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .map_err(sql_err)?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(sql_err)?;

        let storage = Self {
            conn: Mutex::new(Some(conn)),
        };
        storage.initialize()?;
        tracing::debug!(path, "SQLite storage opened");
        Ok(storage)
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T, StorageError>) -> Result<T, StorageError> {
        let guard = self
            .conn
            .lock()
            .map_err(|_| StorageError::Other("connection lock poisoned".to_string()))?;
        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(StorageError::Closed),
        }
    }
}

fn sql_err(e: rusqlite::Error) -> StorageError {
    StorageError::Other(e.to_string())
}

fn date_to_str(d: Date) -> Result<String, StorageError> {
    d.format(DATE_FORMAT)
        .map_err(|e| StorageError::Other(format!("Invalid date: {}", e)))
}

fn str_to_date(id: ExpenseId, s: &str) -> Result<Date, StorageError> {
    Date::parse(s.trim(), DATE_FORMAT).map_err(|e| StorageError::InvalidRow {
        id,
        reason: format!("bad date '{}': {}", s, e),
    })
}

/// The `amount` column has REAL affinity, so amounts are stored as doubles.
/// Parsing the decimal text gives the nearest double, which reads back to
/// the same decimal for amounts of up to 15 significant digits.
fn amount_to_sql(amount: Decimal) -> Result<f64, StorageError> {
    let text = amount.to_string();
    text.parse::<f64>()
        .map_err(|e| StorageError::Other(format!("Invalid amount {}: {}", text, e)))
}

/// Rows written by other tools may hold the amount as REAL, INTEGER or TEXT.
fn amount_from_sql(id: ExpenseId, value: ValueRef<'_>) -> Result<Decimal, StorageError> {
    let invalid = |reason: String| StorageError::InvalidRow { id, reason };
    match value {
        ValueRef::Integer(i) => Ok(Decimal::from(i)),
        // f64 Display is the shortest string that round-trips, so 12.5 reads back as 12.5
        ValueRef::Real(f) => Decimal::from_str(&f.to_string())
            .map_err(|e| invalid(format!("bad amount {}: {}", f, e))),
        ValueRef::Text(t) => {
            let text = std::str::from_utf8(t).map_err(|e| invalid(e.to_string()))?;
            Decimal::from_str(text.trim()).map_err(|e| invalid(format!("bad amount '{}': {}", text, e)))
        }
        ValueRef::Null | ValueRef::Blob(_) => Err(invalid("amount is not a number".to_string())),
    }
}

impl StorageBackend for SqliteStorage {
    fn initialize(&self) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "
                CREATE TABLE IF NOT EXISTS expenses (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    amount REAL NOT NULL,
                    category TEXT NOT NULL,
                    note TEXT,
                    date TEXT NOT NULL
                );
                ",
            )
            .map_err(sql_err)
        })
    }

    fn insert_expense(&self, command: &InsertExpenseCommand) -> Result<ExpenseId, StorageError> {
        let date_str = date_to_str(command.date)?;
        let amount = amount_to_sql(command.amount)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO expenses (amount, category, note, date) VALUES (?1, ?2, ?3, ?4)",
                params![amount, command.category.as_ref(), command.note.as_deref(), date_str],
            )
            .map_err(sql_err)?;
            let id = conn.last_insert_rowid();
            tracing::debug!(id, "SQLite expense inserted");
            Ok(id)
        })
    }

    fn list_expenses(&self) -> Result<Vec<ExpenseRecord>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, amount, category, note, date FROM expenses ORDER BY id DESC")
                .map_err(sql_err)?;
            let mut rows = stmt.query([]).map_err(sql_err)?;

            let mut result = Vec::new();
            while let Some(row) = rows.next().map_err(sql_err)? {
                let id: ExpenseId = row.get(0).map_err(sql_err)?;
                let amount = amount_from_sql(id, row.get_ref(1).map_err(sql_err)?)?;
                let category: String = row.get(2).map_err(sql_err)?;
                let note: Option<String> = row.get(3).map_err(sql_err)?;
                let date: String = row.get(4).map_err(sql_err)?;

                result.push(ExpenseRecord {
                    id,
                    amount,
                    category: Arc::from(category.as_str()),
                    note: note.filter(|n| !n.is_empty()).map(|n| Arc::from(n.as_str())),
                    date: str_to_date(id, &date)?,
                });
            }
            Ok(result)
        })
    }

    fn update_expense(&self, command: &UpdateExpenseCommand) -> Result<(), StorageError> {
        let amount = amount_to_sql(command.amount)?;
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE expenses SET amount = ?1, category = ?2, note = ?3 WHERE id = ?4",
                    params![
                        amount,
                        command.category.as_ref(),
                        command.note.as_deref(),
                        command.id
                    ],
                )
                .map_err(sql_err)?;
            if changed == 0 {
                return Err(StorageError::ExpenseNotFound(command.id));
            }
            tracing::debug!(id = command.id, "SQLite expense updated");
            Ok(())
        })
    }

    fn delete_expense(&self, id: ExpenseId) -> Result<bool, StorageError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute("DELETE FROM expenses WHERE id = ?1", params![id])
                .map_err(sql_err)?;
            tracing::debug!(id, removed = changed > 0, "SQLite expense delete");
            Ok(changed > 0)
        })
    }

    fn close(&self) -> Result<(), StorageError> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| StorageError::Other("connection lock poisoned".to_string()))?;
        if let Some(conn) = guard.take() {
            conn.close().map_err(|(_, e)| sql_err(e))?;
            tracing::debug!("SQLite storage closed");
        }
        Ok(())
    }
}
