use std::fmt::Display;

use prettytable::{row, Table};
use rust_decimal::Decimal;
use spendlog_core::ExpenseRecord;

use crate::ledger::LedgerView;

/// Currency display with exactly two decimal places.
pub fn money(amount: Decimal) -> String {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    format!("${}", rounded)
}

pub fn records_table(records: &[ExpenseRecord]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Id", "Date", "Category", "Amount", "Note"]);
    table.add_empty_row();

    for record in records {
        table.add_row(row![
            record.id,
            record.date,
            record.category,
            money(record.amount),
            record.note.as_deref().unwrap_or("")
        ]);
    }
    table
}

impl Display for LedgerView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.records.is_empty() {
            writeln!(f, "No expenses in window '{}'.", self.window)?;
        } else {
            write!(f, "\n{}\n", records_table(&self.records))?;
        }

        writeln!(f, "Total: {}", money(self.aggregate.total))?;

        if !self.aggregate.is_empty() {
            let mut table = Table::new();
            table.add_row(row!["Category", "Amount", "Share"]);
            table.add_empty_row();
            for share in self.aggregate.ranked() {
                table.add_row(row![share.category, money(share.amount), format!("{}%", share.percent)]);
            }
            write!(f, "\nBy Category:\n{}", table)?;
        }
        Ok(())
    }
}
