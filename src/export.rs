//! CSV export of a user's transactions.

use crate::model::{LedgerSnapshot, Transaction};
use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::io::Write;

/// One exported row.
// "Date","Type","Note","Amount","Description"
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CsvRecord<'a> {
    date: String,
    #[serde(rename = "Type")]
    kind: String,
    note: &'a str,
    amount: String,
    description: &'a str,
}

impl<'a> From<&'a Transaction> for CsvRecord<'a> {
    fn from(t: &'a Transaction) -> Self {
        Self {
            date: t.date().format("%Y-%m-%d").to_string(),
            kind: t.kind().to_string(),
            note: t.note(),
            amount: t.amount().plain(),
            description: t.description(),
        }
    }
}

/// Writes income then expenses as CSV with a header row, ordered by date within the file.
/// Returns the number of rows written.
pub fn write_csv<W: Write>(snapshot: &LedgerSnapshot, writer: W) -> Result<usize> {
    let mut rows: Vec<&Transaction> = snapshot
        .income
        .iter()
        .chain(snapshot.expenses.iter())
        .collect();
    rows.sort_by_key(|t| t.date());

    let mut wtr = csv::Writer::from_writer(writer);
    for t in &rows {
        wtr.serialize(CsvRecord::from(*t))
            .context("Unable to write a CSV row")?;
    }
    wtr.flush().context("Unable to flush the CSV output")?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, TransactionKind};
    use chrono::NaiveDate;

    fn tx(kind: TransactionKind, note: &str, cents: i64, day: u32) -> Transaction {
        Transaction::new(
            kind,
            note,
            Amount::from_cents(cents),
            NaiveDate::from_ymd_opt(2025, 2, day).unwrap(),
            "",
        )
        .unwrap()
    }

    #[test]
    fn test_write_csv() {
        let snapshot = LedgerSnapshot {
            income: vec![tx(TransactionKind::Income, "Pay", 150000, 3)],
            expenses: vec![tx(TransactionKind::Expense, "Tea, green", 450, 1)],
            goals: vec![],
        };
        let mut out = Vec::new();
        let n = write_csv(&snapshot, &mut out).unwrap();
        assert_eq!(n, 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Type,Note,Amount,Description");
        assert_eq!(lines[1], "2025-02-01,expenses,\"Tea, green\",4.50,");
        assert_eq!(lines[2], "2025-02-03,income,Pay,1500.00,");
    }

    #[test]
    fn test_write_csv_empty() {
        let mut out = Vec::new();
        assert_eq!(write_csv(&LedgerSnapshot::default(), &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }
}
