//! Income and expense command handlers.

use crate::args::{AddArgs, RemoveArgs, RemoveLastArgs};
use crate::commands::{open_ledger, parse_amount, Out};
use crate::model::{parse_date, Amount, Field, Transaction};
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Write;

/// Both transaction lists of the logged-in user.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub income: Vec<Transaction>,
    pub expenses: Vec<Transaction>,
}

/// Records income or an expense for the logged-in user.
///
/// # Errors
/// - Returns `NoActiveSession` if nobody is logged in.
/// - Returns a validation error for a blank note, a non-positive or malformed amount, or a
///   malformed date.
pub fn add(config: &Config, args: &AddArgs) -> Result<Out<Transaction>> {
    let amount = parse_amount(args.amount(), Field::Amount)?;
    let date = parse_date(args.date(), Field::Date)?;
    let mut ledger = open_ledger(config)?;
    let transaction = ledger
        .add_transaction(args.kind(), args.note(), amount, date, args.description())?
        .clone();
    let message = format!(
        "Added {} \"{}\" of {} ({})",
        args.kind(),
        transaction.note(),
        transaction.amount(),
        transaction.id()
    );
    Ok(Out::new(message, transaction))
}

/// Removes the most recently recorded transaction of the given kind.
pub fn remove_last(config: &Config, args: &RemoveLastArgs) -> Result<Out<Transaction>> {
    let mut ledger = open_ledger(config)?;
    let removed = ledger.remove_last_transaction(args.kind())?;
    let message = format!("Removed {} \"{}\"", args.kind(), removed.note());
    Ok(Out::new(message, removed))
}

/// Removes one transaction by id.
pub fn remove(config: &Config, args: &RemoveArgs) -> Result<Out<Transaction>> {
    let mut ledger = open_ledger(config)?;
    let removed = ledger.remove_transaction(args.kind(), args.id())?;
    let message = format!("Removed {} \"{}\"", args.kind(), removed.note());
    Ok(Out::new(message, removed))
}

/// Lists both transaction lists in the order they were recorded.
pub fn list(config: &Config) -> Result<Out<Listing>> {
    let ledger = open_ledger(config)?;
    let mut message = String::new();
    for (title, list) in [("Income", ledger.income()), ("Expenses", ledger.expenses())] {
        let total: Amount = list.iter().map(Transaction::amount).sum();
        let _ = writeln!(message, "{title} ({} entries, {total}):", list.len());
        for t in list {
            let _ = writeln!(
                message,
                "  {}  {:>12}  {}  [{}]",
                t.date(),
                t.amount().to_string(),
                t.note(),
                t.id()
            );
        }
    }
    let listing = Listing {
        income: ledger.income().to_vec(),
        expenses: ledger.expenses().to_vec(),
    };
    Ok(Out::new(message.trim_end(), listing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionKind;
    use crate::test::TestEnv;
    use crate::BudgetError;

    fn add_args(kind: TransactionKind, note: &str, amount: &str) -> AddArgs {
        AddArgs::new(kind, note, amount, "2025-06-01", "")
    }

    #[test]
    fn test_add_and_list() {
        let env = TestEnv::logged_in("sam");
        let config = env.config();
        add(config, &add_args(TransactionKind::Income, "Pay", "1,000")).unwrap();
        let out = add(config, &add_args(TransactionKind::Expense, "Rent", "600")).unwrap();
        assert_eq!(out.structure().unwrap().amount(), Amount::from_cents(60000));

        let listing = list(config).unwrap();
        let listing = listing.structure().unwrap();
        assert_eq!(listing.income.len(), 1);
        assert_eq!(listing.expenses.len(), 1);
        assert_eq!(listing.expenses[0].note(), "Rent");
    }

    #[test]
    fn test_add_requires_login() {
        let env = TestEnv::new();
        let err = add(
            env.config(),
            &add_args(TransactionKind::Income, "Pay", "10"),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BudgetError>(),
            Some(BudgetError::NoActiveSession)
        ));
    }

    #[test]
    fn test_add_rejects_bad_date() {
        let env = TestEnv::logged_in("sam");
        let args = AddArgs::new(TransactionKind::Income, "Pay", "10", "June 1st", "");
        let err = add(env.config(), &args).unwrap_err();
        let err = err.downcast_ref::<BudgetError>().unwrap();
        assert_eq!(err.field(), Some(Field::Date));
    }

    #[test]
    fn test_remove_last_and_remove_by_id() {
        let env = TestEnv::logged_in("sam");
        let config = env.config();
        let first = add(config, &add_args(TransactionKind::Expense, "Tea", "3")).unwrap();
        add(config, &add_args(TransactionKind::Expense, "Cake", "5")).unwrap();

        let out = remove_last(config, &RemoveLastArgs::new(TransactionKind::Expense)).unwrap();
        assert_eq!(out.structure().unwrap().note(), "Cake");

        let id = first.structure().unwrap().id();
        remove(config, &RemoveArgs::new(TransactionKind::Expense, id)).unwrap();
        let err = remove_last(config, &RemoveLastArgs::new(TransactionKind::Expense)).unwrap_err();
        assert_eq!(err.to_string(), "No expenses to remove.");
    }
}
