//! Summary, backup and export command handlers.

use crate::args::ExportArgs;
use crate::commands::{open_ledger, Out};
use crate::model::{GoalView, Mood, Totals};
use crate::{export, Backup, Config, Result};
use anyhow::{anyhow, Context};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// The totals of the logged-in user's ledger and the pet's mood.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub username: String,
    pub totals: Totals,
    pub mood: Mood,
    pub image: String,
    pub goals: Vec<GoalView>,
}

/// Computes the totals and the pet's mood for the logged-in user.
pub fn summary(config: &Config) -> Result<Out<Summary>> {
    let ledger = open_ledger(config)?;
    let username = ledger
        .owner()
        .ok_or_else(|| anyhow!("The ledger has no owner"))?
        .to_string();
    let totals = ledger.totals();
    let mood = ledger.mood();
    let message = format!(
        "Summary for {username}\n\
        \x20 Total income:   {}\n\
        \x20 Total expenses: {}\n\
        \x20 Balance:        {}\n\
        \x20 Saved for goals {} of {}\n\
        {}",
        totals.total_income,
        totals.total_expenses,
        totals.balance,
        totals.total_goal_progress,
        totals.total_goal_target,
        mood.describe()
    );
    let summary = Summary {
        username,
        totals,
        mood,
        image: mood.image().to_string(),
        goals: ledger.goal_views(),
    };
    Ok(Out::new(message, summary))
}

/// Saves a snapshot of the logged-in user's ledger in the backups directory.
pub fn backup(config: &Config) -> Result<Out<PathBuf>> {
    let ledger = open_ledger(config)?;
    let username = ledger
        .owner()
        .ok_or_else(|| anyhow!("The ledger has no owner"))?;
    let path = config
        .backup()
        .save_json(&Backup::ledger_prefix(username), &ledger.snapshot())
        .context("Unable to back up the ledger")?;
    Ok(Out::new(
        format!("Saved a backup to {}", path.display()),
        path,
    ))
}

/// Writes the logged-in user's transactions as CSV to `--file` or stdout.
pub fn export(config: &Config, args: &ExportArgs) -> Result<Out<usize>> {
    let ledger = open_ledger(config)?;
    let snapshot = ledger.snapshot();
    match args.file() {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Unable to create {}", path.display()))?;
            let count = export::write_csv(&snapshot, BufWriter::new(file))?;
            Ok(Out::new(
                format!("Exported {count} transactions to {}", path.display()),
                count,
            ))
        }
        None => {
            let count = export::write_csv(&snapshot, std::io::stdout().lock())?;
            Ok(Out::new(format!("Exported {count} transactions"), count))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{AddArgs, AllocateArgs, GoalAddArgs};
    use crate::commands::{add, goal_add, goal_allocate};
    use crate::model::{Amount, LedgerSnapshot, TransactionKind};
    use crate::test::TestEnv;

    fn record(config: &Config, kind: TransactionKind, amount: &str) {
        add(config, &AddArgs::new(kind, "Entry", amount, "2025-07-01", "")).unwrap();
    }

    #[test]
    fn test_summary() {
        let env = TestEnv::logged_in("sam");
        let config = env.config();
        record(config, TransactionKind::Income, "1000");
        record(config, TransactionKind::Expense, "900");

        let out = summary(config).unwrap();
        let view = out.structure().unwrap();
        assert_eq!(view.username, "sam");
        assert_eq!(view.totals.balance, Amount::from_cents(10000));
        // No goals counts as complete
        assert_eq!(view.mood, Mood::GoalComplete);

        goal_add(config, &GoalAddArgs::new("Trip", "1000", "2026-01-01")).unwrap();
        let out = summary(config).unwrap();
        assert_eq!(out.structure().unwrap().mood, Mood::LowBalance);

        goal_allocate(config, &AllocateArgs::new(0, "100")).unwrap();
        let out = summary(config).unwrap();
        let view = out.structure().unwrap();
        assert_eq!(view.totals.balance, Amount::ZERO);
        assert_eq!(view.totals.total_goal_progress, Amount::from_cents(10000));
        assert_eq!(view.mood, Mood::LowBalance);
        assert_eq!(view.image, "images/petWary.PNG");
    }

    #[test]
    fn test_backup() {
        let env = TestEnv::logged_in("sam");
        let config = env.config();
        record(config, TransactionKind::Income, "10");
        let out = backup(config).unwrap();
        let path = out.structure().unwrap();
        assert!(path.starts_with(config.backups()));
        let text = std::fs::read_to_string(path).unwrap();
        let snapshot: LedgerSnapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(snapshot.income.len(), 1);
    }

    #[test]
    fn test_export_to_file() {
        let env = TestEnv::logged_in("sam");
        let config = env.config();
        record(config, TransactionKind::Income, "10");
        record(config, TransactionKind::Expense, "4");
        let path = config.root().join("out.csv");
        let out = export(config, &ExportArgs::new(Some(path.clone()))).unwrap();
        assert_eq!(out.structure(), Some(&2));
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
