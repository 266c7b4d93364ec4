//! Savings goal command handlers.

use crate::args::{AllocateArgs, GoalAddArgs, GoalRemoveArgs};
use crate::commands::{open_ledger, parse_amount, Out};
use crate::model::{parse_date, Field, Goal, GoalView};
use crate::{Allocation, Config, Result};
use anyhow::bail;
use std::fmt::Write;

/// Adds a savings goal with no progress.
pub fn goal_add(config: &Config, args: &GoalAddArgs) -> Result<Out<GoalView>> {
    let target = parse_amount(args.target(), Field::TargetAmount)?;
    let deadline = parse_date(args.deadline(), Field::Deadline)?;
    let goal = Goal::new(args.name(), target, deadline)?;
    let mut ledger = open_ledger(config)?;
    ledger.add_goal(goal)?;
    let index = ledger.goals().len() - 1;
    let view = GoalView::new(index, &ledger.goals()[index]);
    let message = format!(
        "Added goal {index} \"{}\": save {} by {}",
        view.name, view.target_amount, view.deadline
    );
    Ok(Out::new(message, view))
}

/// Deletes the goal at the given index. Requires `--yes` since the goal's progress is lost.
pub fn goal_remove(config: &Config, args: &GoalRemoveArgs) -> Result<Out<Goal>> {
    if !args.yes() {
        bail!(
            "Deleting goal {} cannot be undone, pass --yes to confirm",
            args.index()
        );
    }
    let mut ledger = open_ledger(config)?;
    let removed = ledger.remove_goal(args.index())?;
    let message = format!("Deleted goal \"{}\"", removed.name());
    Ok(Out::new(message, removed))
}

/// Deletes the most recently added goal.
pub fn goal_remove_last(config: &Config) -> Result<Out<Goal>> {
    let mut ledger = open_ledger(config)?;
    let removed = ledger.remove_last_goal()?;
    let message = format!("Deleted goal \"{}\"", removed.name());
    Ok(Out::new(message, removed))
}

/// Moves money from the balance into a goal, recording it as an expense.
pub fn goal_allocate(config: &Config, args: &AllocateArgs) -> Result<Out<Allocation>> {
    let amount = parse_amount(args.amount(), Field::DistributionAmount)?;
    let mut ledger = open_ledger(config)?;
    let allocation = ledger.allocate_to_goal(args.index(), amount)?;
    Ok(Out::new(allocation.message.clone(), allocation))
}

/// Lists every goal with its progress. Goals that can still receive money are listed first.
pub fn goals(config: &Config) -> Result<Out<Vec<GoalView>>> {
    let ledger = open_ledger(config)?;
    let open = ledger.open_goals();
    let completed = ledger.completed_goals();
    if open.is_empty() && completed.is_empty() {
        return Ok(Out::new("No goals yet", Vec::new()));
    }

    let mut message = String::new();
    for (title, views) in [("Open goals", &open), ("Completed goals", &completed)] {
        if views.is_empty() {
            continue;
        }
        let _ = writeln!(message, "{title}:");
        for view in views {
            let _ = writeln!(
                message,
                "  {}. {} {} of {} ({:.0}%, {}) due {}",
                view.index,
                view.name,
                view.progress,
                view.target_amount,
                view.percent,
                view.status,
                view.deadline
            );
        }
    }
    Ok(Out::new(message.trim_end(), ledger.goal_views()))
}
