use crate::model::{Amount, Field};
use crate::{BudgetError, BudgetResult};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A savings goal. Progress only grows through allocations.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Goal {
    name: String,
    /// Stored as `amount` by the browser client.
    #[serde(alias = "amount")]
    target_amount: Amount,
    deadline: NaiveDate,
    #[serde(default)]
    progress: Amount,
}

impl Goal {
    /// Creates a goal with no progress. The name must not be blank and the target must be
    /// greater than zero.
    pub fn new(name: impl Into<String>, target_amount: Amount, deadline: NaiveDate) -> BudgetResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BudgetError::validation(Field::GoalName, "A goal name is required."));
        }
        if !target_amount.is_positive() {
            return Err(BudgetError::validation(
                Field::TargetAmount,
                "The target amount must be greater than zero.",
            ));
        }
        Ok(Self {
            name,
            target_amount,
            deadline,
            progress: Amount::ZERO,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_amount(&self) -> Amount {
        self.target_amount
    }

    pub fn deadline(&self) -> NaiveDate {
        self.deadline
    }

    pub fn progress(&self) -> Amount {
        self.progress
    }

    /// How much can still be allocated before the target is reached.
    pub fn remaining(&self) -> Amount {
        let remaining = self.target_amount - self.progress;
        if remaining.is_negative() {
            Amount::ZERO
        } else {
            remaining
        }
    }

    /// Progress as a percentage of the target, capped at 100.
    pub fn percent(&self) -> f64 {
        if self.target_amount.is_zero() {
            return 100.0;
        }
        // A ratio too large to represent is well past 100
        let ratio = self
            .progress
            .value()
            .checked_div(self.target_amount.value())
            .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ONE_HUNDRED);
        ratio.min(Decimal::ONE_HUNDRED).to_f64().unwrap_or_default()
    }

    pub fn status(&self) -> GoalStatus {
        let mut status = GoalStatus::Incomplete;
        if self.progress >= self.target_amount {
            status = GoalStatus::Complete;
        }
        if self.progress > self.target_amount {
            status = GoalStatus::Over;
        }
        status
    }

    /// Complete or over.
    pub fn is_complete(&self) -> bool {
        self.status() != GoalStatus::Incomplete
    }

    pub(crate) fn reset_progress(&mut self) {
        self.progress = Amount::ZERO;
    }

    pub(crate) fn add_progress(&mut self, amount: Amount) {
        self.progress += amount;
    }
}

/// Classification of a goal's progress bar.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Incomplete,
    Complete,
    Over,
}

serde_plain::derive_display_from_serialize!(GoalStatus);

/// A goal as a UI renders it: its position (used to address it), percent and status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalView {
    pub index: usize,
    pub name: String,
    pub target_amount: Amount,
    pub deadline: NaiveDate,
    pub progress: Amount,
    pub percent: f64,
    pub status: GoalStatus,
}

impl GoalView {
    pub fn new(index: usize, goal: &Goal) -> Self {
        Self {
            index,
            name: goal.name().to_string(),
            target_amount: goal.target_amount(),
            deadline: goal.deadline(),
            progress: goal.progress(),
            percent: goal.percent(),
            status: goal.status(),
        }
    }
}
